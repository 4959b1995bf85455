use glam::Vec2;
use lane_defence_core::HostileId;
use lane_defence_system_targeting::{retain_or_acquire, Candidate, Seeker};

fn candidate(id: u32, x: f32, y: f32, health: f32) -> Candidate {
    Candidate {
        id: HostileId::new(id),
        position: Vec2::new(x, y),
        health,
    }
}

#[test]
fn acquires_nearest_living_hostile_in_range() {
    let seeker = Seeker::at(Vec2::ZERO, 100.0);
    let candidates = vec![
        candidate(1, 80.0, 0.0, 10.0),
        candidate(2, 30.0, 0.0, 0.0),
        candidate(3, 50.0, 0.0, 10.0),
        candidate(4, 150.0, 0.0, 10.0),
    ];

    let target = retain_or_acquire(&seeker, None, candidates.iter().copied());

    assert_eq!(
        target,
        Some(HostileId::new(3)),
        "the dead hostile must be skipped and the nearest living one chosen",
    );
}

#[test]
fn current_target_is_retained_even_when_another_is_closer() {
    let seeker = Seeker::at(Vec2::ZERO, 100.0);
    let candidates = vec![candidate(1, 90.0, 0.0, 10.0), candidate(2, 10.0, 0.0, 10.0)];

    let target = retain_or_acquire(&seeker, Some(HostileId::new(1)), candidates.iter().copied());

    assert_eq!(target, Some(HostileId::new(1)));
}

#[test]
fn target_leaving_range_triggers_reacquisition() {
    let seeker = Seeker::at(Vec2::ZERO, 100.0);
    let candidates = vec![candidate(1, 120.0, 0.0, 10.0), candidate(2, 60.0, 0.0, 10.0)];

    let target = retain_or_acquire(&seeker, Some(HostileId::new(1)), candidates.iter().copied());

    assert_eq!(target, Some(HostileId::new(2)));
}

#[test]
fn stale_target_falls_back_to_reacquisition() {
    let seeker = Seeker::at(Vec2::ZERO, 100.0);
    let candidates = vec![candidate(5, 40.0, 0.0, 10.0)];

    let target = retain_or_acquire(&seeker, Some(HostileId::new(99)), candidates.iter().copied());

    assert_eq!(target, Some(HostileId::new(5)));
}

#[test]
fn ties_go_to_the_first_candidate_found() {
    let seeker = Seeker::at(Vec2::ZERO, 100.0);
    let candidates = vec![candidate(7, 0.0, 40.0, 10.0), candidate(3, 40.0, 0.0, 10.0)];

    let target = retain_or_acquire(&seeker, None, candidates.iter().copied());

    assert_eq!(target, Some(HostileId::new(7)));
}

#[test]
fn range_is_measured_from_the_anchor_not_the_position() {
    let seeker = Seeker {
        position: Vec2::new(200.0, 0.0),
        anchor: Vec2::ZERO,
        range: 100.0,
    };
    let candidates = vec![candidate(1, 250.0, 0.0, 10.0), candidate(2, 90.0, 0.0, 10.0)];

    let target = retain_or_acquire(&seeker, None, candidates.iter().copied());

    assert_eq!(
        target,
        Some(HostileId::new(2)),
        "the hostile beside the seeker is outside the anchor's range",
    );
}

#[test]
fn nothing_in_range_yields_no_target() {
    let seeker = Seeker::at(Vec2::ZERO, 10.0);
    let candidates = vec![candidate(1, 50.0, 0.0, 10.0)];

    assert_eq!(retain_or_acquire(&seeker, None, candidates.iter().copied()), None);
}
