#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects attack targets and plans melee engagement.
//!
//! Every attacker, whether a tower, a soldier, a reinforcement or the hero,
//! follows the same contract: keep the current target while it is alive and
//! within range of the attacker's anchor, otherwise pick the living hostile
//! closest to the attacker among those within range of the anchor.

use glam::Vec2;
use lane_defence_core::{geometry::within, Hostile, HostileId, MeleeUnit};

/// Hostile data considered during target selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Identifier of the hostile.
    pub id: HostileId,
    /// Screen-space position.
    pub position: Vec2,
    /// Current health.
    pub health: f32,
}

impl From<&Hostile> for Candidate {
    fn from(hostile: &Hostile) -> Self {
        Self {
            id: hostile.id,
            position: hostile.position,
            health: hostile.health,
        }
    }
}

/// Attacker looking for a target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Seeker {
    /// Where the attacker stands; distances for picking are measured from here.
    pub position: Vec2,
    /// Point the range is measured from.
    pub anchor: Vec2,
    /// Maximum distance between the anchor and an acceptable target.
    pub range: f32,
}

impl Seeker {
    /// Seeker whose range is measured from its own position.
    #[must_use]
    pub const fn at(position: Vec2, range: f32) -> Self {
        Self {
            position,
            anchor: position,
            range,
        }
    }

    fn accepts(&self, candidate: &Candidate) -> bool {
        candidate.health > 0.0 && within(self.anchor, candidate.position, self.range)
    }
}

/// Retains `current` when still valid, otherwise acquires the nearest valid
/// candidate.
///
/// Ties on distance are resolved in favour of the candidate yielded first.
#[must_use]
pub fn retain_or_acquire<I>(
    seeker: &Seeker,
    current: Option<HostileId>,
    candidates: I,
) -> Option<HostileId>
where
    I: IntoIterator<Item = Candidate>,
    I::IntoIter: Clone,
{
    let candidates = candidates.into_iter();

    if let Some(current) = current {
        let retained = candidates
            .clone()
            .find(|candidate| candidate.id == current)
            .filter(|candidate| seeker.accepts(candidate));
        if retained.is_some() {
            return Some(current);
        }
    }

    let mut best: Option<(f32, HostileId)> = None;
    for candidate in candidates {
        if !seeker.accepts(&candidate) {
            continue;
        }
        let distance_sq = seeker.position.distance_squared(candidate.position);
        match best {
            Some((best_distance, _)) if best_distance <= distance_sq => {}
            _ => best = Some((distance_sq, candidate.id)),
        }
    }
    best.map(|(_, id)| id)
}

/// What a melee unit should do this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Engagement {
    /// The target is within striking distance; strike if ready.
    Attack,
    /// Walk toward the target.
    Advance(Vec2),
    /// Walk back toward the rally point.
    Return(Vec2),
    /// Stay put.
    Hold,
}

/// Chooses between striking, chasing, returning and holding.
#[must_use]
pub fn plan_engagement(unit: &MeleeUnit, target: Option<Vec2>, deadband: f32) -> Engagement {
    match target {
        Some(position) if within(unit.position, position, unit.profile.attack_range) => {
            Engagement::Attack
        }
        Some(position) => Engagement::Advance(position),
        None if !within(unit.position, unit.rally_point, deadband) => {
            Engagement::Return(unit.rally_point)
        }
        None => Engagement::Hold,
    }
}

/// Position of slot `index` out of `count` in a ring around `center`.
///
/// A single unit stands on the centre itself.
#[must_use]
pub fn formation_slot(center: Vec2, radius: f32, index: usize, count: usize) -> Vec2 {
    if count <= 1 {
        return center;
    }
    let angle = std::f32::consts::TAU * index as f32 / count as f32;
    center + Vec2::new(angle.cos(), angle.sin()) * radius
}
