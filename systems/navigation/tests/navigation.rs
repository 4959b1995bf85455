use glam::Vec2;
use lane_defence_system_navigation::{PathNavigator, PathStep};
use proptest::prelude::*;

fn lane() -> Vec<Vec2> {
    vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(100.0, 0.0),
        Vec2::new(100.0, 50.0),
        Vec2::new(20.0, 50.0),
    ]
}

#[test]
fn leftover_travel_carries_onto_next_segment() {
    let waypoints = lane();
    let navigator = PathNavigator::new(&waypoints);

    let step = navigator.advance(Vec2::new(95.0, 0.0), 0, 12.0);

    assert_eq!(
        step,
        PathStep::Moved {
            position: Vec2::new(100.0, 7.0),
            path_index: 1,
        },
        "seven units of leftover should be applied toward the following waypoint",
    );
}

#[test]
fn carry_over_never_cascades_past_a_second_waypoint() {
    let waypoints = lane();
    let navigator = PathNavigator::new(&waypoints);

    let step = navigator.advance(Vec2::new(99.0, 0.0), 0, 200.0);

    assert_eq!(
        step,
        PathStep::Moved {
            position: Vec2::new(100.0, 50.0),
            path_index: 1,
        },
        "leftover is clamped to the segment following the crossed waypoint",
    );
}

#[test]
fn exact_arrival_advances_the_index() {
    let waypoints = lane();
    let navigator = PathNavigator::new(&waypoints);

    let step = navigator.advance(Vec2::new(90.0, 0.0), 0, 10.0);

    assert_eq!(
        step,
        PathStep::Moved {
            position: Vec2::new(100.0, 0.0),
            path_index: 1,
        }
    );
}

#[test]
fn reaching_the_final_waypoint_reports_a_leak() {
    let waypoints = lane();
    let navigator = PathNavigator::new(&waypoints);

    let step = navigator.advance(Vec2::new(25.0, 50.0), 2, 30.0);

    assert_eq!(
        step,
        PathStep::Leaked {
            position: Vec2::new(20.0, 50.0),
        }
    );
}

#[test]
fn path_index_never_decreases_while_walking_the_lane() {
    let waypoints = lane();
    let navigator = PathNavigator::new(&waypoints);
    let mut position = navigator.entrance().expect("lane has an entrance");
    let mut path_index = 0;
    let mut steps = 0;

    loop {
        match navigator.advance(position, path_index, 7.5) {
            PathStep::Moved {
                position: next,
                path_index: next_index,
            } => {
                assert!(next_index >= path_index, "path index went backwards");
                position = next;
                path_index = next_index;
            }
            PathStep::Leaked { .. } => break,
        }
        steps += 1;
        assert!(steps < 1_000, "hostile never reached the end of the lane");
    }

    assert_eq!(path_index, navigator.last_index() - 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn progress_never_regresses(travels in prop::collection::vec(0.0_f32..40.0, 1..200)) {
        let waypoints = lane();
        let navigator = PathNavigator::new(&waypoints);
        let mut position = waypoints[0];
        let mut path_index = 0;

        for travel in travels {
            match navigator.advance(position, path_index, travel) {
                PathStep::Moved { position: next, path_index: index } => {
                    prop_assert!(index >= path_index);
                    prop_assert!(index < navigator.last_index());
                    position = next;
                    path_index = index;
                }
                PathStep::Leaked { position: exit } => {
                    prop_assert_eq!(exit, waypoints[navigator.last_index()]);
                    break;
                }
            }
        }
    }
}
