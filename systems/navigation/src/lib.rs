#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that advances hostiles along the fixed lane.
//!
//! The lane is an ordered polyline of screen-space waypoints. A hostile's
//! `path_index` names the last waypoint it reached; it always walks toward the
//! following one. Leftover travel past a waypoint carries over onto the next
//! segment exactly once per tick.

use glam::Vec2;
use lane_defence_core::geometry::step_toward;

/// Outcome of advancing a hostile for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathStep {
    /// The hostile is still on the lane.
    Moved {
        /// Position after moving.
        position: Vec2,
        /// Index of the last waypoint reached.
        path_index: usize,
    },
    /// The hostile reached the final waypoint.
    Leaked {
        /// Position of the final waypoint.
        position: Vec2,
    },
}

/// Navigator over a borrowed waypoint polyline.
#[derive(Clone, Copy, Debug)]
pub struct PathNavigator<'a> {
    waypoints: &'a [Vec2],
}

impl<'a> PathNavigator<'a> {
    /// Creates a navigator over the provided screen-space waypoints.
    #[must_use]
    pub const fn new(waypoints: &'a [Vec2]) -> Self {
        Self { waypoints }
    }

    /// Spawn position at the head of the lane, if the lane exists.
    #[must_use]
    pub fn entrance(&self) -> Option<Vec2> {
        self.waypoints.first().copied()
    }

    /// Index of the final waypoint.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    /// Advances a hostile standing at `position` by `travel` units.
    ///
    /// When `travel` covers the remaining distance to the next waypoint the
    /// index advances and the leftover is applied toward the following
    /// waypoint, clamped to that segment. Reaching the final waypoint reports
    /// a leak.
    #[must_use]
    pub fn advance(&self, position: Vec2, path_index: usize, travel: f32) -> PathStep {
        let last = self.last_index();
        if path_index >= last {
            return PathStep::Leaked {
                position: self.waypoints.get(last).copied().unwrap_or(position),
            };
        }

        let next_index = path_index + 1;
        let next = self.waypoints[next_index];
        let remaining = position.distance(next);
        let travel = travel.max(0.0);

        if travel < remaining {
            return PathStep::Moved {
                position: step_toward(position, next, travel),
                path_index,
            };
        }

        if next_index >= last {
            return PathStep::Leaked { position: next };
        }

        let leftover = travel - remaining;
        let following = self.waypoints[next_index + 1];
        PathStep::Moved {
            position: step_toward(next, following, leftover),
            path_index: next_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANE: [Vec2; 3] = [
        Vec2::new(0.0, 0.0),
        Vec2::new(10.0, 0.0),
        Vec2::new(10.0, 10.0),
    ];

    #[test]
    fn short_travel_stays_on_segment() {
        let navigator = PathNavigator::new(&LANE);
        assert_eq!(
            navigator.advance(Vec2::ZERO, 0, 4.0),
            PathStep::Moved {
                position: Vec2::new(4.0, 0.0),
                path_index: 0,
            }
        );
    }

    #[test]
    fn empty_lane_leaks_in_place() {
        let navigator = PathNavigator::new(&[]);
        let position = Vec2::new(3.0, 3.0);
        assert_eq!(navigator.entrance(), None);
        assert_eq!(
            navigator.advance(position, 0, 1.0),
            PathStep::Leaked { position }
        );
    }
}
