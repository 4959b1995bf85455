//! Distance and coordinate-projection helpers shared by every system.
//!
//! Static map data is authored in grid coordinates and projected once into
//! screen space; the simulation itself only ever works with screen-space
//! positions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Fixed isometric projection between grid and screen space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IsometricProjection {
    /// Screen position of grid coordinate `(0, 0)`.
    pub origin: Vec2,
    /// Width of a projected tile diamond.
    pub tile_width: f32,
    /// Height of a projected tile diamond.
    pub tile_height: f32,
}

impl IsometricProjection {
    /// Creates a projection anchored at `origin` with the provided tile size.
    #[must_use]
    pub const fn new(origin: Vec2, tile_width: f32, tile_height: f32) -> Self {
        Self {
            origin,
            tile_width,
            tile_height,
        }
    }

    /// Projects a grid coordinate (`x` = column, `y` = row) into screen space.
    #[must_use]
    pub fn project(&self, grid: Vec2) -> Vec2 {
        let half_width = self.tile_width * 0.5;
        let half_height = self.tile_height * 0.5;
        Vec2::new(
            self.origin.x + (grid.x - grid.y) * half_width,
            self.origin.y + (grid.x + grid.y) * half_height,
        )
    }

    /// Maps a screen position back into grid space.
    ///
    /// Degenerate projections with a zero tile dimension map everything to
    /// the grid origin.
    #[must_use]
    pub fn unproject(&self, screen: Vec2) -> Vec2 {
        let half_width = self.tile_width * 0.5;
        let half_height = self.tile_height * 0.5;
        if half_width == 0.0 || half_height == 0.0 {
            return Vec2::ZERO;
        }

        let offset = screen - self.origin;
        let diagonal = offset.x / half_width;
        let depth = offset.y / half_height;
        Vec2::new((depth + diagonal) * 0.5, (depth - diagonal) * 0.5)
    }
}

/// Reports whether `b` lies within `radius` of `a`, boundary included.
#[must_use]
pub fn within(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) <= radius * radius
}

/// Moves from `from` toward `to` by at most `max_distance`, never overshooting.
#[must_use]
pub fn step_toward(from: Vec2, to: Vec2, max_distance: f32) -> Vec2 {
    let offset = to - from;
    let length = offset.length();
    if length <= max_distance || length == 0.0 {
        return to;
    }
    from + offset * (max_distance.max(0.0) / length)
}

/// Finds the point on a polyline closest to `point`.
///
/// Returns `point` unchanged when the polyline is empty.
#[must_use]
pub fn closest_point_on_polyline(points: &[Vec2], point: Vec2) -> Vec2 {
    let Some(first) = points.first().copied() else {
        return point;
    };

    let mut best = first;
    let mut best_distance = first.distance_squared(point);
    for segment in points.windows(2) {
        let candidate = closest_point_on_segment(segment[0], segment[1], point);
        let candidate_distance = candidate.distance_squared(point);
        if candidate_distance < best_distance {
            best = candidate;
            best_distance = candidate_distance;
        }
    }
    best
}

fn closest_point_on_segment(start: Vec2, end: Vec2, point: Vec2) -> Vec2 {
    let segment = end - start;
    let length_squared = segment.length_squared();
    if length_squared == 0.0 {
        return start;
    }
    let t = ((point - start).dot(segment) / length_squared).clamp(0.0, 1.0);
    start + segment * t
}
