#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system deciding which allied unit, if any, holds a hostile in place.
//!
//! A taunting hero standing within its block radius always wins. Otherwise
//! the closest active blocker whose own block radius reaches the hostile is
//! chosen; ties go to the blocker supplied first.

use glam::Vec2;
use lane_defence_core::{geometry::within, AllyRef};

/// Active allied unit able to stop hostiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blocker {
    /// Reference to the allied unit.
    pub ally: AllyRef,
    /// Screen-space position.
    pub position: Vec2,
    /// Distance within which the unit stops hostiles.
    pub radius: f32,
}

impl Blocker {
    fn reaches(&self, hostile: Vec2) -> bool {
        within(self.position, hostile, self.radius)
    }
}

/// What a hostile does with its movement this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intent {
    /// Held in place by an ally it should strike.
    Blocked(AllyRef),
    /// Taunted but not yet adjacent: walk straight at the hero.
    Approach(Vec2),
    /// Follow the lane.
    FollowPath,
}

/// Finds the ally blocking a hostile standing at `hostile`.
///
/// `taunting_hero` is the hero when it taunted this hostile and is active.
/// `blockers` must only contain active units, soldiers first, then
/// reinforcements, then the hero.
#[must_use]
pub fn resolve<I>(hostile: Vec2, taunting_hero: Option<Blocker>, blockers: I) -> Option<AllyRef>
where
    I: IntoIterator<Item = Blocker>,
{
    if let Some(hero) = taunting_hero.filter(|hero| hero.reaches(hostile)) {
        return Some(hero.ally);
    }

    let mut best: Option<(f32, AllyRef)> = None;
    for blocker in blockers {
        if !blocker.reaches(hostile) {
            continue;
        }
        let distance_sq = blocker.position.distance_squared(hostile);
        match best {
            Some((best_distance, _)) if best_distance <= distance_sq => {}
            _ => best = Some((distance_sq, blocker.ally)),
        }
    }
    best.map(|(_, ally)| ally)
}

/// Decides how a hostile spends its movement this tick.
#[must_use]
pub fn decide<I>(hostile: Vec2, taunting_hero: Option<Blocker>, blockers: I) -> Intent
where
    I: IntoIterator<Item = Blocker>,
{
    match resolve(hostile, taunting_hero, blockers) {
        Some(ally) => Intent::Blocked(ally),
        None => match taunting_hero {
            Some(hero) => Intent::Approach(hero.position),
            None => Intent::FollowPath,
        },
    }
}
