#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure combat primitives: armor mitigation, damage application, slows,
//! splash selection, and projectile flight.
//!
//! The mitigation matrix has exactly two special cases. Physical damage
//! against physical armor is reduced by the armor value, and magic damage
//! against unarmored targets is amplified by the configured bonus. Every other
//! pairing deals its raw damage.

use glam::Vec2;
use lane_defence_core::{
    geometry::{step_toward, within},
    Aim, Armor, ArmorType, DamageType, Hostile, HostileId, MeleeUnit, Projectile, ProjectileId,
    ProjectileKind, SlowEffect, Tower, TowerLevel, TowerProfile,
};

/// Damage carried by a single attack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Raw damage before mitigation.
    pub damage: f32,
    /// Kind of damage dealt.
    pub damage_type: DamageType,
    /// Slow applied to hostiles struck.
    pub slow: Option<SlowEffect>,
}

impl Hit {
    /// Plain physical hit without side effects.
    #[must_use]
    pub const fn physical(damage: f32) -> Self {
        Self {
            damage,
            damage_type: DamageType::Physical,
            slow: None,
        }
    }

    /// Plain magic hit without side effects.
    #[must_use]
    pub const fn magic(damage: f32) -> Self {
        Self {
            damage,
            damage_type: DamageType::Magic,
            slow: None,
        }
    }
}

/// Result of applying a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The target was already down; nothing changed.
    Ignored,
    /// The target took damage and is still standing.
    Wounded,
    /// The hit moved the target from alive to dead.
    Killed,
}

/// Damage left after armor.
#[must_use]
pub fn mitigate(damage: f32, damage_type: DamageType, armor: Armor, magic_bonus: f32) -> f32 {
    let damage = damage.max(0.0);
    match (damage_type, armor.kind) {
        (DamageType::Physical, ArmorType::Physical) => {
            damage * (1.0 - armor.value.clamp(0.0, 1.0))
        }
        (DamageType::Magic, ArmorType::Unarmored) => damage * magic_bonus,
        _ => damage,
    }
}

/// Applies a hit to a hostile, including any slow it carries.
pub fn strike_hostile(hostile: &mut Hostile, hit: &Hit, magic_bonus: f32) -> DamageOutcome {
    if !hostile.is_alive() {
        return DamageOutcome::Ignored;
    }
    let damage = mitigate(hit.damage, hit.damage_type, hostile.armor, magic_bonus);
    hostile.health = (hostile.health - damage).clamp(0.0, hostile.max_health);
    if let Some(slow) = hit.slow {
        apply_slow(hostile, slow);
    }
    if hostile.is_alive() {
        DamageOutcome::Wounded
    } else {
        DamageOutcome::Killed
    }
}

/// Applies a hit to an allied melee unit wearing `armor`.
pub fn strike_unit(
    unit: &mut MeleeUnit,
    armor: Armor,
    hit: &Hit,
    magic_bonus: f32,
) -> DamageOutcome {
    if !unit.is_active() {
        return DamageOutcome::Ignored;
    }
    let damage = mitigate(hit.damage, hit.damage_type, armor, magic_bonus);
    unit.health = (unit.health - damage).clamp(0.0, unit.max_health());
    if unit.health > 0.0 {
        DamageOutcome::Wounded
    } else {
        DamageOutcome::Killed
    }
}

/// Resets the slow timer and replaces the slow factor.
pub fn apply_slow(hostile: &mut Hostile, slow: SlowEffect) {
    hostile.slow_timer_ms = slow.duration_ms;
    hostile.slow_factor = slow.factor;
}

/// Identifiers of every hostile within `radius` of `center`, inclusive.
#[must_use]
pub fn splash_victims<I>(center: Vec2, radius: f32, hostiles: I) -> Vec<HostileId>
where
    I: IntoIterator<Item = (HostileId, Vec2)>,
{
    hostiles
        .into_iter()
        .filter(|&(_, position)| within(center, position, radius))
        .map(|(id, _)| id)
        .collect()
}

/// Builds the projectile of `kind` a tower launches at `target`.
#[must_use]
pub fn launch(
    id: ProjectileId,
    kind: ProjectileKind,
    tower: &Tower,
    profile: &TowerProfile,
    level: &TowerLevel,
    target: &Hostile,
) -> Projectile {
    let aim = if profile.fixed_aim {
        Aim::Fixed(target.position)
    } else {
        Aim::Tracking(target.id)
    };
    Projectile {
        id,
        kind,
        tower: tower.id,
        position: tower.position,
        aim,
        damage: level.damage,
        damage_type: profile.damage_type,
        speed: profile.projectile_speed,
        splash_radius: level.splash_radius,
        slow: profile.slow,
    }
}

/// Progress of a projectile over one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Flight {
    /// Still travelling.
    InFlight,
    /// Reached its aim point, now at `position`.
    Arrived(Vec2),
}

/// Moves a projectile toward `aim_point` by `speed * dt`.
pub fn advance_projectile(projectile: &mut Projectile, aim_point: Vec2, dt_secs: f32) -> Flight {
    let travel = projectile.speed * dt_secs;
    if projectile.position.distance(aim_point) <= travel {
        projectile.position = aim_point;
        return Flight::Arrived(aim_point);
    }
    projectile.position = step_toward(projectile.position, aim_point, travel);
    Flight::InFlight
}

impl From<&Projectile> for Hit {
    fn from(projectile: &Projectile) -> Self {
        Self {
            damage: projectile.damage,
            damage_type: projectile.damage_type,
            slow: projectile.slow,
        }
    }
}
