//! Entity data model owned by the world and borrowed by systems.
//!
//! Every timer is expressed in milliseconds remaining and counts down to zero.
//! Cross-entity links are plain identifiers; resolving them is always
//! fallible.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    config::{HostileProfile, MeleeProfile},
    AllyRef, Armor, DamageType, ExplosionId, HeroId, HostileId, HostileKind, ParticleId,
    ProjectileId, ProjectileKind, ReinforcementId, SoldierId, SpotId, TowerId, TowerKind,
};

/// Static defensive structure placed on a build spot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tower {
    /// Identifier allocated by the world.
    pub id: TowerId,
    /// Kind of tower.
    pub kind: TowerKind,
    /// Current level, starting at one.
    pub level: u8,
    /// Build spot the tower occupies.
    pub spot: SpotId,
    /// Screen-space position.
    pub position: Vec2,
    /// Milliseconds until the tower may fire again.
    pub cooldown_ms: u32,
    /// Hostile currently targeted, if any.
    pub target: Option<HostileId>,
    /// Group rally point for the soldiers of a barracks.
    pub rally_point: Option<Vec2>,
    /// Milliseconds the firing animation remains visible.
    pub attack_flash_ms: u32,
}

impl Tower {
    /// Reports whether the firing animation is currently visible.
    #[must_use]
    pub const fn is_attacking(&self) -> bool {
        self.attack_flash_ms > 0
    }
}

/// Mobile enemy walking the lane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hostile {
    /// Identifier allocated by the world.
    pub id: HostileId,
    /// Kind of hostile.
    pub kind: HostileKind,
    /// Screen-space position.
    pub position: Vec2,
    /// Index of the last waypoint reached.
    pub path_index: usize,
    /// Current health.
    pub health: f32,
    /// Health at spawn.
    pub max_health: f32,
    /// Walking speed in units per second.
    pub speed: f32,
    /// Armor worn.
    pub armor: Armor,
    /// Damage dealt to blockers per strike.
    pub damage: f32,
    /// Milliseconds between strikes.
    pub attack_interval_ms: u32,
    /// Milliseconds until the next strike is allowed.
    pub attack_cooldown_ms: u32,
    /// Gold dropped on death.
    pub bounty: u32,
    /// Milliseconds the slow effect remains active.
    pub slow_timer_ms: u32,
    /// Speed multiplier applied while slowed.
    pub slow_factor: f32,
    /// Hero forcing this hostile to approach it, if any.
    pub taunted_by: Option<HeroId>,
    /// Ally currently holding this hostile in melee, if any.
    pub blocked_by: Option<AllyRef>,
    /// Milliseconds the strike animation remains visible.
    pub attack_flash_ms: u32,
}

impl Hostile {
    /// Spawns a hostile of `kind` at `position` using its configured profile.
    #[must_use]
    pub fn spawn(id: HostileId, kind: HostileKind, profile: &HostileProfile, position: Vec2) -> Self {
        Self {
            id,
            kind,
            position,
            path_index: 0,
            health: profile.max_health,
            max_health: profile.max_health,
            speed: profile.speed,
            armor: profile.armor,
            damage: profile.damage,
            attack_interval_ms: profile.attack_interval_ms,
            attack_cooldown_ms: 0,
            bounty: profile.bounty,
            slow_timer_ms: 0,
            slow_factor: 1.0,
            taunted_by: None,
            blocked_by: None,
            attack_flash_ms: 0,
        }
    }

    /// Reports whether the hostile still has health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Reports whether a slow effect is active.
    #[must_use]
    pub const fn is_slowed(&self) -> bool {
        self.slow_timer_ms > 0
    }

    /// Walking speed after slow effects.
    #[must_use]
    pub fn effective_speed(&self) -> f32 {
        if self.is_slowed() {
            self.speed * self.slow_factor
        } else {
            self.speed
        }
    }

    /// Remaining health as a fraction of maximum, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        health_fraction(self.health, self.max_health)
    }
}

/// How a projectile chooses where to land.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Aim {
    /// Follows a moving hostile.
    Tracking(HostileId),
    /// Lands on a position frozen at launch.
    Fixed(Vec2),
}

/// Slow effect carried by a hit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlowEffect {
    /// Speed multiplier while slowed.
    pub factor: f32,
    /// Duration of the effect in milliseconds.
    pub duration_ms: u32,
}

/// Munition in flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Identifier allocated by the world.
    pub id: ProjectileId,
    /// Kind of munition.
    pub kind: ProjectileKind,
    /// Tower that fired the projectile.
    pub tower: TowerId,
    /// Screen-space position.
    pub position: Vec2,
    /// Landing rule.
    pub aim: Aim,
    /// Damage dealt on impact.
    pub damage: f32,
    /// Kind of damage dealt.
    pub damage_type: DamageType,
    /// Flight speed in units per second.
    pub speed: f32,
    /// Radius of area damage around the impact point.
    pub splash_radius: Option<f32>,
    /// Slow applied to every hostile hit.
    pub slow: Option<SlowEffect>,
}

/// State shared by every allied melee unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeleeUnit {
    /// Screen-space position.
    pub position: Vec2,
    /// Anchor the unit returns to when idle.
    pub rally_point: Vec2,
    /// Current health.
    pub health: f32,
    /// Combat statistics.
    pub profile: MeleeProfile,
    /// Milliseconds until the next strike is allowed.
    pub attack_cooldown_ms: u32,
    /// Hostile currently engaged, if any.
    pub target: Option<HostileId>,
    /// Milliseconds until the unit returns after being defeated.
    pub respawn_timer_ms: u32,
    /// Milliseconds the strike animation remains visible.
    pub attack_flash_ms: u32,
}

impl MeleeUnit {
    /// Creates a fresh unit standing at `position`.
    #[must_use]
    pub fn new(position: Vec2, rally_point: Vec2, profile: MeleeProfile) -> Self {
        Self {
            position,
            rally_point,
            health: profile.max_health,
            profile,
            attack_cooldown_ms: 0,
            target: None,
            respawn_timer_ms: 0,
            attack_flash_ms: 0,
        }
    }

    /// Maximum health from the unit's profile.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.profile.max_health
    }

    /// Reports whether the unit is waiting to respawn.
    #[must_use]
    pub const fn is_respawning(&self) -> bool {
        self.respawn_timer_ms > 0
    }

    /// Reports whether the unit can fight, move, block, and be targeted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.is_respawning() && self.health > 0.0
    }

    /// Reports whether the strike animation is currently visible.
    #[must_use]
    pub const fn is_attacking(&self) -> bool {
        self.attack_flash_ms > 0
    }

    /// Remaining health as a fraction of maximum, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        health_fraction(self.health, self.profile.max_health)
    }

    /// Restores the unit to full health at `position`, clearing all timers.
    pub fn revive_at(&mut self, position: Vec2) {
        self.position = position;
        self.health = self.profile.max_health;
        self.attack_cooldown_ms = 0;
        self.target = None;
        self.respawn_timer_ms = 0;
        self.attack_flash_ms = 0;
    }
}

/// Soldier trained by a barracks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Soldier {
    /// Identifier allocated by the world.
    pub id: SoldierId,
    /// Barracks that trained the soldier.
    pub barracks: TowerId,
    /// Melee state.
    pub unit: MeleeUnit,
}

/// Player-controlled hero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    /// Identifier of the hero.
    pub id: HeroId,
    /// Melee state; the rally point doubles as the patrol anchor.
    pub unit: MeleeUnit,
    /// Position the hero returns to after respawning.
    pub start_position: Vec2,
    /// Milliseconds until the ability may be triggered again.
    pub ability_cooldown_ms: u32,
    /// Milliseconds the ability remains active.
    pub ability_active_ms: u32,
    /// Armor added while the ability is active.
    pub armor_bonus: f32,
}

impl Hero {
    /// Creates a hero standing at its start position.
    #[must_use]
    pub fn new(id: HeroId, start_position: Vec2, profile: MeleeProfile) -> Self {
        Self {
            id,
            unit: MeleeUnit::new(start_position, start_position, profile),
            start_position,
            ability_cooldown_ms: 0,
            ability_active_ms: 0,
            armor_bonus: 0.0,
        }
    }

    /// Armor currently worn, including the ability bonus.
    #[must_use]
    pub fn armor(&self) -> Armor {
        let base = self.unit.profile.armor;
        Armor {
            kind: base.kind,
            value: base.value + self.armor_bonus,
        }
    }

    /// Reports whether the taunt ability is active.
    #[must_use]
    pub const fn ability_active(&self) -> bool {
        self.ability_active_ms > 0
    }
}

/// Temporary unit summoned by a spell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reinforcement {
    /// Identifier allocated by the world.
    pub id: ReinforcementId,
    /// Melee state.
    pub unit: MeleeUnit,
    /// Milliseconds until the unit leaves the field.
    pub lifetime_ms: u32,
}

/// Visual marker left by area damage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    /// Identifier allocated by the world.
    pub id: ExplosionId,
    /// Screen-space centre.
    pub position: Vec2,
    /// Radius of the damaged area.
    pub radius: f32,
    /// Milliseconds until the marker disappears.
    pub lifetime_ms: u32,
}

/// Gold drop flying toward the collection point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrencyParticle {
    /// Identifier allocated by the world.
    pub id: ParticleId,
    /// Where the particle was dropped.
    pub source: Vec2,
    /// Screen-space position.
    pub position: Vec2,
    /// Gold credited on arrival.
    pub value: u32,
}

fn health_fraction(health: f32, max_health: f32) -> f32 {
    if max_health <= 0.0 {
        return 0.0;
    }
    (health.max(0.0) / max_health).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArmorType, GameConfig};

    #[test]
    fn slowed_hostiles_walk_at_reduced_speed() {
        let config = GameConfig::default();
        let mut hostile = Hostile::spawn(
            HostileId::new(1),
            HostileKind::Goblin,
            config.hostiles.profile(HostileKind::Goblin),
            Vec2::ZERO,
        );
        let base = hostile.effective_speed();
        hostile.slow_timer_ms = 500;
        hostile.slow_factor = 0.5;
        assert!((hostile.effective_speed() - base * 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn health_fraction_clamps_negative_health() {
        let config = GameConfig::default();
        let mut unit = MeleeUnit::new(Vec2::ZERO, Vec2::ZERO, config.hero.unit);
        unit.health = -12.0;
        assert_eq!(unit.health_fraction(), 0.0);
    }

    #[test]
    fn hero_armor_includes_ability_bonus() {
        let config = GameConfig::default();
        let mut hero = Hero::new(HeroId::new(0), Vec2::ZERO, config.hero.unit);
        hero.armor_bonus = 0.4;
        let armor = hero.armor();
        assert_eq!(armor.kind, ArmorType::Physical);
        assert!((armor.value - 0.6).abs() < 1e-6);
    }

    #[test]
    fn revive_restores_health_and_clears_timers() {
        let config = GameConfig::default();
        let mut unit = MeleeUnit::new(Vec2::ZERO, Vec2::ZERO, config.hero.unit);
        unit.health = 0.0;
        unit.respawn_timer_ms = 300;
        unit.target = Some(HostileId::new(4));
        unit.revive_at(Vec2::new(5.0, 5.0));
        assert!(unit.is_active());
        assert_eq!(unit.position, Vec2::new(5.0, 5.0));
        assert_eq!(unit.target, None);
    }
}
