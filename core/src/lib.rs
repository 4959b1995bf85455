#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then reports [`Event`] values describing what
//! happened. Systems never own entity collections: they receive borrowed
//! entity data defined in [`entities`] and respond with plain values.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod entities;
pub mod geometry;

pub use config::{
    ConfigError, GameConfig, HeroProfile, HostileProfile, MeleeProfile, SpellProfile,
    TowerLevel, TowerProfile, WaveDefinition,
};
pub use entities::{
    Aim, CurrencyParticle, Explosion, Hero, Hostile, MeleeUnit, Projectile, Reinforcement,
    SlowEffect, Soldier, Tower,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Lane Defence.";

/// Identifier types that can be allocated by an entity registry.
pub trait EntityKey: Copy + Ord {
    /// Builds the identifier from its raw numeric value.
    fn from_raw(value: u32) -> Self;

    /// Retrieves the raw numeric value of the identifier.
    fn raw(self) -> u32;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }

        impl EntityKey for $name {
            fn from_raw(value: u32) -> Self {
                Self(value)
            }

            fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

entity_id!(
    /// Unique identifier assigned to a tower.
    TowerId
);
entity_id!(
    /// Unique identifier assigned to a hostile.
    HostileId
);
entity_id!(
    /// Unique identifier assigned to a projectile in flight.
    ProjectileId
);
entity_id!(
    /// Unique identifier assigned to a barracks soldier.
    SoldierId
);
entity_id!(
    /// Unique identifier assigned to a summoned reinforcement.
    ReinforcementId
);
entity_id!(
    /// Unique identifier assigned to an explosion marker.
    ExplosionId
);
entity_id!(
    /// Unique identifier assigned to a currency particle.
    ParticleId
);
entity_id!(
    /// Identifier of the singleton hero.
    HeroId
);

/// Index of a build spot within the configured map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpotId(u32);

impl SpotId {
    /// Creates a new build spot identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the spot identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Tagged reference to any entity the player can select.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    /// A placed tower.
    Tower(TowerId),
    /// A hostile walking the lane.
    Hostile(HostileId),
    /// A soldier trained by a barracks.
    Soldier(SoldierId),
    /// A summoned reinforcement.
    Reinforcement(ReinforcementId),
    /// The singleton hero.
    Hero,
}

/// Tagged reference to an allied melee unit capable of blocking hostiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AllyRef {
    /// The singleton hero.
    Hero,
    /// A soldier trained by a barracks.
    Soldier(SoldierId),
    /// A summoned reinforcement.
    Reinforcement(ReinforcementId),
}

impl From<AllyRef> for EntityRef {
    fn from(ally: AllyRef) -> Self {
        match ally {
            AllyRef::Hero => EntityRef::Hero,
            AllyRef::Soldier(id) => EntityRef::Soldier(id),
            AllyRef::Reinforcement(id) => EntityRef::Reinforcement(id),
        }
    }
}

/// Types of towers that can be constructed on a build spot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Fast single-target physical tower.
    Archer,
    /// Magic tower whose bolts slow their target.
    Mage,
    /// Slow tower lobbing shells that splash on a fixed point.
    Artillery,
    /// Tower that trains soldiers instead of firing.
    Barracks,
}

impl TowerKind {
    /// Every tower kind in display order.
    pub const ALL: [TowerKind; 4] = [Self::Archer, Self::Mage, Self::Artillery, Self::Barracks];

    /// Reports whether the tower trains soldiers rather than firing projectiles.
    #[must_use]
    pub const fn trains_soldiers(self) -> bool {
        matches!(self, Self::Barracks)
    }

    /// Projectile launched by the tower, if it fires at all.
    #[must_use]
    pub const fn projectile(self) -> Option<ProjectileKind> {
        match self {
            Self::Archer => Some(ProjectileKind::Arrow),
            Self::Mage => Some(ProjectileKind::Bolt),
            Self::Artillery => Some(ProjectileKind::Shell),
            Self::Barracks => None,
        }
    }
}

/// Types of hostiles that waves are composed of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostileKind {
    /// Weak and plentiful.
    Goblin,
    /// Fast runner.
    Wolf,
    /// Physically armored infantry.
    Orc,
    /// Magically warded caster.
    Shaman,
    /// Heavily armored brute.
    Ogre,
}

/// Munitions launched by towers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Archer arrow tracking a single hostile.
    Arrow,
    /// Mage bolt tracking a single hostile.
    Bolt,
    /// Artillery shell aimed at a fixed point.
    Shell,
}

/// Kind of damage carried by an attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    /// Weapons, arrows, shells.
    Physical,
    /// Spells and bolts.
    Magic,
}

/// Kind of protection worn by a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorType {
    /// No protection; magic damage is amplified.
    Unarmored,
    /// Plates that reduce physical damage.
    Physical,
    /// Wards that deny the magic amplification.
    Magic,
}

/// Armor worn by a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    /// Kind of protection.
    pub kind: ArmorType,
    /// Fraction of matching damage absorbed, in `0.0..=1.0`.
    pub value: f32,
}

impl Armor {
    /// No armor at all.
    pub const NONE: Armor = Armor {
        kind: ArmorType::Unarmored,
        value: 0.0,
    };

    /// Physical armor absorbing the provided fraction.
    #[must_use]
    pub const fn physical(value: f32) -> Self {
        Self {
            kind: ArmorType::Physical,
            value,
        }
    }

    /// Magic wards of the provided strength.
    #[must_use]
    pub const fn magic(value: f32) -> Self {
        Self {
            kind: ArmorType::Magic,
            value,
        }
    }
}

/// Player spells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellKind {
    /// Magic area strike at the target position.
    RainOfFire,
    /// Summons temporary allied units at the target position.
    Reinforcements,
}

impl SpellKind {
    /// Every spell in display order.
    pub const ALL: [SpellKind; 2] = [Self::RainOfFire, Self::Reinforcements];
}

/// Overall state of the run as driven by the wave director.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    /// No wave has started yet.
    Idle,
    /// A wave is spawning or its hostiles are still alive.
    WaveInProgress,
    /// The previous wave was cleared; the next one is counting down.
    WaveComplete,
    /// All waves were cleared.
    Victory,
    /// The player ran out of lives.
    GameOver,
}

impl RunStatus {
    /// Reports whether the run reached one of its final outcomes.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::GameOver)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Starts the next wave, optionally before its countdown elapsed.
    StartWave {
        /// Whether the player called the wave early.
        early: bool,
    },
    /// Constructs a level one tower on a free build spot.
    BuildTower {
        /// Spot that should host the tower.
        spot: SpotId,
        /// Kind of tower to construct.
        kind: TowerKind,
    },
    /// Raises a tower by one level.
    UpgradeTower {
        /// Tower to upgrade.
        tower: TowerId,
    },
    /// Removes a tower and refunds its sell value.
    SellTower {
        /// Tower to sell.
        tower: TowerId,
    },
    /// Casts a spell at a position.
    CastSpell {
        /// Spell to cast.
        spell: SpellKind,
        /// Screen-space position the spell is aimed at.
        target: Vec2,
    },
    /// Moves the rally point of a barracks or the hero.
    SetRallyPoint {
        /// Unit whose rally point should move.
        unit: EntityRef,
        /// Screen-space position of the new rally point.
        target: Vec2,
    },
    /// Activates the hero's taunt ability.
    TriggerHeroAbility,
    /// Selects an entity for inspection, or clears the selection.
    SelectUnit {
        /// Entity to select; `None` clears the selection.
        entity: Option<EntityRef>,
    },
    /// Suspends the tick loop.
    Pause,
    /// Resumes the tick loop.
    Resume,
    /// Restores the run to its starting state.
    Reset,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// A wave began spawning.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
        /// Whether the wave was called early.
        early: bool,
    },
    /// Every hostile of a wave was spawned and defeated or leaked.
    WaveCompleted {
        /// One-based wave number.
        wave: u32,
    },
    /// A hostile entered the lane.
    HostileSpawned {
        /// Identifier assigned to the hostile.
        hostile: HostileId,
        /// Kind of hostile spawned.
        kind: HostileKind,
    },
    /// A hostile reached the end of the lane.
    HostileLeaked {
        /// Identifier of the hostile.
        hostile: HostileId,
        /// Lives remaining after the leak.
        lives: u32,
    },
    /// A hostile was defeated.
    HostileKilled {
        /// Identifier of the hostile.
        hostile: HostileId,
        /// Position at which it fell.
        position: Vec2,
        /// Gold carried by the spawned currency particle.
        bounty: u32,
    },
    /// A tower was constructed.
    TowerBuilt {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Kind of tower built.
        kind: TowerKind,
        /// Spot the tower occupies.
        spot: SpotId,
    },
    /// A tower gained a level.
    TowerUpgraded {
        /// Identifier of the tower.
        tower: TowerId,
        /// Level reached.
        level: u8,
    },
    /// A tower was sold.
    TowerSold {
        /// Identifier of the tower.
        tower: TowerId,
        /// Gold refunded.
        refund: u32,
    },
    /// A tower launched a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
    },
    /// A projectile reached its aim point and dealt damage.
    ProjectileImpacted {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Number of hostiles damaged.
        hits: u32,
    },
    /// A tracking projectile lost its target and was discarded.
    ProjectileFizzled {
        /// Identifier of the projectile.
        projectile: ProjectileId,
    },
    /// A soldier was defeated and began its respawn countdown.
    SoldierFell {
        /// Identifier of the soldier.
        soldier: SoldierId,
    },
    /// A soldier returned to its rally point.
    SoldierRespawned {
        /// Identifier of the soldier.
        soldier: SoldierId,
    },
    /// The hero was defeated and began its respawn countdown.
    HeroFell,
    /// The hero returned at its start position.
    HeroRespawned,
    /// The hero activated its taunt.
    HeroAbilityActivated {
        /// Number of hostiles taunted.
        taunted: u32,
    },
    /// The hero's taunt wore off.
    HeroAbilityExpired,
    /// Reinforcements were summoned.
    ReinforcementsArrived {
        /// Identifiers of the summoned units.
        units: Vec<ReinforcementId>,
    },
    /// A reinforcement left the field through death or expiry.
    ReinforcementDismissed {
        /// Identifier of the reinforcement.
        unit: ReinforcementId,
        /// Whether the unit was defeated rather than expiring.
        defeated: bool,
    },
    /// A spell was cast.
    SpellCast {
        /// Spell that was cast.
        spell: SpellKind,
        /// Target position.
        target: Vec2,
    },
    /// A currency particle reached the collection point.
    GoldCollected {
        /// Gold credited.
        amount: u32,
        /// Balance after crediting.
        balance: u32,
    },
    /// A rally point moved.
    RallyPointSet {
        /// Unit whose rally point moved.
        unit: EntityRef,
        /// New rally point.
        target: Vec2,
    },
    /// The selected entity changed.
    SelectionChanged {
        /// New selection.
        entity: Option<EntityRef>,
    },
    /// The tick loop was suspended.
    Paused,
    /// The tick loop resumed.
    Resumed,
    /// The run was restored to its starting state.
    RunReset,
    /// All waves were cleared.
    Victory,
    /// The player ran out of lives.
    GameOver,
    /// A command was ignored because its preconditions did not hold.
    CommandRejected {
        /// Reason the command was ignored.
        reason: Rejection,
    },
}

/// Reasons the world may ignore a command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Error)]
pub enum Rejection {
    /// The player cannot afford the action.
    #[error("insufficient gold: {required} required, {available} available")]
    InsufficientGold {
        /// Gold required.
        required: u32,
        /// Gold available.
        available: u32,
    },
    /// The requested build spot does not exist.
    #[error("unknown build spot")]
    UnknownSpot,
    /// The requested build spot already hosts a tower.
    #[error("build spot already occupied")]
    SpotOccupied,
    /// No tower with the provided identifier exists.
    #[error("unknown tower")]
    UnknownTower,
    /// The tower already reached its final level.
    #[error("tower is already at its maximum level")]
    MaxLevel,
    /// The entity has no rally point the player can move.
    #[error("entity has no movable rally point")]
    NotRallyCapable,
    /// The target lies outside the unit's effective range.
    #[error("target is out of range")]
    OutOfRange,
    /// No entity with the provided identifier exists.
    #[error("unknown entity")]
    UnknownEntity,
    /// The action is still cooling down.
    #[error("cooldown active for another {remaining_ms} ms")]
    CooldownActive {
        /// Milliseconds until the action is ready.
        remaining_ms: u32,
    },
    /// The hero is respawning.
    #[error("hero is unavailable")]
    HeroUnavailable,
    /// No wave can be started right now.
    #[error("no wave can be started now")]
    WaveUnavailable,
    /// The run already ended.
    #[error("the run is over")]
    RunOver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ally_references_convert_to_entity_references() {
        assert_eq!(EntityRef::from(AllyRef::Hero), EntityRef::Hero);
        assert_eq!(
            EntityRef::from(AllyRef::Soldier(SoldierId::new(3))),
            EntityRef::Soldier(SoldierId::new(3))
        );
    }

    #[test]
    fn only_barracks_train_soldiers() {
        for kind in TowerKind::ALL {
            assert_eq!(kind.trains_soldiers(), kind.projectile().is_none());
        }
    }

    #[test]
    fn terminal_statuses_are_outcomes() {
        assert!(RunStatus::Victory.is_terminal());
        assert!(RunStatus::GameOver.is_terminal());
        assert!(!RunStatus::WaveComplete.is_terminal());
    }

    #[test]
    fn rejection_messages_carry_amounts() {
        let reason = Rejection::InsufficientGold {
            required: 70,
            available: 12,
        };
        assert_eq!(
            reason.to_string(),
            "insufficient gold: 70 required, 12 available"
        );
    }

    #[test]
    fn command_round_trips_through_bincode() {
        let command = Command::CastSpell {
            spell: SpellKind::RainOfFire,
            target: Vec2::new(120.0, 48.5),
        };
        let bytes = bincode::serialize(&command).expect("serialize");
        let restored: Command = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, command);
    }
}
