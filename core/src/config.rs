//! Static configuration loaded once per run.
//!
//! [`GameConfig::default`] describes the built-in map. Adapters may layer a
//! TOML document over it with [`GameConfig::from_toml_str`]; top-level keys
//! and whole tables replace their defaults.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    entities::SlowEffect, geometry::IsometricProjection, Armor, DamageType, HostileKind,
    SpellKind, TowerKind,
};

/// Highest level any tower may reach.
pub const MAX_TOWER_LEVEL: u8 = 3;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The tick interval must be positive.
    #[error("tick interval must be positive")]
    ZeroTickInterval,
    /// The lane needs a start and an end.
    #[error("path needs at least two waypoints, found {points}")]
    PathTooShort {
        /// Number of waypoints configured.
        points: usize,
    },
    /// A tower must define between one and three levels.
    #[error("{kind:?} defines {levels} levels, expected between one and three")]
    TowerLevels {
        /// Offending tower kind.
        kind: TowerKind,
        /// Number of levels configured.
        levels: usize,
    },
    /// Every barracks level must describe the soldiers it trains.
    #[error("barracks level {level} is missing its soldier profile")]
    MissingSoldierProfile {
        /// One-based level lacking a profile.
        level: usize,
    },
    /// At least one wave is required.
    #[error("no waves configured")]
    NoWaves,
    /// Waves must spawn at least one hostile.
    #[error("wave {wave} spawns no hostiles")]
    EmptyWave {
        /// One-based wave number.
        wave: usize,
    },
}

/// Combat statistics of an allied melee unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeleeProfile {
    /// Health at full strength.
    pub max_health: f32,
    /// Damage dealt per strike.
    pub damage: f32,
    /// Kind of damage dealt.
    pub damage_type: DamageType,
    /// Armor worn.
    pub armor: Armor,
    /// Milliseconds between strikes.
    pub attack_interval_ms: u32,
    /// Distance within which the unit can strike.
    pub attack_range: f32,
    /// Distance from the unit's anchor within which it acquires targets.
    pub engage_range: f32,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Distance within which the unit stops hostiles.
    pub block_radius: f32,
}

/// Statistics of a single tower level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerLevel {
    /// Gold to build (level one) or to upgrade into this level.
    pub cost: u32,
    /// Gold refunded when selling a tower of this level.
    pub sell_value: u32,
    /// Damage per projectile.
    pub damage: f32,
    /// Targeting range, or rally range for barracks.
    pub range: f32,
    /// Milliseconds between shots.
    pub fire_interval_ms: u32,
    /// Area damage radius around the impact point.
    pub splash_radius: Option<f32>,
    /// Soldiers trained at this level (barracks only).
    pub soldier: Option<MeleeProfile>,
}

/// Statistics of a tower kind across its levels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerProfile {
    /// Kind of damage dealt by projectiles.
    pub damage_type: DamageType,
    /// Projectile flight speed in units per second.
    pub projectile_speed: f32,
    /// Whether projectiles land on the target's launch-time position.
    pub fixed_aim: bool,
    /// Slow applied by every hit.
    pub slow: Option<SlowEffect>,
    /// Number of soldiers trained (barracks only).
    pub soldiers: u32,
    /// Milliseconds a fallen soldier waits before returning.
    pub soldier_respawn_ms: u32,
    /// Per-level statistics, level one first.
    pub levels: Vec<TowerLevel>,
}

impl TowerProfile {
    /// Statistics of the provided one-based level, if configured.
    #[must_use]
    pub fn level(&self, level: u8) -> Option<&TowerLevel> {
        let index = usize::from(level).checked_sub(1)?;
        self.levels.get(index)
    }

    /// Highest level the tower can reach.
    #[must_use]
    pub fn max_level(&self) -> u8 {
        u8::try_from(self.levels.len())
            .unwrap_or(MAX_TOWER_LEVEL)
            .min(MAX_TOWER_LEVEL)
    }
}

/// Tower statistics keyed by kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerTable {
    /// Archer tower.
    pub archer: TowerProfile,
    /// Mage tower.
    pub mage: TowerProfile,
    /// Artillery tower.
    pub artillery: TowerProfile,
    /// Barracks.
    pub barracks: TowerProfile,
}

impl TowerTable {
    /// Profile of the provided tower kind.
    #[must_use]
    pub const fn profile(&self, kind: TowerKind) -> &TowerProfile {
        match kind {
            TowerKind::Archer => &self.archer,
            TowerKind::Mage => &self.mage,
            TowerKind::Artillery => &self.artillery,
            TowerKind::Barracks => &self.barracks,
        }
    }
}

/// Statistics of a hostile kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostileProfile {
    /// Health at spawn.
    pub max_health: f32,
    /// Walking speed in units per second.
    pub speed: f32,
    /// Armor worn.
    pub armor: Armor,
    /// Damage per strike against blockers.
    pub damage: f32,
    /// Milliseconds between strikes.
    pub attack_interval_ms: u32,
    /// Gold dropped on death.
    pub bounty: u32,
}

/// Hostile statistics keyed by kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostileTable {
    /// Goblin.
    pub goblin: HostileProfile,
    /// Wolf.
    pub wolf: HostileProfile,
    /// Orc.
    pub orc: HostileProfile,
    /// Shaman.
    pub shaman: HostileProfile,
    /// Ogre.
    pub ogre: HostileProfile,
}

impl HostileTable {
    /// Profile of the provided hostile kind.
    #[must_use]
    pub const fn profile(&self, kind: HostileKind) -> &HostileProfile {
        match kind {
            HostileKind::Goblin => &self.goblin,
            HostileKind::Wolf => &self.wolf,
            HostileKind::Orc => &self.orc,
            HostileKind::Shaman => &self.shaman,
            HostileKind::Ogre => &self.ogre,
        }
    }
}

/// Hero statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeroProfile {
    /// Melee statistics; `engage_range` is measured from the rally point.
    pub unit: MeleeProfile,
    /// Grid coordinate of the start position.
    pub start: Vec2,
    /// Milliseconds between defeat and return.
    pub respawn_ms: u32,
    /// Milliseconds between ability activations.
    pub ability_cooldown_ms: u32,
    /// Milliseconds the ability stays active.
    pub ability_duration_ms: u32,
    /// Radius around the hero in which hostiles are taunted.
    pub ability_range: f32,
    /// Armor added while the ability is active.
    pub ability_armor_bonus: f32,
    /// Upper bound on armor while the ability is active.
    pub armor_cap: f32,
}

/// Statistics of summoned reinforcements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReinforcementProfile {
    /// Melee statistics.
    pub unit: MeleeProfile,
    /// Units summoned per cast.
    pub count: u32,
    /// Milliseconds a unit stays on the field.
    pub lifetime_ms: u32,
}

/// Statistics of a spell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpellProfile {
    /// Gold spent per cast.
    pub cost: u32,
    /// Milliseconds between casts.
    pub cooldown_ms: u32,
    /// Magic damage dealt in the area, if any.
    pub damage: f32,
    /// Radius of the damaged area, or spread of summoned units.
    pub radius: f32,
}

/// Spell statistics keyed by kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpellTable {
    /// Rain of fire.
    pub rain_of_fire: SpellProfile,
    /// Reinforcements.
    pub reinforcements: SpellProfile,
}

impl SpellTable {
    /// Profile of the provided spell.
    #[must_use]
    pub const fn profile(&self, spell: SpellKind) -> &SpellProfile {
        match spell {
            SpellKind::RainOfFire => &self.rain_of_fire,
            SpellKind::Reinforcements => &self.reinforcements,
        }
    }
}

/// Ordered hostile spawns emitted at a fixed interval.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// Milliseconds between consecutive spawns.
    pub interval_ms: u32,
    /// Hostiles spawned, in order.
    pub spawns: Vec<HostileKind>,
}

/// Complete static configuration of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Milliseconds simulated per tick.
    pub tick_interval_ms: u32,
    /// Maximum ticks a single clock advance may produce.
    pub max_substeps: u32,
    /// Gold at the start of a run.
    pub starting_gold: u32,
    /// Lives at the start of a run.
    pub starting_lives: u32,
    /// Milliseconds between a cleared wave and the automatic next wave.
    pub wave_countdown_ms: u32,
    /// Gold granted for calling a wave early.
    pub early_wave_bonus: u32,
    /// Milliseconds removed from every spell cooldown when calling early.
    pub early_cooldown_reduction_ms: u32,
    /// Currency particle speed in units per second.
    pub particle_speed: f32,
    /// Screen-space point currency particles fly to.
    pub collection_point: Vec2,
    /// Distance at which a particle counts as collected.
    pub particle_arrival_threshold: f32,
    /// Milliseconds an explosion marker stays visible.
    pub explosion_lifetime_ms: u32,
    /// Milliseconds an attack animation stays visible.
    pub attack_flash_ms: u32,
    /// Displacement from the rally point below which idle units hold.
    pub rally_deadband: f32,
    /// Radius of the soldier formation around a barracks rally point.
    pub formation_radius: f32,
    /// Multiplier applied to magic damage against unarmored targets.
    pub magic_bonus: f32,
    /// Grid-to-screen projection.
    pub projection: IsometricProjection,
    /// Lane waypoints in grid coordinates.
    pub path: Vec<Vec2>,
    /// Build spots in grid coordinates; the index is the spot identifier.
    pub build_spots: Vec<Vec2>,
    /// Tower statistics.
    pub towers: TowerTable,
    /// Hostile statistics.
    pub hostiles: HostileTable,
    /// Hero statistics.
    pub hero: HeroProfile,
    /// Reinforcement statistics.
    pub reinforcement: ReinforcementProfile,
    /// Spell statistics.
    pub spells: SpellTable,
    /// Waves in order.
    pub waves: Vec<WaveDefinition>,
}

impl GameConfig {
    /// Parses a TOML document layered over the defaults and validates it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.path.len() < 2 {
            return Err(ConfigError::PathTooShort {
                points: self.path.len(),
            });
        }
        for kind in TowerKind::ALL {
            let profile = self.towers.profile(kind);
            let levels = profile.levels.len();
            if levels == 0 || levels > usize::from(MAX_TOWER_LEVEL) {
                return Err(ConfigError::TowerLevels { kind, levels });
            }
            if kind.trains_soldiers() {
                if let Some(index) = profile.levels.iter().position(|level| level.soldier.is_none())
                {
                    return Err(ConfigError::MissingSoldierProfile { level: index + 1 });
                }
            }
        }
        if self.waves.is_empty() {
            return Err(ConfigError::NoWaves);
        }
        if let Some(index) = self.waves.iter().position(|wave| wave.spawns.is_empty()) {
            return Err(ConfigError::EmptyWave { wave: index + 1 });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            max_substeps: 8,
            starting_gold: 220,
            starting_lives: 20,
            wave_countdown_ms: 15_000,
            early_wave_bonus: 20,
            early_cooldown_reduction_ms: 5_000,
            particle_speed: 600.0,
            collection_point: Vec2::new(40.0, 24.0),
            particle_arrival_threshold: 20.0,
            explosion_lifetime_ms: 400,
            attack_flash_ms: 200,
            rally_deadband: 5.0,
            formation_radius: 14.0,
            magic_bonus: 1.25,
            projection: IsometricProjection::new(Vec2::new(480.0, 80.0), 64.0, 32.0),
            path: grid(&[
                (0.0, 2.0),
                (6.0, 2.0),
                (6.0, 7.0),
                (2.0, 7.0),
                (2.0, 12.0),
                (9.0, 12.0),
                (9.0, 5.0),
                (13.0, 5.0),
                (13.0, 14.0),
            ]),
            build_spots: grid(&[
                (3.5, 4.0),
                (8.0, 4.0),
                (4.0, 9.5),
                (7.0, 10.0),
                (11.0, 3.0),
                (11.0, 8.0),
                (11.0, 11.0),
                (15.0, 9.0),
            ]),
            towers: TowerTable {
                archer: shooter(
                    DamageType::Physical,
                    420.0,
                    false,
                    None,
                    [
                        (70, 42, 6.0, 140.0, 800, None),
                        (110, 108, 10.0, 160.0, 700, None),
                        (160, 204, 16.0, 180.0, 600, None),
                    ],
                ),
                mage: shooter(
                    DamageType::Magic,
                    300.0,
                    false,
                    Some(SlowEffect {
                        factor: 0.5,
                        duration_ms: 1_500,
                    }),
                    [
                        (100, 60, 14.0, 120.0, 1_500, None),
                        (160, 156, 24.0, 130.0, 1_400, None),
                        (240, 300, 40.0, 140.0, 1_300, None),
                    ],
                ),
                artillery: shooter(
                    DamageType::Physical,
                    220.0,
                    true,
                    None,
                    [
                        (125, 75, 20.0, 150.0, 3_000, Some(45.0)),
                        (220, 207, 35.0, 160.0, 2_800, Some(55.0)),
                        (320, 399, 60.0, 170.0, 2_500, Some(65.0)),
                    ],
                ),
                barracks: TowerProfile {
                    damage_type: DamageType::Physical,
                    projectile_speed: 0.0,
                    fixed_aim: false,
                    slow: None,
                    soldiers: 3,
                    soldier_respawn_ms: 10_000,
                    levels: vec![
                        barracks_level(90, 54, soldier(50.0, 3.0, 0.0)),
                        barracks_level(140, 138, soldier(80.0, 6.0, 0.15)),
                        barracks_level(200, 258, soldier(120.0, 9.0, 0.3)),
                    ],
                },
            },
            hostiles: HostileTable {
                goblin: hostile(35.0, 50.0, Armor::NONE, 2.0, 4),
                wolf: hostile(50.0, 80.0, Armor::NONE, 3.0, 6),
                orc: hostile(120.0, 36.0, Armor::physical(0.3), 6.0, 10),
                shaman: hostile(80.0, 40.0, Armor::magic(0.5), 4.0, 12),
                ogre: hostile(400.0, 28.0, Armor::physical(0.5), 15.0, 30),
            },
            hero: HeroProfile {
                unit: MeleeProfile {
                    max_health: 200.0,
                    damage: 12.0,
                    damage_type: DamageType::Physical,
                    armor: Armor::physical(0.2),
                    attack_interval_ms: 900,
                    attack_range: 28.0,
                    engage_range: 120.0,
                    speed: 90.0,
                    block_radius: 30.0,
                },
                start: Vec2::new(8.0, 9.0),
                respawn_ms: 15_000,
                ability_cooldown_ms: 20_000,
                ability_duration_ms: 6_000,
                ability_range: 110.0,
                ability_armor_bonus: 0.4,
                armor_cap: 0.9,
            },
            reinforcement: ReinforcementProfile {
                unit: MeleeProfile {
                    max_health: 40.0,
                    damage: 4.0,
                    damage_type: DamageType::Physical,
                    armor: Armor::NONE,
                    attack_interval_ms: 1_000,
                    attack_range: 20.0,
                    engage_range: 80.0,
                    speed: 70.0,
                    block_radius: 24.0,
                },
                count: 2,
                lifetime_ms: 20_000,
            },
            spells: SpellTable {
                rain_of_fire: SpellProfile {
                    cost: 50,
                    cooldown_ms: 30_000,
                    damage: 60.0,
                    radius: 60.0,
                },
                reinforcements: SpellProfile {
                    cost: 25,
                    cooldown_ms: 15_000,
                    damage: 0.0,
                    radius: 12.0,
                },
            },
            waves: vec![
                wave(1_200, &[(HostileKind::Goblin, 6)]),
                wave(1_000, &[(HostileKind::Goblin, 5), (HostileKind::Wolf, 3)]),
                wave(1_200, &[(HostileKind::Orc, 4), (HostileKind::Goblin, 4)]),
                wave(
                    1_000,
                    &[
                        (HostileKind::Shaman, 3),
                        (HostileKind::Wolf, 4),
                        (HostileKind::Orc, 3),
                    ],
                ),
                wave(
                    1_100,
                    &[
                        (HostileKind::Ogre, 2),
                        (HostileKind::Orc, 6),
                        (HostileKind::Shaman, 4),
                    ],
                ),
            ],
        }
    }
}

fn grid(points: &[(f32, f32)]) -> Vec<Vec2> {
    points.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
}

type LevelRow = (u32, u32, f32, f32, u32, Option<f32>);

fn shooter(
    damage_type: DamageType,
    projectile_speed: f32,
    fixed_aim: bool,
    slow: Option<SlowEffect>,
    levels: [LevelRow; 3],
) -> TowerProfile {
    TowerProfile {
        damage_type,
        projectile_speed,
        fixed_aim,
        slow,
        soldiers: 0,
        soldier_respawn_ms: 0,
        levels: levels
            .into_iter()
            .map(
                |(cost, sell_value, damage, range, fire_interval_ms, splash_radius)| TowerLevel {
                    cost,
                    sell_value,
                    damage,
                    range,
                    fire_interval_ms,
                    splash_radius,
                    soldier: None,
                },
            )
            .collect(),
    }
}

fn barracks_level(cost: u32, sell_value: u32, soldier: MeleeProfile) -> TowerLevel {
    TowerLevel {
        cost,
        sell_value,
        damage: soldier.damage,
        range: 160.0,
        fire_interval_ms: soldier.attack_interval_ms,
        splash_radius: None,
        soldier: Some(soldier),
    }
}

fn soldier(max_health: f32, damage: f32, armor: f32) -> MeleeProfile {
    MeleeProfile {
        max_health,
        damage,
        damage_type: DamageType::Physical,
        armor: Armor::physical(armor),
        attack_interval_ms: 1_000,
        attack_range: 20.0,
        engage_range: 80.0,
        speed: 70.0,
        block_radius: 24.0,
    }
}

fn hostile(max_health: f32, speed: f32, armor: Armor, damage: f32, bounty: u32) -> HostileProfile {
    HostileProfile {
        max_health,
        speed,
        armor,
        damage,
        attack_interval_ms: 1_000,
        bounty,
    }
}

fn wave(interval_ms: u32, groups: &[(HostileKind, usize)]) -> WaveDefinition {
    WaveDefinition {
        interval_ms,
        spawns: groups
            .iter()
            .flat_map(|&(kind, count)| std::iter::repeat(kind).take(count))
            .collect(),
    }
}
