#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lane Defence.
//!
//! The world owns every entity collection and the run context. Adapters
//! mutate it exclusively through [`apply`] and observe it through [`query`].
//! Each fixed simulation step runs the phases in a binding order: spawning,
//! the hero, towers, soldiers, reinforcements, projectiles, hostiles,
//! economy, and finally the end-of-step evaluation.

use std::time::Duration;

use glam::Vec2;
use lane_defence_core::{
    Command, CurrencyParticle, EntityRef, Event, Explosion, ExplosionId, GameConfig, Hero, HeroId,
    Hostile, HostileId, ParticleId, Projectile, ProjectileId, Reinforcement, ReinforcementId,
    Rejection, Soldier, SoldierId, Tower, TowerId, WELCOME_BANNER,
};
use lane_defence_system_economy::{Ledger, SpellBook};
use lane_defence_system_waves::WaveDirector;
use tracing::{debug, info};

mod clock;
mod commands;
pub mod query;
mod registry;
mod tick;

pub use clock::FixedClock;

use registry::Registry;

const HERO_ID: HeroId = HeroId::new(0);

/// Per-run resources restored by `Reset`.
#[derive(Clone, Debug)]
struct RunContext {
    ledger: Ledger,
    lives: u32,
    spells: SpellBook,
    elapsed_ms: u64,
    paused: bool,
}

impl RunContext {
    fn new(config: &GameConfig) -> Self {
        Self {
            ledger: Ledger::new(config.starting_gold),
            lives: config.starting_lives,
            spells: SpellBook::new(),
            elapsed_ms: 0,
            paused: false,
        }
    }
}

/// Represents the authoritative Lane Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: GameConfig,
    waypoints: Vec<Vec2>,
    build_spots: Vec<Vec2>,
    towers: Registry<TowerId, Tower>,
    hostiles: Registry<HostileId, Hostile>,
    projectiles: Registry<ProjectileId, Projectile>,
    soldiers: Registry<SoldierId, Soldier>,
    reinforcements: Registry<ReinforcementId, Reinforcement>,
    explosions: Registry<ExplosionId, Explosion>,
    particles: Registry<ParticleId, CurrencyParticle>,
    hero: Hero,
    director: WaveDirector,
    run: RunContext,
    selection: Option<EntityRef>,
    clock: FixedClock,
    tick_index: u64,
}

impl World {
    /// Creates a world for the provided configuration, projecting the map
    /// from grid to screen space once.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let projection = config.projection;
        let waypoints = config
            .path
            .iter()
            .map(|&point| projection.project(point))
            .collect();
        let build_spots = config
            .build_spots
            .iter()
            .map(|&point| projection.project(point))
            .collect();
        let hero = fresh_hero(&config);
        let clock = FixedClock::new(
            Duration::from_millis(u64::from(config.tick_interval_ms)),
            config.max_substeps,
        );

        Self {
            banner: WELCOME_BANNER,
            waypoints,
            build_spots,
            towers: Registry::new(),
            hostiles: Registry::new(),
            projectiles: Registry::new(),
            soldiers: Registry::new(),
            reinforcements: Registry::new(),
            explosions: Registry::new(),
            particles: Registry::new(),
            hero,
            director: WaveDirector::new(config.wave_countdown_ms),
            run: RunContext::new(&config),
            selection: None,
            clock,
            tick_index: 0,
            config,
        }
    }

    fn restart(&mut self) {
        self.towers.clear();
        self.hostiles.clear();
        self.projectiles.clear();
        self.soldiers.clear();
        self.reinforcements.clear();
        self.explosions.clear();
        self.particles.clear();
        self.hero = fresh_hero(&self.config);
        self.director.reset();
        self.run = RunContext::new(&self.config);
        self.selection = None;
        self.clock.reset();
        self.tick_index = 0;
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.run.paused {
            return;
        }
        let steps = self.clock.advance(dt);
        for _ in 0..steps {
            if self.director.status().is_terminal() {
                break;
            }
            self.step(out_events);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

fn fresh_hero(config: &GameConfig) -> Hero {
    let start = config.projection.project(config.hero.start);
    Hero::new(HERO_ID, start, config.hero.unit)
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands whose preconditions fail leave the world untouched and report
/// [`Event::CommandRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.director.status().is_terminal() {
        match command {
            Command::Reset => {}
            Command::Tick { .. } => return,
            _ => {
                reject(Rejection::RunOver, out_events);
                return;
            }
        }
    }

    let result = match command {
        Command::StartWave { early } => world.start_wave(early, out_events),
        Command::BuildTower { spot, kind } => world.build_tower(spot, kind, out_events),
        Command::UpgradeTower { tower } => world.upgrade_tower(tower, out_events),
        Command::SellTower { tower } => world.sell_tower(tower, out_events),
        Command::CastSpell { spell, target } => world.cast_spell(spell, target, out_events),
        Command::SetRallyPoint { unit, target } => world.set_rally_point(unit, target, out_events),
        Command::TriggerHeroAbility => world.trigger_hero_ability(out_events),
        Command::SelectUnit { entity } => world.select(entity, out_events),
        Command::Pause => {
            world.run.paused = true;
            out_events.push(Event::Paused);
            Ok(())
        }
        Command::Resume => {
            world.run.paused = false;
            out_events.push(Event::Resumed);
            Ok(())
        }
        Command::Reset => {
            world.restart();
            info!("run reset");
            out_events.push(Event::RunReset);
            Ok(())
        }
        Command::Tick { dt } => {
            world.advance(dt, out_events);
            Ok(())
        }
    };

    if let Err(reason) = result {
        reject(reason, out_events);
    }
}

fn reject(reason: Rejection, out_events: &mut Vec<Event>) {
    debug!(%reason, "command rejected");
    out_events.push(Event::CommandRejected { reason });
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{RunStatus, SpotId, TowerKind};

    fn tick(world: &mut World, events: &mut Vec<Event>) {
        let dt = query::tick_interval(world);
        apply(world, Command::Tick { dt }, events);
    }

    #[test]
    fn new_world_exposes_starting_resources() {
        let world = World::default();
        let stats = query::stats(&world);

        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(stats.gold, 220);
        assert_eq!(stats.lives, 20);
        assert_eq!(stats.status, RunStatus::Idle);
        assert_eq!(stats.total_waves, 5);
    }

    #[test]
    fn tick_emits_time_advanced_once_per_step() {
        let mut world = World::default();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(120),
            },
            &mut events,
        );

        let advanced = events
            .iter()
            .filter(|event| matches!(event, Event::TimeAdvanced { .. }))
            .count();
        assert_eq!(advanced, 2, "120 ms covers two 50 ms steps");
        assert_eq!(query::stats(&world).elapsed_ms, 100);
    }

    #[test]
    fn paused_world_ignores_ticks_but_accepts_commands() {
        let mut world = World::default();
        let mut events = Vec::new();

        apply(&mut world, Command::Pause, &mut events);
        tick(&mut world, &mut events);
        apply(
            &mut world,
            Command::BuildTower {
                spot: SpotId::new(0),
                kind: TowerKind::Archer,
            },
            &mut events,
        );

        assert_eq!(query::stats(&world).elapsed_ms, 0);
        assert_eq!(query::towers(&world).count(), 1);
        assert!(query::stats(&world).paused);
    }

    #[test]
    fn reset_keeps_identifiers_unique() {
        let mut world = World::default();
        let mut events = Vec::new();
        let build = Command::BuildTower {
            spot: SpotId::new(0),
            kind: TowerKind::Archer,
        };

        apply(&mut world, build.clone(), &mut events);
        let first = query::towers(&world).next().map(|tower| tower.id);
        apply(&mut world, Command::Reset, &mut events);
        apply(&mut world, build, &mut events);
        let second = query::towers(&world).next().map(|tower| tower.id);

        assert!(first.is_some());
        assert_ne!(first, second);
        assert_eq!(query::stats(&world).gold, 220 - 70);
    }
}
