//! Read-only views over the world for adapters and tests.

use std::time::Duration;

use glam::Vec2;
use lane_defence_core::{
    CurrencyParticle, EntityRef, Explosion, GameConfig, Hero, Hostile, HostileId, Projectile,
    Reinforcement, RunStatus, Soldier, SoldierId, SpellKind, SpotId, Tower, TowerId,
};
use serde::{Deserialize, Serialize};

use super::World;

/// Retrieves the welcome banner that adapters may display to players.
#[must_use]
pub fn welcome_banner(world: &World) -> &'static str {
    world.banner
}

/// Duration of one fixed simulation step.
#[must_use]
pub fn tick_interval(world: &World) -> Duration {
    world.clock.step()
}

/// Configuration the world was created with.
#[must_use]
pub fn config(world: &World) -> &GameConfig {
    &world.config
}

/// Lane waypoints in screen space, from spawn to exit.
#[must_use]
pub fn waypoints(world: &World) -> &[Vec2] {
    &world.waypoints
}

/// Build spot as seen by adapters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildSpot {
    /// Identifier used by build commands.
    pub id: SpotId,
    /// Screen-space position.
    pub position: Vec2,
    /// Tower standing on the spot, if any.
    pub tower: Option<TowerId>,
}

/// Enumerates every build spot together with its occupant.
#[must_use]
pub fn build_spots(world: &World) -> Vec<BuildSpot> {
    (0_u32..)
        .zip(&world.build_spots)
        .map(|(index, &position)| {
            let id = SpotId::new(index);
            BuildSpot {
                id,
                position,
                tower: world
                    .towers
                    .values()
                    .find(|tower| tower.spot == id)
                    .map(|tower| tower.id),
            }
        })
        .collect()
}

/// Towers in identifier order.
pub fn towers(world: &World) -> impl Iterator<Item = &Tower> + '_ {
    world.towers.values()
}

/// Looks up a tower, returning `None` for stale identifiers.
#[must_use]
pub fn tower(world: &World, id: TowerId) -> Option<&Tower> {
    world.towers.get(id)
}

/// Hostiles in identifier order, which is also spawn order.
pub fn hostiles(world: &World) -> impl Iterator<Item = &Hostile> + '_ {
    world.hostiles.values()
}

/// Looks up a hostile, returning `None` once it died or leaked.
#[must_use]
pub fn hostile(world: &World, id: HostileId) -> Option<&Hostile> {
    world.hostiles.get(id)
}

/// Projectiles currently in flight.
pub fn projectiles(world: &World) -> impl Iterator<Item = &Projectile> + '_ {
    world.projectiles.values()
}

/// Barracks soldiers, including those waiting to respawn.
pub fn soldiers(world: &World) -> impl Iterator<Item = &Soldier> + '_ {
    world.soldiers.values()
}

/// Looks up a soldier, returning `None` once its barracks was sold.
#[must_use]
pub fn soldier(world: &World, id: SoldierId) -> Option<&Soldier> {
    world.soldiers.get(id)
}

/// The hero.
#[must_use]
pub fn hero(world: &World) -> &Hero {
    &world.hero
}

/// Summoned reinforcements still on the field.
pub fn reinforcements(world: &World) -> impl Iterator<Item = &Reinforcement> + '_ {
    world.reinforcements.values()
}

/// Explosion effects that have not faded yet.
pub fn explosions(world: &World) -> impl Iterator<Item = &Explosion> + '_ {
    world.explosions.values()
}

/// Currency particles flying toward the collection point.
pub fn particles(world: &World) -> impl Iterator<Item = &CurrencyParticle> + '_ {
    world.particles.values()
}

/// Scalar run state shown in a HUD.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Spendable gold.
    pub gold: u32,
    /// Remaining lives.
    pub lives: u32,
    /// One-based number of the latest wave started, zero before the first.
    pub wave: u32,
    /// Number of waves in the run.
    pub total_waves: u32,
    /// Run status.
    pub status: RunStatus,
    /// Remaining cooldown per spell.
    pub spell_cooldowns: Vec<(SpellKind, u32)>,
    /// Countdown until the next wave starts on its own.
    pub next_wave_countdown_ms: Option<u32>,
    /// Remaining cooldown of the hero ability.
    pub hero_ability_cooldown_ms: u32,
    /// Whether ticks are suspended.
    pub paused: bool,
    /// Simulated time since the run started.
    pub elapsed_ms: u64,
    /// Number of simulation steps run so far.
    pub tick: u64,
}

/// Collects the scalar run state.
#[must_use]
pub fn stats(world: &World) -> Stats {
    let status = world.director.status();
    Stats {
        gold: world.run.ledger.gold(),
        lives: world.run.lives,
        wave: world.director.wave(),
        total_waves: u32::try_from(world.config.waves.len()).unwrap_or(u32::MAX),
        status,
        spell_cooldowns: world.run.spells.snapshot(),
        next_wave_countdown_ms: (status == RunStatus::WaveComplete)
            .then(|| world.director.countdown_ms()),
        hero_ability_cooldown_ms: world.hero.ability_cooldown_ms,
        paused: world.run.paused,
        elapsed_ms: world.run.elapsed_ms,
        tick: world.tick_index,
    }
}

/// Borrowed view of the selected entity.
#[derive(Clone, Copy, Debug)]
pub enum Selected<'a> {
    /// A tower.
    Tower(&'a Tower),
    /// A hostile.
    Hostile(&'a Hostile),
    /// A barracks soldier.
    Soldier(&'a Soldier),
    /// A reinforcement.
    Reinforcement(&'a Reinforcement),
    /// The hero.
    Hero(&'a Hero),
}

/// Resolves the current selection, or `None` if nothing is selected or the
/// selected entity no longer exists.
#[must_use]
pub fn selection(world: &World) -> Option<Selected<'_>> {
    match world.selection? {
        EntityRef::Tower(id) => world.towers.get(id).map(Selected::Tower),
        EntityRef::Hostile(id) => world.hostiles.get(id).map(Selected::Hostile),
        EntityRef::Soldier(id) => world.soldiers.get(id).map(Selected::Soldier),
        EntityRef::Reinforcement(id) => world.reinforcements.get(id).map(Selected::Reinforcement),
        EntityRef::Hero => Some(Selected::Hero(&world.hero)),
    }
}

/// Owned copy of the entire observable world state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Scalar run state.
    pub stats: Stats,
    /// Towers in identifier order.
    pub towers: Vec<Tower>,
    /// Hostiles in identifier order.
    pub hostiles: Vec<Hostile>,
    /// Projectiles in identifier order.
    pub projectiles: Vec<Projectile>,
    /// Soldiers in identifier order.
    pub soldiers: Vec<Soldier>,
    /// The hero.
    pub hero: Hero,
    /// Reinforcements in identifier order.
    pub reinforcements: Vec<Reinforcement>,
    /// Explosions in identifier order.
    pub explosions: Vec<Explosion>,
    /// Currency particles in identifier order.
    pub particles: Vec<CurrencyParticle>,
    /// Selected entity, if it still exists.
    pub selection: Option<EntityRef>,
}

/// Copies the observable state out of the world.
#[must_use]
pub fn snapshot(world: &World) -> Snapshot {
    Snapshot {
        stats: stats(world),
        towers: world.towers.values().cloned().collect(),
        hostiles: world.hostiles.values().cloned().collect(),
        projectiles: world.projectiles.values().cloned().collect(),
        soldiers: world.soldiers.values().cloned().collect(),
        hero: world.hero.clone(),
        reinforcements: world.reinforcements.values().cloned().collect(),
        explosions: world.explosions.values().cloned().collect(),
        particles: world.particles.values().cloned().collect(),
        selection: world.selection.filter(|&entity| world.exists(entity)),
    }
}
