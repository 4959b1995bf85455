//! Seeded autoplay strategy used when no command script is supplied.

use glam::Vec2;
use lane_defence_core::{Command, Hostile, RunStatus, SpotId, TowerKind};
use lane_defence_world::{query, World};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const BUILD_CHANCE: f64 = 0.08;
const UPGRADE_CHANCE: f64 = 0.03;
const EARLY_CALL_CHANCE: f64 = 0.01;
const SPELL_JITTER: f32 = 12.0;

/// Picks player commands between ticks.
///
/// The same seed and world always produce the same plan.
#[derive(Debug)]
pub(crate) struct Autopilot {
    rng: ChaCha8Rng,
}

impl Autopilot {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Commands to issue before the next tick.
    pub(crate) fn plan(&mut self, world: &World) -> Vec<Command> {
        let mut commands = Vec::new();
        let stats = query::stats(world);

        match stats.status {
            RunStatus::Idle => commands.push(Command::StartWave { early: false }),
            RunStatus::WaveComplete if self.rng.gen_bool(EARLY_CALL_CHANCE) => {
                commands.push(Command::StartWave { early: true });
            }
            _ => {}
        }

        if self.rng.gen_bool(BUILD_CHANCE) {
            commands.extend(self.build(world, stats.gold));
        } else if self.rng.gen_bool(UPGRADE_CHANCE) {
            commands.extend(self.upgrade(world, stats.gold));
        }

        if let Some(front) = leading_hostile(world) {
            let config = query::config(world);
            for (spell, remaining) in &stats.spell_cooldowns {
                if *remaining == 0 && config.spells.profile(*spell).cost <= stats.gold {
                    let target = front.position + self.jitter();
                    commands.push(Command::CastSpell {
                        spell: *spell,
                        target,
                    });
                    break;
                }
            }

            let hero = query::hero(world);
            if stats.hero_ability_cooldown_ms == 0
                && hero.unit.is_active()
                && hero.unit.position.distance(front.position) <= config.hero.ability_range
            {
                commands.push(Command::TriggerHeroAbility);
            }
        }

        commands
    }

    fn build(&mut self, world: &World, gold: u32) -> Option<Command> {
        let free: Vec<SpotId> = query::build_spots(world)
            .into_iter()
            .filter(|spot| spot.tower.is_none())
            .map(|spot| spot.id)
            .collect();
        let config = query::config(world);
        let affordable: Vec<TowerKind> = TowerKind::ALL
            .into_iter()
            .filter(|&kind| {
                config
                    .towers
                    .profile(kind)
                    .level(1)
                    .is_some_and(|level| level.cost <= gold)
            })
            .collect();

        let spot = *free.choose(&mut self.rng)?;
        let kind = *affordable.choose(&mut self.rng)?;
        Some(Command::BuildTower { spot, kind })
    }

    fn upgrade(&mut self, world: &World, gold: u32) -> Option<Command> {
        let config = query::config(world);
        let candidates: Vec<_> = query::towers(world)
            .filter(|tower| {
                config
                    .towers
                    .profile(tower.kind)
                    .level(tower.level.saturating_add(1))
                    .is_some_and(|level| level.cost <= gold)
            })
            .map(|tower| tower.id)
            .collect();
        let tower = *candidates.choose(&mut self.rng)?;
        Some(Command::UpgradeTower { tower })
    }

    fn jitter(&mut self) -> Vec2 {
        Vec2::new(
            self.rng.gen_range(-SPELL_JITTER..=SPELL_JITTER),
            self.rng.gen_range(-SPELL_JITTER..=SPELL_JITTER),
        )
    }
}

/// Living hostile furthest along the lane.
fn leading_hostile(world: &World) -> Option<&Hostile> {
    query::hostiles(world)
        .filter(|hostile| hostile.is_alive())
        .max_by_key(|hostile| hostile.path_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::SpellKind;
    use lane_defence_world as world;

    #[test]
    fn fresh_runs_start_the_first_wave() {
        let world = World::default();
        let mut pilot = Autopilot::new(7);

        let plan = pilot.plan(&world);

        assert_eq!(plan.first(), Some(&Command::StartWave { early: false }));
    }

    #[test]
    fn equal_seeds_play_identical_games() {
        let play = |seed| {
            let mut world = World::default();
            let mut pilot = Autopilot::new(seed);
            let mut issued = Vec::new();
            let dt = query::tick_interval(&world);
            for _ in 0..400 {
                for command in pilot.plan(&world) {
                    world::apply(&mut world, command.clone(), &mut Vec::new());
                    issued.push(command);
                }
                world::apply(&mut world, Command::Tick { dt }, &mut Vec::new());
            }
            (issued, query::snapshot(&world))
        };

        assert_eq!(play(11), play(11));
    }

    #[test]
    fn spells_are_only_cast_at_hostiles() {
        let world = World::default();
        let mut pilot = Autopilot::new(3);

        for _ in 0..50 {
            let plan = pilot.plan(&world);
            assert!(!plan.iter().any(|command| matches!(
                command,
                Command::CastSpell {
                    spell: SpellKind::RainOfFire | SpellKind::Reinforcements,
                    ..
                }
            )));
        }
    }
}
