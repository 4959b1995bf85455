use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use lane_defence_core::{
    Command, EntityRef, Event, GameConfig, HostileId, SpellKind, SpotId, TowerId, TowerKind,
};
use lane_defence_world::{self as world, query, World};
use proptest::prelude::*;

fn tower_kind() -> impl Strategy<Value = TowerKind> {
    prop::sample::select(TowerKind::ALL.to_vec())
}

fn spell() -> impl Strategy<Value = SpellKind> {
    prop::sample::select(SpellKind::ALL.to_vec())
}

fn point() -> impl Strategy<Value = Vec2> {
    (200.0_f32..800.0, 80.0_f32..500.0).prop_map(|(x, y)| Vec2::new(x, y))
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        6 => (0_u64..400).prop_map(|ms| Command::Tick {
            dt: Duration::from_millis(ms),
        }),
        2 => (0_u32..10, tower_kind()).prop_map(|(spot, kind)| Command::BuildTower {
            spot: SpotId::new(spot),
            kind,
        }),
        1 => (0_u32..8).prop_map(|id| Command::UpgradeTower {
            tower: TowerId::new(id),
        }),
        1 => (0_u32..8).prop_map(|id| Command::SellTower {
            tower: TowerId::new(id),
        }),
        1 => (spell(), point()).prop_map(|(spell, target)| Command::CastSpell { spell, target }),
        1 => any::<bool>().prop_map(|early| Command::StartWave { early }),
        1 => Just(Command::TriggerHeroAbility),
        1 => ((0_u32..8), point()).prop_map(|(id, target)| Command::SetRallyPoint {
            unit: EntityRef::Tower(TowerId::new(id)),
            target,
        }),
        1 => (0_u32..20).prop_map(|id| Command::SelectUnit {
            entity: Some(EntityRef::Hostile(HostileId::new(id))),
        }),
    ]
}

fn assert_invariants(world: &World, progress: &mut BTreeMap<HostileId, usize>, lives: &mut u32) {
    for hostile in query::hostiles(world) {
        assert!(hostile.health > 0.0, "dead hostile {:?} lingers", hostile.id);
        assert!(hostile.health <= hostile.max_health);
        let previous = progress.insert(hostile.id, hostile.path_index).unwrap_or(0);
        assert!(hostile.path_index >= previous, "hostile walked backwards");
    }
    for soldier in query::soldiers(world) {
        assert!((0.0..=soldier.unit.max_health()).contains(&soldier.unit.health));
        assert!(query::tower(world, soldier.barracks).is_some(), "orphaned soldier");
    }
    for unit in query::reinforcements(world) {
        assert!(unit.unit.health > 0.0);
    }
    let hero = query::hero(world);
    assert!((0.0..=hero.unit.max_health()).contains(&hero.unit.health));

    let stats = query::stats(world);
    assert!(stats.lives <= *lives, "lives never increase within a run");
    *lives = stats.lives;
    assert!(stats.wave <= stats.total_waves);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_command_streams_preserve_world_invariants(
        commands in prop::collection::vec(command(), 1..60),
    ) {
        let mut world = World::new(GameConfig {
            starting_gold: 1_500,
            ..GameConfig::default()
        });
        let mut progress = BTreeMap::new();
        let mut lives = query::stats(&world).lives;

        for command in commands {
            let gold_before = query::stats(&world).gold;
            let mut events = Vec::new();
            world::apply(&mut world, command, &mut events);

            if events
                .iter()
                .all(|event| matches!(event, Event::CommandRejected { .. }))
            {
                prop_assert_eq!(query::stats(&world).gold, gold_before);
            }
            assert_invariants(&world, &mut progress, &mut lives);
        }
    }
}
