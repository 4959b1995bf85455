use std::time::Duration;

use glam::Vec2;
use lane_defence_core::{Command, EntityRef, Event, SpellKind, SpotId, TowerId, TowerKind};
use lane_defence_world::{self as world, query, World};

#[test]
fn deterministic_replay_produces_identical_snapshots() {
    let (first_snapshot, first_events) = replay(scripted_commands());
    let (second_snapshot, second_events) = replay(scripted_commands());

    assert_eq!(first_events, second_events, "event logs diverged");
    assert_eq!(first_snapshot, second_snapshot, "snapshots diverged");
    assert!(first_events
        .iter()
        .any(|event| matches!(event, Event::HostileSpawned { .. })));
}

#[test]
fn snapshots_survive_a_binary_round_trip() {
    let mut world = World::default();
    for command in scripted_commands() {
        world::apply(&mut world, command, &mut Vec::new());
    }
    let snapshot = query::snapshot(&world);

    let bytes = bincode::serialize(&snapshot).expect("snapshot serializes");
    let decoded: query::Snapshot = bincode::deserialize(&bytes).expect("snapshot deserializes");

    assert_eq!(decoded, snapshot);
}

fn replay(commands: Vec<Command>) -> (Vec<u8>, Vec<Event>) {
    let mut world = World::default();
    let mut log = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut log);
    }
    let snapshot = bincode::serialize(&query::snapshot(&world)).expect("snapshot serializes");
    (snapshot, log)
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = vec![
        Command::BuildTower {
            spot: SpotId::new(0),
            kind: TowerKind::Barracks,
        },
        Command::BuildTower {
            spot: SpotId::new(2),
            kind: TowerKind::Archer,
        },
        Command::StartWave { early: false },
    ];
    for step in 0..240_u32 {
        commands.push(Command::Tick {
            dt: Duration::from_millis(u64::from(17 + step % 23)),
        });
        match step {
            40 => commands.push(Command::TriggerHeroAbility),
            80 => commands.push(Command::CastSpell {
                spell: SpellKind::Reinforcements,
                target: Vec2::new(420.0, 180.0),
            }),
            120 => commands.push(Command::SetRallyPoint {
                unit: EntityRef::Tower(TowerId::new(0)),
                target: Vec2::new(470.0, 170.0),
            }),
            160 => commands.push(Command::CastSpell {
                spell: SpellKind::RainOfFire,
                target: Vec2::new(420.0, 112.0),
            }),
            _ => {}
        }
    }
    commands
}
