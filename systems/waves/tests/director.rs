use lane_defence_core::{HostileKind, RunStatus, WaveDefinition};
use lane_defence_system_waves::{Cue, Outcome, WaveDirector};

const TICK_MS: u32 = 50;

fn run_spawns(
    director: &mut WaveDirector,
    waves: &[WaveDefinition],
    ticks: u64,
) -> Vec<(u64, HostileKind)> {
    let mut spawns = Vec::new();
    for tick in 0..ticks {
        let now = tick * u64::from(TICK_MS);
        if let Some(Cue::Spawn(kind)) = director.tick(now, TICK_MS, waves) {
            spawns.push((now, kind));
        }
    }
    spawns
}

#[test]
fn wave_spawns_every_hostile_at_least_an_interval_apart() {
    let waves = vec![WaveDefinition {
        interval_ms: 1_200,
        spawns: vec![HostileKind::Goblin; 6],
    }];
    let mut director = WaveDirector::new(15_000);
    let _ = director.start_wave(false, &waves).expect("wave starts");

    let spawns = run_spawns(&mut director, &waves, 400);

    assert_eq!(spawns.len(), 6, "every queued hostile spawns exactly once");
    assert_eq!(spawns[0].0, 0, "the first spawn lands on the first tick");
    for pair in spawns.windows(2) {
        assert!(
            pair[1].0 - pair[0].0 >= 1_200,
            "spawns at {} and {} are closer than the interval",
            pair[0].0,
            pair[1].0,
        );
    }
}

#[test]
fn intervals_shorter_than_a_tick_still_spawn_one_per_tick() {
    let waves = vec![WaveDefinition {
        interval_ms: 10,
        spawns: vec![HostileKind::Wolf; 4],
    }];
    let mut director = WaveDirector::new(15_000);
    let _ = director.start_wave(false, &waves).expect("wave starts");

    let spawns = run_spawns(&mut director, &waves, 4);

    let times: Vec<u64> = spawns.iter().map(|&(time, _)| time).collect();
    assert_eq!(times, vec![0, 50, 100, 150]);
}

#[test]
fn spawns_follow_the_configured_order() {
    let waves = vec![WaveDefinition {
        interval_ms: 50,
        spawns: vec![HostileKind::Orc, HostileKind::Goblin, HostileKind::Ogre],
    }];
    let mut director = WaveDirector::new(15_000);
    let _ = director.start_wave(false, &waves).expect("wave starts");

    let kinds: Vec<HostileKind> = run_spawns(&mut director, &waves, 10)
        .into_iter()
        .map(|(_, kind)| kind)
        .collect();

    assert_eq!(
        kinds,
        vec![HostileKind::Orc, HostileKind::Goblin, HostileKind::Ogre]
    );
}

#[test]
fn wave_is_not_complete_while_hostiles_remain() {
    let waves = vec![WaveDefinition {
        interval_ms: 50,
        spawns: vec![HostileKind::Goblin],
    }];
    let mut director = WaveDirector::new(15_000);
    let _ = director.start_wave(false, &waves).expect("wave starts");
    let _ = run_spawns(&mut director, &waves, 1);

    assert_eq!(director.evaluate(1, 20, &waves), None);
    assert_eq!(director.status(), RunStatus::WaveInProgress);
    assert_eq!(director.evaluate(0, 20, &waves), Some(Outcome::Victory(1)));
    assert_eq!(director.status(), RunStatus::Victory);
}

#[test]
fn pending_spawns_block_completion_even_with_an_empty_lane() {
    let waves = vec![WaveDefinition {
        interval_ms: 1_000,
        spawns: vec![HostileKind::Goblin; 2],
    }];
    let mut director = WaveDirector::new(15_000);
    let _ = director.start_wave(false, &waves).expect("wave starts");
    let _ = run_spawns(&mut director, &waves, 1);

    assert_eq!(director.pending_spawns(&waves), 1);
    assert_eq!(director.evaluate(0, 20, &waves), None);
}
