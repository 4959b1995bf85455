use glam::Vec2;
use lane_defence_core::{CurrencyParticle, ParticleId};
use lane_defence_system_economy::{step_particle, Ledger, ParticleStep};

const COLLECTION: Vec2 = Vec2::new(40.0, 24.0);

fn particle_at(position: Vec2, value: u32) -> CurrencyParticle {
    CurrencyParticle {
        id: ParticleId::new(1),
        source: position,
        position,
        value,
    }
}

#[test]
fn particle_flies_toward_the_collection_point() {
    let mut particle = particle_at(Vec2::new(640.0, 24.0), 6);

    let step = step_particle(&mut particle, COLLECTION, 600.0, 20.0, 0.5);

    assert_eq!(step, ParticleStep::InFlight);
    assert_eq!(particle.position, Vec2::new(340.0, 24.0));
}

#[test]
fn particle_within_threshold_is_collected_the_same_tick() {
    let mut ledger = Ledger::new(100);
    let mut particle = particle_at(Vec2::new(80.0, 24.0), 6);

    let step = step_particle(&mut particle, COLLECTION, 600.0, 20.0, 0.05);

    let ParticleStep::Arrived(value) = step else {
        panic!("particle should arrive, got {step:?}");
    };
    assert_eq!(ledger.credit(value), 106);
}

#[test]
fn arrival_threshold_is_inclusive() {
    let mut particle = particle_at(Vec2::new(60.0, 24.0), 3);

    let step = step_particle(&mut particle, COLLECTION, 0.0, 20.0, 0.05);

    assert_eq!(step, ParticleStep::Arrived(3));
}
