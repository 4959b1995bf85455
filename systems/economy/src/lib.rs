#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Economy bookkeeping: the gold ledger, spell cooldowns, currency particles,
//! and the countdown arithmetic shared by every timer in the simulation.

use std::collections::BTreeMap;

use glam::Vec2;
use lane_defence_core::{geometry::step_toward, CurrencyParticle, Rejection, SpellKind};

/// Decrements a countdown by `dt_ms`, flooring at zero.
///
/// Returns `true` when the timer was running and reached zero during this
/// call.
pub fn decay(timer_ms: &mut u32, dt_ms: u32) -> bool {
    if *timer_ms == 0 {
        return false;
    }
    *timer_ms = timer_ms.saturating_sub(dt_ms);
    *timer_ms == 0
}

/// Player gold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ledger {
    gold: u32,
}

impl Ledger {
    /// Creates a ledger holding `gold`.
    #[must_use]
    pub const fn new(gold: u32) -> Self {
        Self { gold }
    }

    /// Current balance.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    /// Checks that `cost` is affordable without spending it.
    pub fn ensure(&self, cost: u32) -> Result<(), Rejection> {
        if self.gold < cost {
            return Err(Rejection::InsufficientGold {
                required: cost,
                available: self.gold,
            });
        }
        Ok(())
    }

    /// Spends `cost`, leaving the balance untouched when it is unaffordable.
    pub fn try_spend(&mut self, cost: u32) -> Result<(), Rejection> {
        self.ensure(cost)?;
        self.gold -= cost;
        Ok(())
    }

    /// Adds `amount` and returns the new balance.
    pub fn credit(&mut self, amount: u32) -> u32 {
        self.gold = self.gold.saturating_add(amount);
        self.gold
    }
}

/// Remaining cooldown per spell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpellBook {
    cooldowns: BTreeMap<SpellKind, u32>,
}

impl SpellBook {
    /// Creates a spell book with every spell ready.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds until `spell` may be cast again.
    #[must_use]
    pub fn remaining(&self, spell: SpellKind) -> u32 {
        self.cooldowns.get(&spell).copied().unwrap_or(0)
    }

    /// Fails with [`Rejection::CooldownActive`] while `spell` is cooling down.
    pub fn ensure_ready(&self, spell: SpellKind) -> Result<(), Rejection> {
        match self.remaining(spell) {
            0 => Ok(()),
            remaining_ms => Err(Rejection::CooldownActive { remaining_ms }),
        }
    }

    /// Starts the cooldown of `spell`.
    pub fn start(&mut self, spell: SpellKind, cooldown_ms: u32) {
        let _ = self.cooldowns.insert(spell, cooldown_ms);
    }

    /// Decays every cooldown by `dt_ms`.
    pub fn decay(&mut self, dt_ms: u32) {
        for remaining in self.cooldowns.values_mut() {
            let _ = decay(remaining, dt_ms);
        }
    }

    /// Removes `amount_ms` from every cooldown.
    pub fn reduce_all(&mut self, amount_ms: u32) {
        self.decay(amount_ms);
    }

    /// Remaining cooldown of every spell, in display order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(SpellKind, u32)> {
        SpellKind::ALL
            .into_iter()
            .map(|spell| (spell, self.remaining(spell)))
            .collect()
    }
}

/// Progress of a currency particle over one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleStep {
    /// Still flying.
    InFlight,
    /// Reached the collection point; the value should be credited.
    Arrived(u32),
}

/// Moves a particle toward `collection_point` and reports arrival.
pub fn step_particle(
    particle: &mut CurrencyParticle,
    collection_point: Vec2,
    speed: f32,
    arrival_threshold: f32,
    dt_secs: f32,
) -> ParticleStep {
    particle.position = step_toward(particle.position, collection_point, speed * dt_secs);
    if particle.position.distance(collection_point) <= arrival_threshold {
        ParticleStep::Arrived(particle.value)
    } else {
        ParticleStep::InFlight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_reports_expiry_once() {
        let mut timer = 120;
        assert!(!decay(&mut timer, 50));
        assert!(!decay(&mut timer, 50));
        assert!(decay(&mut timer, 50));
        assert_eq!(timer, 0);
        assert!(!decay(&mut timer, 50));
    }

    #[test]
    fn unaffordable_spend_leaves_the_balance_untouched() {
        let mut ledger = Ledger::new(12);
        assert_eq!(
            ledger.try_spend(70),
            Err(Rejection::InsufficientGold {
                required: 70,
                available: 12
            })
        );
        assert_eq!(ledger.gold(), 12);
        assert_eq!(ledger.try_spend(12), Ok(()));
        assert_eq!(ledger.gold(), 0);
    }

    #[test]
    fn cooldowns_floor_at_zero() {
        let mut book = SpellBook::new();
        book.start(SpellKind::RainOfFire, 3_000);
        book.start(SpellKind::Reinforcements, 8_000);

        book.reduce_all(5_000);

        assert_eq!(book.remaining(SpellKind::RainOfFire), 0);
        assert_eq!(book.remaining(SpellKind::Reinforcements), 3_000);
        assert_eq!(
            book.ensure_ready(SpellKind::Reinforcements),
            Err(Rejection::CooldownActive {
                remaining_ms: 3_000
            })
        );
        assert_eq!(book.ensure_ready(SpellKind::RainOfFire), Ok(()));
    }
}
