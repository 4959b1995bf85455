#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave director state machine.
//!
//! The director walks `Idle → WaveInProgress → WaveComplete → … → Victory`,
//! dropping into `GameOver` whenever lives run out. It owns the spawn cursor
//! and the timestamp of the last spawn; the world supplies the clock, the
//! hostile count, and the remaining lives.

use lane_defence_core::{HostileKind, Rejection, RunStatus, WaveDefinition};

/// Accepted wave start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveStart {
    /// One-based wave number.
    pub wave: u32,
    /// Whether the early-call reward applies.
    pub rewarded: bool,
}

/// Action the world must carry out after advancing the director.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// Spawn a hostile of this kind at the lane entrance.
    Spawn(HostileKind),
    /// The countdown elapsed and the next wave started on its own.
    AutoStarted(u32),
}

/// Result of the end-of-tick evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Lives ran out.
    GameOver,
    /// The current wave was cleared and more remain.
    WaveCompleted(u32),
    /// The final wave was cleared.
    Victory(u32),
}

/// Spawn scheduling and run progression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveDirector {
    status: RunStatus,
    started: usize,
    cursor: usize,
    last_spawn_at: Option<u64>,
    countdown_ms: u32,
    countdown_reset_ms: u32,
}

impl WaveDirector {
    /// Creates an idle director whose between-wave countdown lasts
    /// `countdown_ms`.
    #[must_use]
    pub const fn new(countdown_ms: u32) -> Self {
        Self {
            status: RunStatus::Idle,
            started: 0,
            cursor: 0,
            last_spawn_at: None,
            countdown_ms: 0,
            countdown_reset_ms: countdown_ms,
        }
    }

    /// Current run status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// One-based number of the latest wave started, zero before the first.
    #[must_use]
    pub fn wave(&self) -> u32 {
        u32::try_from(self.started).unwrap_or(u32::MAX)
    }

    /// Milliseconds until the next wave starts on its own, zero when no
    /// countdown is running.
    #[must_use]
    pub const fn countdown_ms(&self) -> u32 {
        self.countdown_ms
    }

    /// Hostiles of the current wave that have not spawned yet.
    #[must_use]
    pub fn pending_spawns(&self, waves: &[WaveDefinition]) -> usize {
        if self.status != RunStatus::WaveInProgress {
            return 0;
        }
        self.current(waves)
            .map_or(0, |wave| wave.spawns.len().saturating_sub(self.cursor))
    }

    /// Starts the next wave.
    ///
    /// Accepted from `Idle` and `WaveComplete` while waves remain. The early
    /// reward only applies when calling a wave during the countdown.
    pub fn start_wave(
        &mut self,
        early: bool,
        waves: &[WaveDefinition],
    ) -> Result<WaveStart, Rejection> {
        match self.status {
            RunStatus::Victory | RunStatus::GameOver => return Err(Rejection::RunOver),
            RunStatus::WaveInProgress => return Err(Rejection::WaveUnavailable),
            RunStatus::Idle | RunStatus::WaveComplete => {}
        }
        if self.started >= waves.len() {
            return Err(Rejection::WaveUnavailable);
        }

        let rewarded = early && self.status == RunStatus::WaveComplete;
        self.begin_next();
        Ok(WaveStart {
            wave: self.wave(),
            rewarded,
        })
    }

    /// Advances spawn scheduling and the between-wave countdown.
    ///
    /// `now_ms` is the run time at the start of the tick. At most one cue is
    /// produced per tick.
    pub fn tick(&mut self, now_ms: u64, dt_ms: u32, waves: &[WaveDefinition]) -> Option<Cue> {
        match self.status {
            RunStatus::WaveInProgress => self.next_spawn(now_ms, waves),
            RunStatus::WaveComplete => {
                self.countdown_ms = self.countdown_ms.saturating_sub(dt_ms);
                if self.countdown_ms > 0 || self.started >= waves.len() {
                    return None;
                }
                self.begin_next();
                Some(Cue::AutoStarted(self.wave()))
            }
            RunStatus::Idle | RunStatus::Victory | RunStatus::GameOver => None,
        }
    }

    /// Evaluates terminal and completion conditions at the end of a tick.
    pub fn evaluate(
        &mut self,
        hostiles_alive: usize,
        lives: u32,
        waves: &[WaveDefinition],
    ) -> Option<Outcome> {
        if self.status.is_terminal() {
            return None;
        }
        if lives == 0 {
            self.status = RunStatus::GameOver;
            self.countdown_ms = 0;
            return Some(Outcome::GameOver);
        }
        if self.status != RunStatus::WaveInProgress
            || hostiles_alive > 0
            || self.pending_spawns(waves) > 0
        {
            return None;
        }

        let wave = self.wave();
        if self.started >= waves.len() {
            self.status = RunStatus::Victory;
            Some(Outcome::Victory(wave))
        } else {
            self.status = RunStatus::WaveComplete;
            self.countdown_ms = self.countdown_reset_ms;
            Some(Outcome::WaveCompleted(wave))
        }
    }

    /// Returns the director to its idle state.
    pub fn reset(&mut self) {
        *self = Self::new(self.countdown_reset_ms);
    }

    fn begin_next(&mut self) {
        self.started += 1;
        self.cursor = 0;
        self.last_spawn_at = None;
        self.countdown_ms = 0;
        self.status = RunStatus::WaveInProgress;
    }

    fn current<'w>(&self, waves: &'w [WaveDefinition]) -> Option<&'w WaveDefinition> {
        self.started.checked_sub(1).and_then(|index| waves.get(index))
    }

    fn next_spawn(&mut self, now_ms: u64, waves: &[WaveDefinition]) -> Option<Cue> {
        let wave = self.current(waves)?;
        let kind = *wave.spawns.get(self.cursor)?;
        let due = match self.last_spawn_at {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= u64::from(wave.interval_ms),
        };
        if !due {
            return None;
        }
        self.cursor += 1;
        self.last_spawn_at = Some(now_ms);
        Some(Cue::Spawn(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waves() -> Vec<WaveDefinition> {
        vec![
            WaveDefinition {
                interval_ms: 100,
                spawns: vec![HostileKind::Goblin],
            },
            WaveDefinition {
                interval_ms: 100,
                spawns: vec![HostileKind::Orc],
            },
        ]
    }

    #[test]
    fn idle_director_accepts_a_start_without_reward() {
        let waves = waves();
        let mut director = WaveDirector::new(1_000);

        let start = director.start_wave(true, &waves).expect("start");

        assert_eq!(
            start,
            WaveStart {
                wave: 1,
                rewarded: false
            }
        );
        assert_eq!(director.status(), RunStatus::WaveInProgress);
    }

    #[test]
    fn waves_in_progress_reject_another_start() {
        let waves = waves();
        let mut director = WaveDirector::new(1_000);
        let _ = director.start_wave(false, &waves).expect("start");

        assert_eq!(
            director.start_wave(false, &waves),
            Err(Rejection::WaveUnavailable)
        );
    }

    #[test]
    fn cleared_wave_counts_down_then_starts_the_next() {
        let waves = waves();
        let mut director = WaveDirector::new(100);
        let _ = director.start_wave(false, &waves).expect("start");
        assert_eq!(
            director.tick(0, 50, &waves),
            Some(Cue::Spawn(HostileKind::Goblin))
        );
        assert_eq!(
            director.evaluate(0, 20, &waves),
            Some(Outcome::WaveCompleted(1))
        );
        assert_eq!(director.countdown_ms(), 100);

        assert_eq!(director.tick(50, 50, &waves), None);
        assert_eq!(director.tick(100, 50, &waves), Some(Cue::AutoStarted(2)));
        assert_eq!(director.status(), RunStatus::WaveInProgress);
    }

    #[test]
    fn early_call_during_countdown_is_rewarded() {
        let waves = waves();
        let mut director = WaveDirector::new(5_000);
        let _ = director.start_wave(false, &waves).expect("start");
        let _ = director.tick(0, 50, &waves);
        let _ = director.evaluate(0, 20, &waves);

        let start = director.start_wave(true, &waves).expect("early start");

        assert!(start.rewarded);
        assert_eq!(director.countdown_ms(), 0);
    }

    #[test]
    fn losing_every_life_ends_the_run() {
        let waves = waves();
        let mut director = WaveDirector::new(5_000);
        let _ = director.start_wave(false, &waves).expect("start");

        assert_eq!(director.evaluate(3, 0, &waves), Some(Outcome::GameOver));
        assert_eq!(director.start_wave(false, &waves), Err(Rejection::RunOver));
        assert_eq!(director.tick(100, 50, &waves), None);

        director.reset();
        assert_eq!(director.status(), RunStatus::Idle);
        assert_eq!(director.wave(), 0);
    }
}
