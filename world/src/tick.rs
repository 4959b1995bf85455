//! Fixed simulation step.

use glam::Vec2;
use lane_defence_core::{
    geometry::step_toward, Aim, AllyRef, CurrencyParticle, Event, Explosion, GameConfig, Hostile,
    HostileId, MeleeUnit, ParticleId, Projectile,
};
use lane_defence_system_blocking::{decide, Blocker, Intent};
use lane_defence_system_combat::{
    advance_projectile, launch, splash_victims, strike_hostile, strike_unit, DamageOutcome,
    Flight, Hit,
};
use lane_defence_system_economy::{decay, step_particle, ParticleStep};
use lane_defence_system_navigation::{PathNavigator, PathStep};
use lane_defence_system_targeting::{
    plan_engagement, retain_or_acquire, Candidate, Engagement, Seeker,
};
use lane_defence_system_waves::{Cue, Outcome};
use tracing::{debug, info};

use crate::{registry::Registry, World};

/// Hostile collection borrowed by anything that deals damage.
pub(crate) struct Foes<'w> {
    hostiles: &'w mut Registry<HostileId, Hostile>,
    particles: &'w mut Registry<ParticleId, CurrencyParticle>,
    config: &'w GameConfig,
}

impl Foes<'_> {
    /// Damages a hostile, removing it and dropping its bounty when it falls.
    pub(crate) fn strike(
        &mut self,
        id: HostileId,
        hit: &Hit,
        out: &mut Vec<Event>,
    ) -> DamageOutcome {
        let Some(hostile) = self.hostiles.get_mut(id) else {
            return DamageOutcome::Ignored;
        };
        let outcome = strike_hostile(hostile, hit, self.config.magic_bonus);
        if outcome == DamageOutcome::Killed {
            self.slay(id, out);
        }
        outcome
    }

    /// Living hostiles within `radius` of `center`.
    pub(crate) fn within(&self, center: Vec2, radius: f32) -> Vec<HostileId> {
        splash_victims(
            center,
            radius,
            self.hostiles
                .values()
                .filter(|hostile| hostile.is_alive())
                .map(|hostile| (hostile.id, hostile.position)),
        )
    }

    fn slay(&mut self, id: HostileId, out: &mut Vec<Event>) {
        let Some(hostile) = self.hostiles.remove(id) else {
            return;
        };
        let position = hostile.position;
        let value = hostile.bounty;
        let cell = self.config.projection.unproject(position);
        let _ = self.particles.insert_with(|particle| CurrencyParticle {
            id: particle,
            source: position,
            position,
            value,
        });
        debug!(
            hostile = id.get(),
            kind = ?hostile.kind,
            bounty = value,
            x = cell.x,
            y = cell.y,
            "hostile killed"
        );
        out.push(Event::HostileKilled {
            hostile: id,
            position,
            bounty: value,
        });
    }
}

/// Runs one melee unit's targeting, movement, and strike for a step.
fn engage(
    unit: &mut MeleeUnit,
    seeker: Seeker,
    foes: &mut Foes<'_>,
    dt_ms: u32,
    out: &mut Vec<Event>,
) {
    let _ = decay(&mut unit.attack_cooldown_ms, dt_ms);
    let _ = decay(&mut unit.attack_flash_ms, dt_ms);

    unit.target = retain_or_acquire(
        &seeker,
        unit.target,
        foes.hostiles.values().map(Candidate::from),
    );
    let target_position = unit
        .target
        .and_then(|id| foes.hostiles.get(id))
        .map(|hostile| hostile.position);

    match plan_engagement(unit, target_position, foes.config.rally_deadband) {
        Engagement::Attack => {
            let Some(target) = unit.target else {
                return;
            };
            if unit.attack_cooldown_ms > 0 {
                return;
            }
            unit.attack_cooldown_ms = unit.profile.attack_interval_ms;
            unit.attack_flash_ms = foes.config.attack_flash_ms;
            let hit = Hit {
                damage: unit.profile.damage,
                damage_type: unit.profile.damage_type,
                slow: None,
            };
            if foes.strike(target, &hit, out) == DamageOutcome::Killed {
                unit.target = None;
            }
        }
        Engagement::Advance(destination) | Engagement::Return(destination) => {
            let travel = unit.profile.speed * seconds(dt_ms);
            unit.position = step_toward(unit.position, destination, travel);
        }
        Engagement::Hold => {}
    }
}

fn seconds(dt_ms: u32) -> f32 {
    dt_ms as f32 / 1_000.0
}

impl World {
    pub(crate) fn foes(&mut self) -> Foes<'_> {
        Foes {
            hostiles: &mut self.hostiles,
            particles: &mut self.particles,
            config: &self.config,
        }
    }

    /// Advances the simulation by exactly one fixed step.
    pub(crate) fn step(&mut self, out: &mut Vec<Event>) {
        let dt = self.clock.step();
        let dt_ms = u32::try_from(dt.as_millis()).unwrap_or(u32::MAX);
        let now = self.run.elapsed_ms;
        out.push(Event::TimeAdvanced { dt });

        self.spawn_phase(now, dt_ms, out);
        self.hero_phase(dt_ms, out);
        self.tower_phase(dt_ms, out);
        self.soldier_phase(dt_ms, out);
        self.reinforcement_phase(dt_ms, out);
        self.projectile_phase(dt_ms, out);
        self.hostile_phase(dt_ms, out);
        self.economy_phase(dt_ms, out);

        self.run.elapsed_ms = now.saturating_add(u64::from(dt_ms));
        self.tick_index = self.tick_index.saturating_add(1);

        self.evaluate(out);
    }

    fn spawn_phase(&mut self, now: u64, dt_ms: u32, out: &mut Vec<Event>) {
        match self.director.tick(now, dt_ms, &self.config.waves) {
            Some(Cue::Spawn(kind)) => {
                let Some(entrance) = PathNavigator::new(&self.waypoints).entrance() else {
                    return;
                };
                let profile = self.config.hostiles.profile(kind);
                let id = self
                    .hostiles
                    .insert_with(|id| Hostile::spawn(id, kind, profile, entrance));
                debug!(hostile = id.get(), ?kind, "hostile spawned");
                out.push(Event::HostileSpawned { hostile: id, kind });
            }
            Some(Cue::AutoStarted(wave)) => {
                info!(wave, "wave started after countdown");
                out.push(Event::WaveStarted { wave, early: false });
            }
            None => {}
        }
    }

    fn hero_phase(&mut self, dt_ms: u32, out: &mut Vec<Event>) {
        let hero = &mut self.hero;
        if !hero.unit.is_active() {
            let _ = decay(&mut hero.unit.respawn_timer_ms, dt_ms);
            if hero.unit.respawn_timer_ms == 0 {
                hero.unit.revive_at(hero.start_position);
                debug!("hero respawned");
                out.push(Event::HeroRespawned);
            }
            return;
        }

        if hero.ability_active() && decay(&mut hero.ability_active_ms, dt_ms) {
            hero.armor_bonus = 0.0;
            for hostile in self.hostiles.values_mut() {
                if hostile.taunted_by == Some(hero.id) {
                    hostile.taunted_by = None;
                }
            }
            out.push(Event::HeroAbilityExpired);
        }

        let seeker = Seeker {
            position: hero.unit.position,
            anchor: hero.unit.rally_point,
            range: hero.unit.profile.engage_range,
        };
        let mut foes = Foes {
            hostiles: &mut self.hostiles,
            particles: &mut self.particles,
            config: &self.config,
        };
        engage(&mut hero.unit, seeker, &mut foes, dt_ms, out);
    }

    fn tower_phase(&mut self, dt_ms: u32, out: &mut Vec<Event>) {
        let Self {
            towers,
            hostiles,
            projectiles,
            config,
            ..
        } = self;

        for tower in towers.values_mut() {
            let _ = decay(&mut tower.cooldown_ms, dt_ms);
            let _ = decay(&mut tower.attack_flash_ms, dt_ms);

            let Some(kind) = tower.kind.projectile() else {
                continue;
            };
            let profile = config.towers.profile(tower.kind);
            let Some(level) = profile.level(tower.level) else {
                continue;
            };

            tower.target = retain_or_acquire(
                &Seeker::at(tower.position, level.range),
                tower.target,
                hostiles.values().map(Candidate::from),
            );
            if tower.cooldown_ms > 0 {
                continue;
            }
            let Some(target) = tower.target.and_then(|id| hostiles.get(id)) else {
                continue;
            };

            let projectile = projectiles
                .insert_with(|id| launch(id, kind, tower, profile, level, target));
            tower.cooldown_ms = level.fire_interval_ms;
            tower.attack_flash_ms = config.attack_flash_ms;
            out.push(Event::ProjectileFired {
                projectile,
                tower: tower.id,
            });
        }
    }

    fn soldier_phase(&mut self, dt_ms: u32, out: &mut Vec<Event>) {
        let Self {
            soldiers,
            hostiles,
            particles,
            config,
            ..
        } = self;
        let mut foes = Foes {
            hostiles,
            particles,
            config,
        };

        for soldier in soldiers.values_mut() {
            let unit = &mut soldier.unit;
            if !unit.is_active() {
                let _ = decay(&mut unit.respawn_timer_ms, dt_ms);
                if unit.respawn_timer_ms == 0 {
                    let rally_point = unit.rally_point;
                    unit.revive_at(rally_point);
                    out.push(Event::SoldierRespawned {
                        soldier: soldier.id,
                    });
                }
                continue;
            }
            let seeker = Seeker::at(unit.position, unit.profile.engage_range);
            engage(unit, seeker, &mut foes, dt_ms, out);
        }
    }

    fn reinforcement_phase(&mut self, dt_ms: u32, out: &mut Vec<Event>) {
        for unit in self.reinforcements.values_mut() {
            let _ = decay(&mut unit.lifetime_ms, dt_ms);
        }
        for expired in self.reinforcements.drain_where(|unit| unit.lifetime_ms == 0) {
            self.release(AllyRef::Reinforcement(expired.id));
            out.push(Event::ReinforcementDismissed {
                unit: expired.id,
                defeated: false,
            });
        }

        let Self {
            reinforcements,
            hostiles,
            particles,
            config,
            ..
        } = self;
        let mut foes = Foes {
            hostiles,
            particles,
            config,
        };
        for reinforcement in reinforcements.values_mut() {
            let unit = &mut reinforcement.unit;
            let seeker = Seeker::at(unit.position, unit.profile.engage_range);
            engage(unit, seeker, &mut foes, dt_ms, out);
        }
    }

    fn projectile_phase(&mut self, dt_ms: u32, out: &mut Vec<Event>) {
        for id in self.projectiles.ids() {
            let Some(projectile) = self.projectiles.get_mut(id) else {
                continue;
            };
            let aim_point = match projectile.aim {
                Aim::Fixed(point) => Some(point),
                Aim::Tracking(target) => self
                    .hostiles
                    .get(target)
                    .map(|hostile| hostile.position)
                    .or_else(|| projectile.splash_radius.map(|_| projectile.position)),
            };
            let Some(aim_point) = aim_point else {
                let _ = self.projectiles.remove(id);
                out.push(Event::ProjectileFizzled { projectile: id });
                continue;
            };

            let flight = advance_projectile(projectile, aim_point, seconds(dt_ms));
            let Flight::Arrived(point) = flight else {
                continue;
            };
            if let Some(projectile) = self.projectiles.remove(id) {
                let hits = self.impact(&projectile, point, out);
                out.push(Event::ProjectileImpacted {
                    projectile: id,
                    hits,
                });
            }
        }
    }

    fn impact(&mut self, projectile: &Projectile, point: Vec2, out: &mut Vec<Event>) -> u32 {
        let hit = Hit::from(projectile);
        let victims = match (projectile.splash_radius, projectile.aim) {
            (Some(radius), _) => {
                self.spawn_explosion(point, radius);
                self.foes().within(point, radius)
            }
            (None, Aim::Tracking(target)) if self.hostiles.contains(target) => vec![target],
            (None, _) => Vec::new(),
        };

        let mut foes = self.foes();
        for &victim in &victims {
            let _ = foes.strike(victim, &hit, out);
        }
        u32::try_from(victims.len()).unwrap_or(u32::MAX)
    }

    pub(crate) fn spawn_explosion(&mut self, position: Vec2, radius: f32) {
        let lifetime_ms = self.config.explosion_lifetime_ms;
        let _ = self.explosions.insert_with(|id| Explosion {
            id,
            position,
            radius,
            lifetime_ms,
        });
    }

    fn hostile_phase(&mut self, dt_ms: u32, out: &mut Vec<Event>) {
        let dt_secs = seconds(dt_ms);
        let flash_ms = self.config.attack_flash_ms;

        for id in self.hostiles.ids() {
            let Some(hostile) = self.hostiles.get_mut(id) else {
                continue;
            };
            if decay(&mut hostile.slow_timer_ms, dt_ms) {
                hostile.slow_factor = 1.0;
            }
            let _ = decay(&mut hostile.attack_cooldown_ms, dt_ms);
            let _ = decay(&mut hostile.attack_flash_ms, dt_ms);

            let hero = self.hero.unit.is_active().then(|| Blocker {
                ally: AllyRef::Hero,
                position: self.hero.unit.position,
                radius: self.hero.unit.profile.block_radius,
            });
            let taunter = hostile.taunted_by.and(hero);
            let soldiers = self
                .soldiers
                .values()
                .filter(|soldier| soldier.unit.is_active())
                .map(|soldier| Blocker {
                    ally: AllyRef::Soldier(soldier.id),
                    position: soldier.unit.position,
                    radius: soldier.unit.profile.block_radius,
                });
            let reinforcements = self
                .reinforcements
                .values()
                .filter(|unit| unit.unit.is_active())
                .map(|unit| Blocker {
                    ally: AllyRef::Reinforcement(unit.id),
                    position: unit.unit.position,
                    radius: unit.unit.profile.block_radius,
                });
            let blockers = soldiers.chain(reinforcements).chain(hero);

            let mut strike = None;
            let mut leaked = false;
            match decide(hostile.position, taunter, blockers) {
                Intent::Blocked(ally) => {
                    hostile.blocked_by = Some(ally);
                    if hostile.attack_cooldown_ms == 0 {
                        hostile.attack_cooldown_ms = hostile.attack_interval_ms;
                        hostile.attack_flash_ms = flash_ms;
                        strike = Some((ally, Hit::physical(hostile.damage)));
                    }
                }
                Intent::Approach(destination) => {
                    hostile.blocked_by = None;
                    let travel = hostile.effective_speed() * dt_secs;
                    hostile.position = step_toward(hostile.position, destination, travel);
                }
                Intent::FollowPath => {
                    hostile.blocked_by = None;
                    let travel = hostile.effective_speed() * dt_secs;
                    match PathNavigator::new(&self.waypoints).advance(
                        hostile.position,
                        hostile.path_index,
                        travel,
                    ) {
                        PathStep::Moved {
                            position,
                            path_index,
                        } => {
                            hostile.position = position;
                            hostile.path_index = path_index;
                        }
                        PathStep::Leaked { position } => {
                            hostile.position = position;
                            leaked = true;
                        }
                    }
                }
            }

            if let Some((ally, hit)) = strike {
                self.strike_ally(ally, &hit, out);
            }
            if leaked {
                let _ = self.hostiles.remove(id);
                self.run.lives = self.run.lives.saturating_sub(1);
                debug!(hostile = id.get(), lives = self.run.lives, "hostile leaked");
                out.push(Event::HostileLeaked {
                    hostile: id,
                    lives: self.run.lives,
                });
            }
        }
    }

    fn strike_ally(&mut self, ally: AllyRef, hit: &Hit, out: &mut Vec<Event>) {
        let magic_bonus = self.config.magic_bonus;
        let fallen = match ally {
            AllyRef::Soldier(id) => {
                let respawn_ms = self.config.towers.barracks.soldier_respawn_ms;
                let Some(soldier) = self.soldiers.get_mut(id) else {
                    return;
                };
                let armor = soldier.unit.profile.armor;
                let outcome = strike_unit(&mut soldier.unit, armor, hit, magic_bonus);
                if outcome == DamageOutcome::Killed {
                    soldier.unit.respawn_timer_ms = respawn_ms;
                    soldier.unit.target = None;
                    out.push(Event::SoldierFell { soldier: id });
                }
                outcome
            }
            AllyRef::Reinforcement(id) => {
                let Some(unit) = self.reinforcements.get_mut(id) else {
                    return;
                };
                let armor = unit.unit.profile.armor;
                let outcome = strike_unit(&mut unit.unit, armor, hit, magic_bonus);
                if outcome == DamageOutcome::Killed {
                    let _ = self.reinforcements.remove(id);
                    out.push(Event::ReinforcementDismissed {
                        unit: id,
                        defeated: true,
                    });
                }
                outcome
            }
            AllyRef::Hero => {
                let mut armor = self.hero.armor();
                armor.value = armor.value.min(self.config.hero.armor_cap);
                let outcome = strike_unit(&mut self.hero.unit, armor, hit, magic_bonus);
                if outcome == DamageOutcome::Killed {
                    self.fell_hero(out);
                }
                outcome
            }
        };

        if fallen == DamageOutcome::Killed {
            self.release(ally);
        }
    }

    fn fell_hero(&mut self, out: &mut Vec<Event>) {
        let hero = &mut self.hero;
        hero.unit.respawn_timer_ms = self.config.hero.respawn_ms;
        hero.unit.target = None;
        hero.ability_active_ms = 0;
        hero.armor_bonus = 0.0;
        for hostile in self.hostiles.values_mut() {
            hostile.taunted_by = None;
        }
        debug!("hero fell");
        out.push(Event::HeroFell);
    }

    /// Frees every hostile held by `ally`.
    pub(crate) fn release(&mut self, ally: AllyRef) {
        for hostile in self.hostiles.values_mut() {
            if hostile.blocked_by == Some(ally) {
                hostile.blocked_by = None;
            }
        }
    }

    fn economy_phase(&mut self, dt_ms: u32, out: &mut Vec<Event>) {
        self.run.spells.decay(dt_ms);
        let _ = decay(&mut self.hero.ability_cooldown_ms, dt_ms);

        let dt_secs = seconds(dt_ms);
        for id in self.particles.ids() {
            let Some(particle) = self.particles.get_mut(id) else {
                continue;
            };
            let step = step_particle(
                particle,
                self.config.collection_point,
                self.config.particle_speed,
                self.config.particle_arrival_threshold,
                dt_secs,
            );
            if let ParticleStep::Arrived(amount) = step {
                let _ = self.particles.remove(id);
                let balance = self.run.ledger.credit(amount);
                out.push(Event::GoldCollected { amount, balance });
            }
        }

        for explosion in self.explosions.values_mut() {
            let _ = decay(&mut explosion.lifetime_ms, dt_ms);
        }
        let _ = self.explosions.drain_where(|explosion| explosion.lifetime_ms == 0);
    }

    fn evaluate(&mut self, out: &mut Vec<Event>) {
        let outcome = self
            .director
            .evaluate(self.hostiles.len(), self.run.lives, &self.config.waves);
        match outcome {
            Some(Outcome::GameOver) => {
                info!(wave = self.director.wave(), "game over");
                out.push(Event::GameOver);
            }
            Some(Outcome::WaveCompleted(wave)) => {
                info!(wave, "wave completed");
                out.push(Event::WaveCompleted { wave });
            }
            Some(Outcome::Victory(wave)) => {
                info!(wave, "victory");
                out.push(Event::WaveCompleted { wave });
                out.push(Event::Victory);
            }
            None => {}
        }
    }
}
