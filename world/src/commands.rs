//! Handlers for player commands.
//!
//! Every handler validates all of its preconditions before mutating anything,
//! so a rejected command leaves the world exactly as it found it.

use glam::Vec2;
use lane_defence_core::{
    geometry::{closest_point_on_polyline, step_toward, within},
    AllyRef, EntityRef, Event, MeleeProfile, MeleeUnit, Reinforcement, Rejection, Soldier,
    SpellKind, SpotId, Tower, TowerId, TowerKind,
};
use lane_defence_system_combat::Hit;
use lane_defence_system_targeting::formation_slot;
use tracing::{debug, info};

use crate::World;

impl World {
    pub(crate) fn start_wave(&mut self, early: bool, out: &mut Vec<Event>) -> Result<(), Rejection> {
        let start = self.director.start_wave(early, &self.config.waves)?;
        if start.rewarded {
            let _ = self.run.ledger.credit(self.config.early_wave_bonus);
            self.run
                .spells
                .reduce_all(self.config.early_cooldown_reduction_ms);
        }
        info!(wave = start.wave, early = start.rewarded, "wave started");
        out.push(Event::WaveStarted {
            wave: start.wave,
            early: start.rewarded,
        });
        Ok(())
    }

    pub(crate) fn build_tower(
        &mut self,
        spot: SpotId,
        kind: TowerKind,
        out: &mut Vec<Event>,
    ) -> Result<(), Rejection> {
        let position = usize::try_from(spot.get())
            .ok()
            .and_then(|index| self.build_spots.get(index).copied())
            .ok_or(Rejection::UnknownSpot)?;
        if self.towers.values().any(|tower| tower.spot == spot) {
            return Err(Rejection::SpotOccupied);
        }
        let level = self
            .config
            .towers
            .profile(kind)
            .level(1)
            .ok_or(Rejection::MaxLevel)?;
        let (cost, range, soldier) = (level.cost, level.range, level.soldier);

        self.run.ledger.try_spend(cost)?;

        let rally_point = kind
            .trains_soldiers()
            .then(|| self.default_rally(position, range));
        let tower = self.towers.insert_with(|id| Tower {
            id,
            kind,
            level: 1,
            spot,
            position,
            cooldown_ms: 0,
            target: None,
            rally_point,
            attack_flash_ms: 0,
        });
        if let (Some(rally_point), Some(profile)) = (rally_point, soldier) {
            self.train_soldiers(tower, position, rally_point, profile);
        }

        debug!(tower = tower.get(), ?kind, spot = spot.get(), "tower built");
        out.push(Event::TowerBuilt { tower, kind, spot });
        Ok(())
    }

    pub(crate) fn upgrade_tower(
        &mut self,
        id: TowerId,
        out: &mut Vec<Event>,
    ) -> Result<(), Rejection> {
        let tower = self.towers.get(id).ok_or(Rejection::UnknownTower)?;
        let profile = self.config.towers.profile(tower.kind);
        if tower.level >= profile.max_level() {
            return Err(Rejection::MaxLevel);
        }
        let next = tower.level + 1;
        let level = profile.level(next).ok_or(Rejection::MaxLevel)?;
        let (cost, soldier) = (level.cost, level.soldier);

        self.run.ledger.try_spend(cost)?;

        if let Some(tower) = self.towers.get_mut(id) {
            tower.level = next;
        }
        if let Some(profile) = soldier {
            for soldier in self.soldiers.values_mut() {
                if soldier.barracks != id {
                    continue;
                }
                soldier.unit.profile = profile;
                if soldier.unit.is_active() {
                    soldier.unit.health = profile.max_health;
                }
            }
        }

        debug!(tower = id.get(), level = next, "tower upgraded");
        out.push(Event::TowerUpgraded {
            tower: id,
            level: next,
        });
        Ok(())
    }

    pub(crate) fn sell_tower(&mut self, id: TowerId, out: &mut Vec<Event>) -> Result<(), Rejection> {
        let tower = self.towers.remove(id).ok_or(Rejection::UnknownTower)?;
        let refund = self
            .config
            .towers
            .profile(tower.kind)
            .level(tower.level)
            .map_or(0, |level| level.sell_value);
        let _ = self.run.ledger.credit(refund);

        let dismissed = self.soldiers.drain_where(|soldier| soldier.barracks == id);
        for soldier in &dismissed {
            self.release(AllyRef::Soldier(soldier.id));
        }

        let selection_lost = match self.selection {
            Some(EntityRef::Tower(selected)) => selected == id,
            Some(EntityRef::Soldier(selected)) => {
                dismissed.iter().any(|soldier| soldier.id == selected)
            }
            _ => false,
        };
        if selection_lost {
            self.selection = None;
            out.push(Event::SelectionChanged { entity: None });
        }

        debug!(tower = id.get(), refund, "tower sold");
        out.push(Event::TowerSold { tower: id, refund });
        Ok(())
    }

    pub(crate) fn cast_spell(
        &mut self,
        spell: SpellKind,
        target: Vec2,
        out: &mut Vec<Event>,
    ) -> Result<(), Rejection> {
        let profile = self.config.spells.profile(spell).clone();
        self.run.spells.ensure_ready(spell)?;
        self.run.ledger.try_spend(profile.cost)?;
        self.run.spells.start(spell, profile.cooldown_ms);

        debug!(?spell, x = target.x, y = target.y, "spell cast");
        out.push(Event::SpellCast { spell, target });

        match spell {
            SpellKind::RainOfFire => {
                self.spawn_explosion(target, profile.radius);
                let hit = Hit::magic(profile.damage);
                let mut foes = self.foes();
                for victim in foes.within(target, profile.radius) {
                    let _ = foes.strike(victim, &hit, out);
                }
            }
            SpellKind::Reinforcements => {
                let summon = self.config.reinforcement.clone();
                let count = usize::try_from(summon.count).unwrap_or(0);
                let mut units = Vec::with_capacity(count);
                for index in 0..count {
                    let slot = formation_slot(target, profile.radius, index, count);
                    units.push(self.reinforcements.insert_with(|id| Reinforcement {
                        id,
                        unit: MeleeUnit::new(slot, slot, summon.unit),
                        lifetime_ms: summon.lifetime_ms,
                    }));
                }
                out.push(Event::ReinforcementsArrived { units });
            }
        }
        Ok(())
    }

    /// Moves a rally point. Barracks squads are held to the tower's range;
    /// the hero patrols wherever it is sent, with no range limit.
    pub(crate) fn set_rally_point(
        &mut self,
        unit: EntityRef,
        target: Vec2,
        out: &mut Vec<Event>,
    ) -> Result<(), Rejection> {
        match unit {
            // Unbounded: the hero has no tower to measure a rally range from.
            EntityRef::Hero => self.hero.unit.rally_point = target,
            EntityRef::Tower(id) => self.rally_barracks(id, target)?,
            EntityRef::Soldier(id) => {
                let barracks = self
                    .soldiers
                    .get(id)
                    .map(|soldier| soldier.barracks)
                    .ok_or(Rejection::UnknownEntity)?;
                self.rally_barracks(barracks, target)?;
            }
            EntityRef::Hostile(_) | EntityRef::Reinforcement(_) => {
                if !self.exists(unit) {
                    return Err(Rejection::UnknownEntity);
                }
                return Err(Rejection::NotRallyCapable);
            }
        }

        out.push(Event::RallyPointSet { unit, target });
        Ok(())
    }

    pub(crate) fn trigger_hero_ability(&mut self, out: &mut Vec<Event>) -> Result<(), Rejection> {
        let hero = &mut self.hero;
        if !hero.unit.is_active() {
            return Err(Rejection::HeroUnavailable);
        }
        if hero.ability_cooldown_ms > 0 {
            return Err(Rejection::CooldownActive {
                remaining_ms: hero.ability_cooldown_ms,
            });
        }

        let profile = &self.config.hero;
        hero.ability_active_ms = profile.ability_duration_ms;
        hero.ability_cooldown_ms = profile.ability_cooldown_ms;
        hero.armor_bonus = profile.ability_armor_bonus;

        let mut taunted = 0;
        for hostile in self.hostiles.values_mut() {
            if hostile.is_alive()
                && within(hero.unit.position, hostile.position, profile.ability_range)
            {
                hostile.taunted_by = Some(hero.id);
                taunted += 1;
            }
        }

        debug!(taunted, "hero ability activated");
        out.push(Event::HeroAbilityActivated { taunted });
        Ok(())
    }

    pub(crate) fn select(
        &mut self,
        entity: Option<EntityRef>,
        out: &mut Vec<Event>,
    ) -> Result<(), Rejection> {
        if let Some(entity) = entity {
            if !self.exists(entity) {
                return Err(Rejection::UnknownEntity);
            }
        }
        self.selection = entity;
        out.push(Event::SelectionChanged { entity });
        Ok(())
    }

    pub(crate) fn exists(&self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Tower(id) => self.towers.contains(id),
            EntityRef::Hostile(id) => self.hostiles.contains(id),
            EntityRef::Soldier(id) => self.soldiers.contains(id),
            EntityRef::Reinforcement(id) => self.reinforcements.contains(id),
            EntityRef::Hero => true,
        }
    }

    fn rally_barracks(&mut self, id: TowerId, target: Vec2) -> Result<(), Rejection> {
        let tower = self.towers.get_mut(id).ok_or(Rejection::UnknownTower)?;
        if !tower.kind.trains_soldiers() {
            return Err(Rejection::NotRallyCapable);
        }
        let range = self
            .config
            .towers
            .profile(tower.kind)
            .level(tower.level)
            .map_or(0.0, |level| level.range);
        if !within(tower.position, target, range) {
            return Err(Rejection::OutOfRange);
        }
        tower.rally_point = Some(target);
        self.assign_formation(id, target);
        Ok(())
    }

    /// Closest lane point to a new barracks, pulled inside its rally range.
    fn default_rally(&self, position: Vec2, range: f32) -> Vec2 {
        let closest = closest_point_on_polyline(&self.waypoints, position);
        if within(position, closest, range) {
            closest
        } else {
            step_toward(position, closest, range)
        }
    }

    fn train_soldiers(&mut self, barracks: TowerId, origin: Vec2, rally: Vec2, profile: MeleeProfile) {
        let count = self.config.towers.profile(TowerKind::Barracks).soldiers;
        for _ in 0..count {
            let _ = self.soldiers.insert_with(|id| Soldier {
                id,
                barracks,
                unit: MeleeUnit::new(origin, rally, profile),
            });
        }
        self.assign_formation(barracks, rally);
    }

    fn assign_formation(&mut self, barracks: TowerId, rally: Vec2) {
        let radius = self.config.formation_radius;
        let count = self
            .soldiers
            .values()
            .filter(|soldier| soldier.barracks == barracks)
            .count();
        let squad = self
            .soldiers
            .values_mut()
            .filter(|soldier| soldier.barracks == barracks);
        for (index, soldier) in squad.enumerate() {
            soldier.unit.rally_point = formation_slot(rally, radius, index, count);
        }
    }
}
