//! Per-tick ordering and the single place zombies and plants are removed.
//!
//! A tick runs plant think, zombie think, combat, the plant and zombie sweeps,
//! the spawn scheduler and finally the decorative clocks, in that order.
//! Kill credit and loot are charged only by [`World::retire_zombie`].

use lane_defence_core::{
    CartState, CellCoord, ChewCue, Event, FireIntent, KillCause, LevelOutcome, PlantKind,
    PlantRemoval, ProjectileKind, Zombie, ZombieBlueprint, ZombieId, CUCUMBER_HEAL_AMOUNT,
    CUCUMBER_SPRAY_TICKS, LOSS_MARGIN, SUNFLOWER_SUN,
};
use lane_defence_system_combat::CombatScene;
use lane_defence_system_portals::{targeting::nearest_ahead, PortalField};
use lane_defence_system_spatial_index::SpatialIndex;
use lane_defence_system_spawning::{SpawnContext, SpawnDirective};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::{economy::roll_loot, World};

/// Largest fraction of a shot delay a shooter is pulled back by when it
/// acquires a fresh target.
const ACQUISITION_JITTER: f32 = 0.15;

impl World {
    pub(crate) fn tick(&mut self, out: &mut Vec<Event>) {
        if !self.is_running() {
            return;
        }
        self.tick_index = self.tick_index.saturating_add(1);
        out.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        if let Some(field) = self.portals.as_mut() {
            field.initialize(&mut self.rng, out);
        }

        self.index.rebuild(&self.zombies);
        for zombie in &mut self.zombies {
            zombie.set_status(self.status.flags(zombie.id()));
        }

        let intents = self.plants_think(out);
        self.zombies_think(out);
        if !self.is_running() {
            return;
        }

        self.index.rebuild(&self.zombies);
        self.resolve_combat(&intents, out);
        self.sweep_plants(out);
        self.resolve_status(out);
        self.sweep_zombies(out);
        self.run_scheduler(out);
        self.advance_clocks(out);
        self.check_completion(out);
    }

    fn plants_think(&mut self, out: &mut Vec<Event>) -> Vec<FireIntent> {
        let mut intents = Vec::new();
        for plant in &mut self.plants {
            if plant.detonation().is_some() {
                continue;
            }
            match plant.kind() {
                PlantKind::Sunflower => {
                    if plant.tick_production() {
                        let amount = self.economy.earn(SUNFLOWER_SUN);
                        out.push(Event::SunProduced {
                            plant: plant.id(),
                            amount,
                        });
                    }
                }
                PlantKind::WallNut => {}
                PlantKind::CherryBomb | PlantKind::Cucumber => {
                    if plant.tick_fuse() {
                        debug!(
                            plant = plant.id().get(),
                            kind = plant.kind().as_str(),
                            "fuse burnt out"
                        );
                    }
                }
                PlantKind::PeaShooter
                | PlantKind::IceCactus
                | PlantKind::MelonPult
                | PlantKind::LightningFlower
                | PlantKind::Cattail
                | PlantKind::Dandelion => {
                    plant.charge_up();
                    let origin = plant.cell();
                    let target = select_target(
                        plant.kind(),
                        origin,
                        &self.zombies,
                        &self.index,
                        self.portals.as_ref(),
                    );
                    let has_target = match plant.kind() {
                        PlantKind::Dandelion => self.zombies.iter().any(Zombie::is_targetable),
                        _ => target.is_some(),
                    };
                    if plant.note_target(has_target) {
                        plant.stagger(self.rng.gen_range(0.0..ACQUISITION_JITTER));
                    }
                    if !has_target || !plant.is_charged() {
                        continue;
                    }
                    plant.discharge();

                    let target_zombie = target.and_then(|position| self.zombies.get(position));
                    let fallback = target_zombie.map_or(origin.column_f32(), Zombie::col);
                    let landing_column = match (plant.kind(), self.portals.as_ref()) {
                        (PlantKind::MelonPult, Some(field)) => {
                            field.landing_column(origin, target_zombie, fallback)
                        }
                        _ => fallback,
                    };
                    intents.push(FireIntent {
                        plant: plant.id(),
                        kind: plant.kind(),
                        origin,
                        target: target_zombie.map(Zombie::id),
                        landing_column,
                        penetrating: plant.kind() == PlantKind::PeaShooter
                            && roll_penetration(
                                self.config.bullet_penetration,
                                self.config.random_penetration_chance,
                                &mut self.rng,
                            ),
                    });
                }
            }
        }
        intents
    }

    fn zombies_think(&mut self, out: &mut Vec<Event>) {
        for position in 0..self.zombies.len() {
            let zombie = &mut self.zombies[position];
            if zombie.is_dying() || self.status.is_stunned(zombie.id()) {
                continue;
            }

            let contact = self.plants.iter_mut().find(|plant| {
                plant.is_edible()
                    && plant.cell().row() == zombie.row()
                    && (zombie.col() - (plant.cell().column_f32() + 0.5)).abs() < 0.5
            });
            match contact {
                Some(plant) => {
                    let (damage, cue) = zombie.chew();
                    plant.take_damage(damage);
                    match cue {
                        ChewCue::Silent => {}
                        ChewCue::Bite => out.push(Event::PlantBitten {
                            zombie: zombie.id(),
                            plant: plant.id(),
                        }),
                        ChewCue::Smash => out.push(Event::PlantSmashed {
                            zombie: zombie.id(),
                            plant: plant.id(),
                        }),
                    }
                }
                None => {
                    if zombie.is_attacking() {
                        zombie.disengage();
                    }
                    zombie.step_forward();
                }
            }

            if let Some(field) = self.portals.as_ref() {
                cross_portal(field, zombie, &mut self.rng, out);
            }

            if zombie.col() + LOSS_MARGIN < 0.0 {
                let row = zombie.row();
                let front = zombie.col();
                if !self.intercept(row, front, out) {
                    self.outcome = LevelOutcome::Failed { row };
                    info!(row, tick = self.tick_index, "zombie reached the house");
                    out.push(Event::LevelFailed { row });
                    return;
                }
            }
        }
    }

    /// Dispatches or relies on the row's cart. Returns `false` when nothing
    /// can stop a zombie whose front edge is at `front`.
    fn intercept(&mut self, row: u32, front: f32, out: &mut Vec<Event>) -> bool {
        let Some(cart) = self.carts.iter_mut().find(|cart| cart.row() == row) else {
            return false;
        };
        if cart.trigger() {
            info!(row, "cart triggered");
            out.push(Event::CartTriggered { row });
            return true;
        }
        cart.state() == CartState::Rolling && cart.col() <= front
    }

    fn resolve_combat(&mut self, intents: &[FireIntent], out: &mut Vec<Event>) {
        let mut scene = CombatScene {
            zombies: &mut self.zombies,
            index: &self.index,
            status: &mut self.status,
            portals: self.portals.as_ref(),
            field: self.config.field,
        };
        for intent in intents {
            self.combat
                .fire(intent, &mut self.projectiles, &mut scene, &mut self.rng, out);
        }
        self.combat
            .resolve(&mut self.projectiles, &mut scene, &mut self.rng, out);
        self.combat.roll_carts(&mut self.carts, &mut scene, out);
    }

    fn sweep_plants(&mut self, out: &mut Vec<Event>) {
        let mut removed = Vec::new();
        let mut sprayed = false;
        for (position, plant) in self.plants.iter_mut().enumerate() {
            if plant.claim_detonation_damage() {
                let mut scene = CombatScene {
                    zombies: &mut self.zombies,
                    index: &self.index,
                    status: &mut self.status,
                    portals: self.portals.as_ref(),
                    field: self.config.field,
                };
                match plant.kind() {
                    PlantKind::CherryBomb => {
                        let _ = self
                            .combat
                            .detonate_area(plant.id(), plant.cell(), &mut scene, out);
                    }
                    PlantKind::Cucumber => {
                        let _ = self.combat.detonate_full_field(
                            plant.id(),
                            &mut scene,
                            &mut self.rng,
                            out,
                        );
                        sprayed = true;
                    }
                    _ => {}
                }
            }

            if plant.advance_detonation() {
                removed.push((position, PlantRemoval::Detonated));
            } else if plant.is_destroyed() {
                removed.push((position, PlantRemoval::Eaten));
            }
        }

        if sprayed {
            for plant in self.plants.iter().filter(|plant| plant.detonation().is_none()) {
                self.healing.start(plant.id(), CUCUMBER_SPRAY_TICKS);
            }
        }

        for &(position, cause) in removed.iter().rev() {
            let plant = self.plants.remove(position);
            self.healing.remove(plant.id());
            debug!(plant = plant.id().get(), ?cause, "plant removed");
            out.push(Event::PlantRemoved {
                plant: plant.id(),
                cell: plant.cell(),
                cause,
            });
        }
    }

    fn resolve_status(&mut self, out: &mut Vec<Event>) {
        let mut doomed = Vec::new();
        self.status.tick(&mut doomed);
        for zombie in doomed {
            let Some(position) = self.position_of(zombie) else {
                continue;
            };
            if !self.zombies[position].is_targetable() {
                continue;
            }
            debug!(zombie = zombie.get(), "spray finished a marked zombie");
            self.retire_zombie(position, KillCause::Spray, out);
        }

        let mut pulses = Vec::new();
        self.healing.tick(&mut pulses);
        for id in pulses {
            if let Some(plant) = self.plants.iter_mut().find(|plant| plant.id() == id) {
                plant.heal(CUCUMBER_HEAL_AMOUNT);
            }
        }
    }

    fn sweep_zombies(&mut self, out: &mut Vec<Event>) {
        let mut position = 0;
        while position < self.zombies.len() {
            let zombie = &mut self.zombies[position];
            if zombie.is_dying() {
                if zombie.advance_dying() {
                    self.retire_zombie(position, KillCause::Defeated, out);
                    continue;
                }
            } else if zombie.begin_dying() {
                let id = zombie.id();
                self.status.remove(id);
                out.push(Event::ZombieDying { zombie: id });
            }
            position += 1;
        }
    }

    /// Removes the zombie at `position`, credits the kill and drops its loot.
    pub(crate) fn retire_zombie(
        &mut self,
        position: usize,
        cause: KillCause,
        out: &mut Vec<Event>,
    ) {
        let zombie = self.zombies.remove(position);
        let id = zombie.id();
        self.status.remove(id);
        self.total_kills += 1;

        let wave_mode = self.scheduler.is_wave_mode();
        if wave_mode {
            if let Some(wave) = self.progress.zombie_defeated() {
                info!(wave, "wave cleared");
                out.push(Event::WaveCleared { wave });
            }
        } else {
            self.pre_wave_kills += 1;
        }
        out.push(Event::ZombieKilled { zombie: id, cause });

        let loot = roll_loot(&self.config, cause, wave_mode, &mut self.rng);
        let sun = self.economy.earn(loot.sun);
        self.economy.collect_coins(loot.coins);
        if sun > 0 || loot.coins > 0 {
            out.push(Event::LootDropped {
                zombie: id,
                sun,
                coins: loot.coins,
            });
        }
    }

    fn run_scheduler(&mut self, out: &mut Vec<Event>) {
        let context = SpawnContext {
            pre_wave_kills: self.pre_wave_kills,
            population: self.zombies.len() as u32,
            wave_in_flight: self.progress.in_flight(),
        };
        let mut directives = Vec::new();
        self.scheduler.tick(context, &mut self.rng, &mut directives);

        for directive in directives {
            match directive {
                SpawnDirective::EnterWaveMode => out.push(Event::WaveModeEntered),
                SpawnDirective::Wave {
                    wave,
                    zombies,
                    first,
                } => {
                    out.push(Event::WaveIssued {
                        wave,
                        zombies,
                        first,
                    });
                    if self.progress.begin_wave(wave, zombies) {
                        out.push(Event::WaveCleared { wave });
                    }
                }
                SpawnDirective::Zombie(order) => {
                    let col = self.config.field.entry_column() + order.column_offset;
                    let _ = self.spawn_zombie(order.blueprint, order.row, col, out);
                }
            }
        }
    }

    pub(crate) fn spawn_zombie(
        &mut self,
        blueprint: ZombieBlueprint,
        row: u32,
        col: f32,
        out: &mut Vec<Event>,
    ) -> ZombieId {
        let id = ZombieId::new(self.next_zombie);
        self.next_zombie = self.next_zombie.saturating_add(1);
        self.zombies
            .push(Zombie::spawn(id, blueprint, row, col, self.tuning));
        out.push(Event::ZombieSpawned {
            zombie: id,
            blueprint,
            row,
        });
        id
    }

    fn advance_clocks(&mut self, out: &mut Vec<Event>) {
        if let Some(field) = self.portals.as_mut() {
            field.update(&mut self.rng, out);
        }
        self.economy.tick();

        if self.config.ambient_sun_chance > 0.0
            && self.rng.gen::<f32>() < self.config.ambient_sun_chance
        {
            let amount = self.economy.earn(self.config.ambient_sun_amount);
            if amount > 0 {
                out.push(Event::AmbientSun { amount });
            }
        }
    }

    fn check_completion(&mut self, out: &mut Vec<Event>) {
        if self.scheduler.is_wave_mode()
            && self.scheduler.all_waves_issued()
            && !self.progress.in_flight()
            && self.zombies.is_empty()
        {
            self.outcome = LevelOutcome::Completed;
            info!(
                tick = self.tick_index,
                kills = self.total_kills,
                "level completed"
            );
            out.push(Event::LevelCompleted);
        }
    }

    pub(crate) fn position_of(&self, zombie: ZombieId) -> Option<usize> {
        self.zombies.iter().position(|candidate| candidate.id() == zombie)
    }
}

/// Picks the zombie a plant at `origin` attacks, as a position in `zombies`.
fn select_target(
    kind: PlantKind,
    origin: CellCoord,
    zombies: &[Zombie],
    index: &SpatialIndex,
    portals: Option<&PortalField>,
) -> Option<usize> {
    match kind.projectile() {
        Some(ProjectileKind::Spike) => nearest_anywhere(zombies, origin),
        Some(ProjectileKind::DandelionSeed) => None,
        _ => match portals {
            Some(field) => field.effective_target(origin, zombies, index),
            None => nearest_ahead(zombies, index, origin.row(), origin.column_f32(), None),
        },
    }
}

fn nearest_anywhere(zombies: &[Zombie], origin: CellCoord) -> Option<usize> {
    let from = (origin.row() as f32, origin.column_f32());
    zombies
        .iter()
        .enumerate()
        .filter(|(_, zombie)| zombie.is_targetable())
        .map(|(position, zombie)| {
            let gap = (zombie.row() as f32 - from.0).hypot(zombie.col() - from.1);
            (gap, position)
        })
        .fold(None, |best: Option<(f32, usize)>, current| match best {
            Some(existing) if existing.0 <= current.0 => Some(existing),
            _ => Some(current),
        })
        .map(|(_, position)| position)
}

fn roll_penetration(always: bool, chance: f32, rng: &mut ChaCha8Rng) -> bool {
    always || (chance > 0.0 && rng.gen::<f32>() < chance)
}

/// Rolls the teleport chance once per portal a zombie steps on.
fn cross_portal(
    field: &PortalField,
    zombie: &mut Zombie,
    rng: &mut ChaCha8Rng,
    out: &mut Vec<Event>,
) {
    let contact = field.contact(zombie).map(|portal| portal.id());
    if contact == zombie.portal_contact() {
        return;
    }
    let Some(portal) = contact else {
        zombie.set_portal_contact(None);
        return;
    };

    let chance = field.config().teleport_chance;
    if chance > 0.0 && rng.gen::<f32>() < chance {
        if let Some(teleport) = field.teleport(zombie, rng) {
            zombie.disengage();
            out.push(Event::ZombieTeleported {
                zombie: zombie.id(),
                from: teleport.from,
                to: teleport.to,
            });
            return;
        }
    }
    zombie.set_portal_contact(Some(portal));
}
