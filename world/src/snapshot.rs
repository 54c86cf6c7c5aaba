//! Persistence of the world at tick boundaries.

use std::collections::BTreeSet;

use lane_defence_core::{
    Cart, CellCoord, LevelConfig, LevelOutcome, Motion, Plant, PlantId, Projectile,
    ProjectileId, ProjectileKind, Zombie, ZombieId,
};
use lane_defence_system_combat::CombatResolver;
use lane_defence_system_portals::PortalField;
use lane_defence_system_spawning::SpawnScheduler;
use lane_defence_system_status_effects::{HealingTable, StatusTable};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{Economy, WaveProgress, World};

/// Complete, serializable state of a world between two ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    config: LevelConfig,
    rng: ChaCha8Rng,
    tick_index: u64,
    outcome: LevelOutcome,
    economy: Economy,
    progress: WaveProgress,
    pre_wave_kills: u32,
    total_kills: u32,
    plants: Vec<Plant>,
    zombies: Vec<Zombie>,
    projectiles: Vec<Projectile>,
    carts: Vec<Cart>,
    status: StatusTable,
    healing: HealingTable,
    portals: Option<PortalField>,
    scheduler: SpawnScheduler,
    next_zombie: u32,
    next_plant: u32,
    next_projectile: u32,
}

impl WorldSnapshot {
    /// Tick index the snapshot was taken at.
    #[must_use]
    pub const fn tick_index(&self) -> u64 {
        self.tick_index
    }

    /// Level configuration the snapshot runs with.
    #[must_use]
    pub fn config(&self) -> &LevelConfig {
        &self.config
    }
}

/// Reasons a snapshot cannot be restored.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RestoreError {
    /// A zombie walks a lane the lawn does not have.
    #[error("zombie {zombie:?} is in row {row}, outside the lawn")]
    ZombieOutOfBounds {
        /// Offending zombie.
        zombie: ZombieId,
        /// Row it claims to be in.
        row: u32,
    },
    /// A zombie identifier appears twice.
    #[error("zombie {0:?} appears more than once")]
    DuplicateZombie(ZombieId),
    /// A plant sits on a cell outside the lawn.
    #[error("plant {plant:?} sits outside the lawn")]
    PlantOutOfBounds {
        /// Offending plant.
        plant: PlantId,
    },
    /// Two plants share a cell.
    #[error("more than one plant occupies row {row}, column {column}")]
    DuplicatePlantCell {
        /// Row of the cell.
        row: u32,
        /// Column of the cell.
        column: u32,
    },
    /// The carts do not match the lawn's rows.
    #[error("cart for row {row} does not match the lawn")]
    CartRowMismatch {
        /// Row of the unexpected cart.
        row: u32,
    },
    /// A projectile carries flight state its kind never uses.
    #[error("projectile {0:?} has flight state that does not match its kind")]
    ProjectileMotionMismatch(ProjectileId),
}

impl World {
    /// Captures the complete world state.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            config: self.config.clone(),
            rng: self.rng.clone(),
            tick_index: self.tick_index,
            outcome: self.outcome,
            economy: self.economy.clone(),
            progress: self.progress,
            pre_wave_kills: self.pre_wave_kills,
            total_kills: self.total_kills,
            plants: self.plants.clone(),
            zombies: self.zombies.clone(),
            projectiles: self.projectiles.clone(),
            carts: self.carts.clone(),
            status: self.status.clone(),
            healing: self.healing.clone(),
            portals: self.portals.clone(),
            scheduler: self.scheduler.clone(),
            next_zombie: self.next_zombie,
            next_plant: self.next_plant,
            next_projectile: self.combat.next_projectile_id(),
        }
    }

    /// Rebuilds a world from a snapshot.
    ///
    /// The world is created for the snapshot's level and every saved entity is
    /// rebuilt through its constructor before its runtime state is laid over
    /// it, so stats fixed at creation follow the level's current tuning.
    /// Identifier counters never fall behind the restored entities, and a
    /// restored portal field keeps its portals instead of placing fresh ones.
    pub fn restore(snapshot: WorldSnapshot) -> Result<World, RestoreError> {
        let mut world = World::new(snapshot.config);
        let field = world.config.field;

        let mut zombie_ids = BTreeSet::new();
        for zombie in &snapshot.zombies {
            if zombie.row() >= field.rows {
                return Err(RestoreError::ZombieOutOfBounds {
                    zombie: zombie.id(),
                    row: zombie.row(),
                });
            }
            if !zombie_ids.insert(zombie.id()) {
                return Err(RestoreError::DuplicateZombie(zombie.id()));
            }
        }

        let mut cells = BTreeSet::new();
        for plant in &snapshot.plants {
            let cell = plant.cell();
            if !field.contains(cell) {
                return Err(RestoreError::PlantOutOfBounds { plant: plant.id() });
            }
            if !cells.insert(cell) {
                return Err(RestoreError::DuplicatePlantCell {
                    row: cell.row(),
                    column: cell.column(),
                });
            }
        }

        let mut rows = BTreeSet::new();
        for cart in &snapshot.carts {
            if cart.row() >= field.rows || !rows.insert(cart.row()) {
                return Err(RestoreError::CartRowMismatch { row: cart.row() });
            }
        }

        let projectiles = snapshot
            .projectiles
            .iter()
            .map(|saved| {
                rebuild_projectile(saved)
                    .ok_or(RestoreError::ProjectileMotionMismatch(saved.id()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        world.next_zombie = snapshot.zombies.iter().fold(snapshot.next_zombie, |next, zombie| {
            next.max(zombie.id().get().saturating_add(1))
        });
        world.next_plant = snapshot.plants.iter().fold(snapshot.next_plant, |next, plant| {
            next.max(plant.id().get().saturating_add(1))
        });
        world.combat = CombatResolver::resume(snapshot.next_projectile);
        for projectile in projectiles {
            world.combat.adopt(&mut world.projectiles, projectile);
        }

        world.zombies = snapshot
            .zombies
            .iter()
            .map(|saved| {
                let mut zombie = Zombie::spawn(
                    saved.id(),
                    saved.blueprint(),
                    saved.row(),
                    saved.col(),
                    world.tuning,
                );
                zombie.overlay(saved);
                zombie
            })
            .collect();
        world.plants = snapshot
            .plants
            .iter()
            .map(|saved| {
                let mut plant = Plant::new(saved.id(), saved.kind(), saved.cell(), saved.cadence());
                plant.overlay(saved);
                plant
            })
            .collect();
        world.carts = snapshot
            .carts
            .iter()
            .map(|saved| {
                let mut cart = Cart::new(saved.row());
                cart.overlay(saved);
                cart
            })
            .collect();

        world.rng = snapshot.rng;
        world.tick_index = snapshot.tick_index;
        world.outcome = snapshot.outcome;
        world.economy = snapshot.economy;
        world.progress = snapshot.progress;
        world.pre_wave_kills = snapshot.pre_wave_kills;
        world.total_kills = snapshot.total_kills;
        world.scheduler = snapshot.scheduler;
        world.portals = snapshot.portals;

        world.status = snapshot.status;
        world.status.prune(|zombie| zombie_ids.contains(&zombie));
        world.healing = snapshot.healing;
        let plant_ids: BTreeSet<PlantId> = world.plants.iter().map(Plant::id).collect();
        world.healing.prune(|plant| plant_ids.contains(&plant));

        world.index.rebuild(&world.zombies);
        info!(
            tick = world.tick_index,
            zombies = world.zombies.len(),
            plants = world.plants.len(),
            "world restored"
        );
        Ok(world)
    }
}

/// Rebuilds a saved projectile through the constructor of its kind.
fn rebuild_projectile(saved: &Projectile) -> Option<Projectile> {
    let origin = CellCoord::new(saved.lane().unwrap_or_default(), 0);
    let mut projectile = match (saved.kind(), saved.motion()) {
        (ProjectileKind::Pea | ProjectileKind::Ice, Motion::Linear { .. }) => Projectile::linear(
            saved.id(),
            saved.kind(),
            saved.source(),
            origin,
            saved.is_penetrating(),
        ),
        (
            ProjectileKind::Melon,
            Motion::Ballistic {
                to_column, target, ..
            },
        ) => Projectile::ballistic(saved.id(), saved.source(), origin, *to_column, *target),
        (ProjectileKind::Spike, Motion::Homing { target, .. }) => {
            Projectile::homing(saved.id(), saved.source(), origin, *target)
        }
        (ProjectileKind::DandelionSeed, Motion::Drift { target, heading, .. }) => {
            Projectile::seed(saved.id(), saved.source(), origin, *target, *heading)
        }
        _ => return None,
    };
    projectile.overlay(saved);
    Some(projectile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{PlantKind, ZombieBlueprint, ZombieKind};

    #[test]
    fn restore_rejects_two_plants_on_one_cell() {
        let world = World::default();
        let mut snapshot = world.snapshot();
        let cell = CellCoord::new(1, 1);
        snapshot
            .plants
            .push(Plant::new(PlantId::new(0), PlantKind::WallNut, cell, None));
        snapshot
            .plants
            .push(Plant::new(PlantId::new(1), PlantKind::Sunflower, cell, None));

        assert_eq!(
            World::restore(snapshot).err(),
            Some(RestoreError::DuplicatePlantCell { row: 1, column: 1 })
        );
    }

    #[test]
    fn restore_rejects_carts_off_the_lawn() {
        let mut snapshot = World::default().snapshot();
        snapshot.carts.push(Cart::new(9));

        assert_eq!(
            World::restore(snapshot).err(),
            Some(RestoreError::CartRowMismatch { row: 9 })
        );
    }

    #[test]
    fn restored_zombies_take_stats_from_the_current_level() {
        let mut world = World::default();
        let mut events = Vec::new();
        let zombie = world.spawn_zombie(
            ZombieBlueprint::plain(ZombieKind::Normal),
            2,
            6.5,
            &mut events,
        );
        let _ = world.zombies[0].apply_damage(40);

        let mut snapshot = world.snapshot();
        snapshot.config.zombie_health_scale = 2.0;
        let restored = World::restore(snapshot).expect("restore snapshot");

        let rebuilt = &restored.zombies[0];
        assert_eq!(rebuilt.id(), zombie);
        assert_eq!(rebuilt.max_health(), 300);
        assert_eq!(rebuilt.health(), 110);
        assert_eq!((rebuilt.row(), rebuilt.col()), (2, 6.5));
    }

    #[test]
    fn restore_rejects_projectiles_with_foreign_flight_state() {
        let mut snapshot = World::default().snapshot();
        let mut shot = Projectile::linear(
            ProjectileId::new(3),
            ProjectileKind::Pea,
            PlantId::new(0),
            CellCoord::new(1, 1),
            false,
        );
        *shot.motion_mut() = Motion::Homing {
            target: None,
            heading: (0.0, 1.0),
        };
        snapshot.projectiles.push(shot);

        assert_eq!(
            World::restore(snapshot).err(),
            Some(RestoreError::ProjectileMotionMismatch(ProjectileId::new(3)))
        );
    }

    #[test]
    fn id_counters_never_fall_behind_restored_plants() {
        let mut snapshot = World::default().snapshot();
        snapshot.plants.push(Plant::new(
            PlantId::new(41),
            PlantKind::WallNut,
            CellCoord::new(0, 0),
            None,
        ));

        let world = World::restore(snapshot).expect("restore snapshot");
        assert_eq!(world.next_plant, 42);
    }
}
