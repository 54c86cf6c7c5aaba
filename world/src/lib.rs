#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lane Defence.
//!
//! The [`World`] owns every plant, zombie, projectile and cart together with
//! the side tables of the combat systems. Hosts drive it exclusively through
//! [`apply`], which executes one [`Command`] and reports what happened as
//! [`Event`] values, and observe it through the read-only [`query`] module.

mod commands;
mod economy;
mod lifecycle;
mod progress;
mod snapshot;

pub use economy::Economy;
pub use progress::WaveProgress;
pub use snapshot::{RestoreError, WorldSnapshot};

use lane_defence_core::{
    Cart, Command, Event, LevelConfig, LevelOutcome, Plant, Projectile, Tool, Zombie,
    ZombieTuning, CUCUMBER_HEAL_INTERVAL, WELCOME_BANNER,
};
use lane_defence_system_combat::CombatResolver;
use lane_defence_system_portals::PortalField;
use lane_defence_system_spatial_index::SpatialIndex;
use lane_defence_system_spawning::SpawnScheduler;
use lane_defence_system_status_effects::{HealingTable, StatusTable};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

/// Represents the authoritative Lane Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: LevelConfig,
    tuning: ZombieTuning,
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
    index: SpatialIndex,
    status: StatusTable,
    healing: HealingTable,
    portals: Option<PortalField>,
    scheduler: SpawnScheduler,
    combat: CombatResolver,
    next_zombie: u32,
    next_plant: u32,
}

impl World {
    /// Creates a world for the level described by `config`.
    ///
    /// Parameters the simulation cannot honour are clamped into range rather
    /// than rejected.
    #[must_use]
    pub fn new(config: LevelConfig) -> Self {
        if let Err(error) = config.validate() {
            warn!(%error, "level configuration adjusted");
        }
        let config = config.sanitized();
        let rows = config.field.rows;
        let carts = if config.carts {
            (0..rows).map(Cart::new).collect()
        } else {
            Vec::new()
        };

        Self {
            banner: WELCOME_BANNER,
            tuning: ZombieTuning::from_config(&config),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            tick_index: 0,
            outcome: LevelOutcome::Running,
            economy: Economy::new(&config),
            progress: WaveProgress::new(config.max_waves),
            pre_wave_kills: 0,
            total_kills: 0,
            plants: Vec::new(),
            zombies: Vec::new(),
            projectiles: Vec::new(),
            carts,
            index: SpatialIndex::new(rows),
            status: StatusTable::new(),
            healing: HealingTable::new(CUCUMBER_HEAL_INTERVAL),
            portals: config
                .portals
                .clone()
                .map(|portals| PortalField::new(portals, rows)),
            scheduler: SpawnScheduler::new(&config),
            combat: CombatResolver::new(),
            next_zombie: 0,
            next_plant: 0,
            config,
        }
    }

    fn is_running(&self) -> bool {
        self.outcome == LevelOutcome::Running
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(LevelConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected commands leave the world untouched and are reported as
/// [`Event::PlacementRejected`] or [`Event::ToolRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => world.tick(out_events),
        Command::PlacePlant { kind, cell } => {
            if let Err(error) = world.place_plant(kind, cell, out_events) {
                debug!(
                    ?kind,
                    row = cell.row(),
                    column = cell.column(),
                    %error,
                    "placement rejected"
                );
                out_events.push(Event::PlacementRejected { kind, cell, error });
            }
        }
        Command::RemovePlant { cell } => {
            if let Err(error) = world.remove_plant(cell, out_events) {
                debug!(%error, "shovel rejected");
                out_events.push(Event::ToolRejected {
                    tool: Tool::Shovel,
                    error,
                });
            }
        }
        Command::UseHammer { cell } => {
            if let Err(error) = world.use_hammer(cell, out_events) {
                debug!(%error, "hammer rejected");
                out_events.push(Event::ToolRejected {
                    tool: Tool::Hammer,
                    error,
                });
            }
        }
        Command::TriggerCart { row } => {
            if let Err(error) = world.trigger_cart(row, out_events) {
                debug!(row, %error, "cart rejected");
                out_events.push(Event::ToolRejected {
                    tool: Tool::Cart,
                    error,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use lane_defence_core::{
        Cart, CellCoord, LevelConfig, LevelOutcome, Plant, PlantKind, Projectile, SpawnMode,
        StatusFlags, Zombie, ZombieId, ZombieKind,
    };
    use lane_defence_system_portals::Portal;

    use super::{WaveProgress, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Sanitized configuration the world runs with.
    #[must_use]
    pub fn config(world: &World) -> &LevelConfig {
        &world.config
    }

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Whether the level is running, failed or completed.
    #[must_use]
    pub fn outcome(world: &World) -> LevelOutcome {
        world.outcome
    }

    /// Every plant on the lawn in placement order.
    #[must_use]
    pub fn plants(world: &World) -> &[Plant] {
        &world.plants
    }

    /// Plant occupying the cell, if any.
    #[must_use]
    pub fn plant_at(world: &World, cell: CellCoord) -> Option<&Plant> {
        world.plants.iter().find(|plant| plant.cell() == cell)
    }

    /// Every zombie on the lawn in spawn order, dying ones included.
    #[must_use]
    pub fn zombies(world: &World) -> &[Zombie] {
        &world.zombies
    }

    /// Every projectile in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> &[Projectile] {
        &world.projectiles
    }

    /// Every portal, empty for levels without portals.
    #[must_use]
    pub fn portals(world: &World) -> &[Portal] {
        world
            .portals
            .as_ref()
            .map_or(&[][..], |field| field.portals())
    }

    /// Lawn carts, one per row when enabled.
    #[must_use]
    pub fn carts(world: &World) -> &[Cart] {
        &world.carts
    }

    /// Current status conditions of a zombie; unknown zombies have none.
    #[must_use]
    pub fn status(world: &World, zombie: ZombieId) -> StatusFlags {
        world.status.flags(zombie)
    }

    /// Captures the renderer-facing view of every zombie.
    #[must_use]
    pub fn zombie_view(world: &World) -> Vec<ZombieSnapshot> {
        world
            .zombies
            .iter()
            .map(|zombie| ZombieSnapshot {
                id: zombie.id(),
                kind: zombie.kind(),
                row: zombie.row(),
                col: zombie.col(),
                health_fraction: zombie.health_fraction(),
                armor_fraction: zombie.armor_fraction(),
                status: world.status.flags(zombie.id()),
                attacking: zombie.is_attacking(),
                dying: zombie.is_dying(),
            })
            .collect()
    }

    /// Banked resources and tool cooldowns.
    #[must_use]
    pub fn economy(world: &World) -> EconomyView {
        EconomyView {
            sun: world.economy.sun(),
            coins: world.economy.coins(),
            hammer_cooldown: world.economy.hammer_cooldown(),
        }
    }

    /// Ticks until the plant's card can be used again.
    #[must_use]
    pub fn card_cooldown(world: &World, kind: PlantKind) -> u32 {
        world.economy.card_cooldown(kind)
    }

    /// Current scheduler mode.
    #[must_use]
    pub fn spawn_mode(world: &World) -> SpawnMode {
        world.scheduler.mode()
    }

    /// Wave bookkeeping.
    #[must_use]
    pub fn wave_progress(world: &World) -> &WaveProgress {
        &world.progress
    }

    /// Kill counters.
    #[must_use]
    pub fn kills(world: &World) -> KillTally {
        KillTally {
            total: world.total_kills,
            pre_wave: world.pre_wave_kills,
        }
    }

    /// Read-only state of a zombie for rendering.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ZombieSnapshot {
        /// Unique identifier assigned to the zombie.
        pub id: ZombieId,
        /// Archetype of the zombie.
        pub kind: ZombieKind,
        /// Lane of the zombie.
        pub row: u32,
        /// Continuous column of the zombie.
        pub col: f32,
        /// Remaining health as a fraction of the maximum.
        pub health_fraction: f32,
        /// Remaining armor as a fraction of the maximum.
        pub armor_fraction: f32,
        /// Status conditions.
        pub status: StatusFlags,
        /// Whether the zombie is chewing on a plant.
        pub attacking: bool,
        /// Whether the zombie is in its dying animation.
        pub dying: bool,
    }

    /// Banked resources.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EconomyView {
        /// Banked sun.
        pub sun: u32,
        /// Collected coins.
        pub coins: u32,
        /// Ticks until the hammer can be used again.
        pub hammer_cooldown: u32,
    }

    /// Kill counters of the level.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct KillTally {
        /// Every credited kill.
        pub total: u32,
        /// Kills of trickle zombies made before wave mode.
        pub pre_wave: u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{CellCoord, PlacementError, PlantKind, PlantRemoval, ToolError};

    fn place(world: &mut World, kind: PlantKind, row: u32, column: u32) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::PlacePlant {
                kind,
                cell: CellCoord::new(row, column),
            },
            &mut events,
        );
        events
    }

    fn rich_level() -> LevelConfig {
        LevelConfig {
            initial_sun: 1000,
            ..LevelConfig::default()
        }
    }

    #[test]
    fn placement_spends_sun_and_reports_the_plant() {
        let mut world = World::default();
        let events = place(&mut world, PlantKind::Sunflower, 0, 0);

        assert!(
            matches!(events.as_slice(), [Event::PlantPlaced { kind: PlantKind::Sunflower, .. }]),
            "unexpected events {events:?}"
        );
        assert_eq!(query::economy(&world).sun, 0);
        assert!(query::plant_at(&world, CellCoord::new(0, 0)).is_some());
    }

    #[test]
    fn shooter_placement_survives_a_vanishing_plant_speed() {
        let mut world = World::new(LevelConfig {
            plant_speed_multiplier: f32::MIN_POSITIVE,
            ..rich_level()
        });
        let events = place(&mut world, PlantKind::PeaShooter, 2, 0);

        assert!(matches!(events.as_slice(), [Event::PlantPlaced { .. }]));
        let cadence = query::plants(&world)[0].cadence().expect("shooters keep a cadence");
        assert!(cadence.delay.is_finite());
    }

    #[test]
    fn rejected_placements_leave_the_world_untouched() {
        let mut world = World::default();
        let _ = place(&mut world, PlantKind::Sunflower, 0, 0);

        let rejection = |events: Vec<Event>| match events.as_slice() {
            [Event::PlacementRejected { error, .. }] => Some(*error),
            _ => None,
        };
        assert_eq!(
            rejection(place(&mut world, PlantKind::WallNut, 0, 0)),
            Some(PlacementError::CellOccupied)
        );
        assert_eq!(
            rejection(place(&mut world, PlantKind::Sunflower, 5, 0)),
            Some(PlacementError::OutOfBounds)
        );
        assert_eq!(
            rejection(place(&mut world, PlantKind::PeaShooter, 1, 1)),
            Some(PlacementError::InsufficientSun {
                required: 75,
                available: 0,
            })
        );
        assert_eq!(query::plants(&world).len(), 1);
    }

    #[test]
    fn sunflower_limit_is_enforced() {
        let mut world = World::new(LevelConfig {
            sunflower_limit: Some(1),
            ..rich_level()
        });
        let _ = place(&mut world, PlantKind::Sunflower, 0, 0);
        let events = place(&mut world, PlantKind::Sunflower, 1, 0);

        assert!(matches!(
            events.as_slice(),
            [Event::PlacementRejected {
                error: PlacementError::SunflowerLimitReached { limit: 1 },
                ..
            }]
        ));
    }

    #[test]
    fn cards_cool_down_when_enabled() {
        let mut world = World::new(LevelConfig {
            card_cooldowns: true,
            ..rich_level()
        });
        let _ = place(&mut world, PlantKind::PeaShooter, 0, 0);
        let events = place(&mut world, PlantKind::PeaShooter, 1, 0);

        assert!(matches!(
            events.as_slice(),
            [Event::PlacementRejected {
                error: PlacementError::CardCoolingDown { remaining: 120 },
                ..
            }]
        ));
        assert_eq!(query::card_cooldown(&world, PlantKind::PeaShooter), 120);
        assert_eq!(query::card_cooldown(&world, PlantKind::Sunflower), 0);
    }

    #[test]
    fn shovel_removes_without_refund() {
        let mut world = World::new(rich_level());
        let _ = place(&mut world, PlantKind::WallNut, 2, 3);
        let sun = query::economy(&world).sun;

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RemovePlant {
                cell: CellCoord::new(2, 3),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::RemovePlant {
                cell: CellCoord::new(2, 3),
            },
            &mut events,
        );

        assert!(matches!(
            events.as_slice(),
            [
                Event::PlantRemoved {
                    cause: PlantRemoval::Shovelled,
                    ..
                },
                Event::ToolRejected {
                    tool: Tool::Shovel,
                    error: ToolError::NothingToRemove,
                },
            ]
        ));
        assert_eq!(query::economy(&world).sun, sun, "shovel must not refund");
    }

    #[test]
    fn each_cart_can_be_launched_once() {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(&mut world, Command::TriggerCart { row: 0 }, &mut events);
        apply(&mut world, Command::TriggerCart { row: 0 }, &mut events);
        apply(&mut world, Command::TriggerCart { row: 7 }, &mut events);

        assert_eq!(
            events,
            vec![
                Event::CartTriggered { row: 0 },
                Event::ToolRejected {
                    tool: Tool::Cart,
                    error: ToolError::CartUnavailable,
                },
                Event::ToolRejected {
                    tool: Tool::Cart,
                    error: ToolError::OutOfBounds,
                },
            ]
        );
    }

    #[test]
    fn hammer_without_zombies_is_rejected_and_keeps_its_charge() {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::UseHammer {
                cell: CellCoord::new(0, 4),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::ToolRejected {
                tool: Tool::Hammer,
                error: ToolError::NoZombieInCell,
            }]
        );
        assert_eq!(query::economy(&world).hammer_cooldown, 0);
    }
}
