#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defence engine.
//!
//! This crate defines the vocabulary that connects the host adapters, the
//! authoritative world, and the pure combat and spawn systems. Hosts submit
//! [`Command`] values between ticks, the world executes them through its
//! `apply` entry point, and every state transition worth observing is
//! broadcast as an [`Event`]. Entity records ([`Plant`], [`Zombie`],
//! [`Projectile`], [`Cart`]) live here so every system operates on the same
//! closed set of kinds.

mod config;
mod entities;
mod error;
mod kinds;

use serde::{Deserialize, Serialize};

pub use config::{FieldDimensions, LevelConfig, PortalConfig, SpawnTuning};
pub use entities::{
    Cart, CartState, ChewCue, DamageReport, Detonation, Motion, Plant, Projectile, ShotCadence,
    Zombie, ZombieTuning,
};
pub use error::{ConfigError, ParseKindError, PlacementError, ToolError};
pub use kinds::{
    AttackProfile, PlantKind, ProjectileKind, ZombieKind, CART_COLLISION_RANGE, CART_SPEED,
    CHERRY_BOMB_DAMAGE, CUCUMBER_DEATH_CHANCE, CUCUMBER_HEAL_AMOUNT, CUCUMBER_HEAL_INTERVAL,
    CUCUMBER_SPRAY_TICKS, CUCUMBER_STUN_TICKS, DANDELION_VOLLEY, DETONATION_FUSE_TICKS,
    DETONATION_VISUAL_TICKS, DYING_TICKS, FREEZE_TICKS, HAMMER_COOLDOWN_TICKS,
    LIGHTNING_CHAIN_CHANCE, LIGHTNING_CHAIN_JUMPS, LIGHTNING_CHAIN_RADIUS, LIGHTNING_DAMAGE,
    LOSS_MARGIN, MELON_EXPLOSION_TICKS, MELON_IMPACT_RANGE, MELON_SPLASH_DAMAGE, MELON_SPLASH_RANGE,
    SUNFLOWER_PRODUCTION_INTERVAL, SUNFLOWER_SUN,
};

/// Canonical banner emitted when a host boots the simulation.
pub const WELCOME_BANNER: &str = "Welcome to Lane Defence.";

/// Number of simulation ticks per second of game time.
pub const TICKS_PER_SECOND: u32 = 60;

/// Unique identifier assigned to each zombie.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ZombieId(u32);

impl ZombieId {
    /// Creates a new zombie identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to each plant.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlantId(u32);

impl PlantId {
    /// Creates a new plant identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to each projectile.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to each portal.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PortalId(u32);

impl PortalId {
    /// Creates a new portal identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single lawn cell expressed as row and column indices.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row (lane) containing the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column containing the cell, counted from the defended edge.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Column of the cell expressed in continuous lawn units.
    #[must_use]
    pub fn column_f32(&self) -> f32 {
        self.column as f32
    }
}

/// Status conditions mirrored onto a zombie at the start of each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusFlags {
    /// Zombie skips its think step entirely.
    pub stunned: bool,
    /// Zombie is covered in spray and may be marked for death.
    pub spraying: bool,
    /// Zombie moves at reduced speed.
    pub frozen: bool,
}

/// Description of a zombie the spawn scheduler wants to inject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZombieBlueprint {
    /// Archetype of the zombie.
    pub kind: ZombieKind,
    /// Whether the zombie carries an armor pool.
    pub armored: bool,
    /// Whether the zombie moves with the fast speed multiplier.
    pub fast: bool,
    /// Whether the zombie belongs to a scripted wave.
    pub wave: bool,
}

impl ZombieBlueprint {
    /// Plain, unarmored trickle zombie of the given kind.
    #[must_use]
    pub const fn plain(kind: ZombieKind) -> Self {
        Self {
            kind,
            armored: false,
            fast: false,
            wave: false,
        }
    }
}

/// Request emitted by a charged plant that wants to attack this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FireIntent {
    /// Plant that is firing.
    pub plant: PlantId,
    /// Kind of the firing plant, which determines the attack.
    pub kind: PlantKind,
    /// Cell the plant occupies.
    pub origin: CellCoord,
    /// Zombie selected by portal-aware targeting, if any.
    pub target: Option<ZombieId>,
    /// Column a ballistic shot should land on.
    pub landing_column: f32,
    /// Whether the shot passes through the zombies it hits.
    pub penetrating: bool,
}

/// Phase of the spawn scheduler state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnMode {
    /// Single zombies trickle in on a fixed interval.
    NormalTrickle,
    /// Scripted waves are issued; terminal for the level.
    WaveMode,
}

/// Terminal and non-terminal states of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelOutcome {
    /// The level is still being played.
    Running,
    /// A zombie reached the defended edge of the given row.
    Failed {
        /// Row the zombie broke through.
        row: u32,
    },
    /// Every wave was issued and cleared.
    Completed,
}

/// Origin of damage applied to a zombie.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageSource {
    /// A projectile of the given kind.
    Projectile(ProjectileKind),
    /// Splash from a landed melon.
    Splash,
    /// A lightning bolt or one of its chain jumps.
    Lightning,
    /// An area blast from a detonating plant.
    Blast,
}

/// Reason a zombie was removed with kill credit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KillCause {
    /// The dying animation elapsed after health reached zero.
    Defeated,
    /// The spray effect expired on a zombie marked for death.
    Spray,
    /// The hammer struck the zombie.
    Hammer,
}

/// Reason a plant left the lawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlantRemoval {
    /// Health was depleted by zombies.
    Eaten,
    /// A one-shot plant finished its detonation.
    Detonated,
    /// The player removed the plant.
    Shovelled,
}

/// Player tools that can be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    /// Removes a plant.
    Shovel,
    /// Kills zombies in a cell.
    Hammer,
    /// Launches a lawn cart manually.
    Cart,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one fixed step.
    Tick,
    /// Requests placement of a plant at the given cell.
    PlacePlant {
        /// Kind of plant to place.
        kind: PlantKind,
        /// Target cell.
        cell: CellCoord,
    },
    /// Requests removal of the plant at the given cell.
    RemovePlant {
        /// Cell holding the plant.
        cell: CellCoord,
    },
    /// Requests a hammer strike on the given cell.
    UseHammer {
        /// Cell to strike.
        cell: CellCoord,
    },
    /// Requests that the cart parked in the row starts rolling.
    TriggerCart {
        /// Row of the cart.
        row: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Index of the tick that just started.
        tick: u64,
    },
    /// Confirms that a plant was placed.
    PlantPlaced {
        /// Identifier assigned to the plant.
        plant: PlantId,
        /// Kind of the plant.
        kind: PlantKind,
        /// Cell the plant occupies.
        cell: CellCoord,
    },
    /// Confirms that a damaged wall-nut was restored to full health.
    PlantRepaired {
        /// Repaired plant.
        plant: PlantId,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Requested kind.
        kind: PlantKind,
        /// Requested cell.
        cell: CellCoord,
        /// Reason for the rejection.
        error: PlacementError,
    },
    /// Reports that a tool request was rejected.
    ToolRejected {
        /// Tool that was used.
        tool: Tool,
        /// Reason for the rejection.
        error: ToolError,
    },
    /// Confirms that a plant left the lawn.
    PlantRemoved {
        /// Removed plant.
        plant: PlantId,
        /// Cell the plant occupied.
        cell: CellCoord,
        /// Why the plant was removed.
        cause: PlantRemoval,
    },
    /// A sunflower produced sun.
    SunProduced {
        /// Producing plant.
        plant: PlantId,
        /// Amount of sun added after clamping.
        amount: u32,
    },
    /// Sun fell from the sky.
    AmbientSun {
        /// Amount of sun added after clamping.
        amount: u32,
    },
    /// A plant launched a projectile.
    ProjectileLaunched {
        /// Identifier of the new projectile.
        projectile: ProjectileId,
        /// Kind of the projectile.
        kind: ProjectileKind,
        /// Plant that fired.
        plant: PlantId,
    },
    /// Damage landed on a zombie.
    ZombieHit {
        /// Zombie that was hit.
        zombie: ZombieId,
        /// Origin of the damage.
        source: DamageSource,
        /// Raw damage dealt.
        damage: u32,
        /// Whether the armor pool absorbed part of the hit.
        armor_hit: bool,
    },
    /// A zombie rolled immunity and ignored a hit.
    ZombieImmune {
        /// Zombie that shrugged off the hit.
        zombie: ZombieId,
        /// Origin of the ignored damage.
        source: DamageSource,
    },
    /// A zombie was frozen.
    ZombieFrozen {
        /// Frozen zombie.
        zombie: ZombieId,
    },
    /// A lightning bolt struck one or more zombies.
    LightningStruck {
        /// Plant that fired the bolt.
        plant: PlantId,
        /// Number of zombies touched by the bolt, including chain jumps.
        struck: u32,
    },
    /// A one-shot plant detonated.
    Detonated {
        /// Detonating plant.
        plant: PlantId,
        /// Kind of the detonating plant.
        kind: PlantKind,
        /// Number of zombies caught by the effect.
        affected: u32,
    },
    /// A zombie entered the lawn.
    ZombieSpawned {
        /// Identifier assigned to the zombie.
        zombie: ZombieId,
        /// Blueprint the zombie was created from.
        blueprint: ZombieBlueprint,
        /// Lane of the zombie.
        row: u32,
    },
    /// A zombie chewed on a plant long enough to emit a bite cue.
    PlantBitten {
        /// Biting zombie.
        zombie: ZombieId,
        /// Plant being eaten.
        plant: PlantId,
    },
    /// A giant smashed a plant.
    PlantSmashed {
        /// Smashing zombie.
        zombie: ZombieId,
        /// Plant being smashed.
        plant: PlantId,
    },
    /// A zombie passed through a portal.
    ZombieTeleported {
        /// Teleported zombie.
        zombie: ZombieId,
        /// Entry portal.
        from: PortalId,
        /// Exit portal.
        to: PortalId,
    },
    /// A zombie ran out of health and began its dying animation.
    ZombieDying {
        /// Dying zombie.
        zombie: ZombieId,
    },
    /// A zombie was removed and credited as a kill.
    ZombieKilled {
        /// Removed zombie.
        zombie: ZombieId,
        /// How the zombie died.
        cause: KillCause,
    },
    /// Loot was awarded for a kill.
    LootDropped {
        /// Zombie that dropped the loot.
        zombie: ZombieId,
        /// Sun added after clamping.
        sun: u32,
        /// Coins added.
        coins: u32,
    },
    /// The hammer struck a cell.
    HammerStruck {
        /// Struck cell.
        cell: CellCoord,
        /// Number of zombies killed.
        killed: u32,
    },
    /// A lawn cart started rolling.
    CartTriggered {
        /// Row of the cart.
        row: u32,
    },
    /// A rolling cart flattened a zombie.
    CartHit {
        /// Row of the cart.
        row: u32,
        /// Zombie that was hit.
        zombie: ZombieId,
    },
    /// A portal began materializing.
    PortalSpawned {
        /// Identifier of the portal.
        portal: PortalId,
        /// Cell of the portal.
        cell: CellCoord,
    },
    /// A portal began fading out as part of a relocation.
    PortalRetired {
        /// Identifier of the portal.
        portal: PortalId,
    },
    /// The scheduler switched to wave mode.
    WaveModeEntered,
    /// A scripted wave was issued.
    WaveIssued {
        /// One-based wave number.
        wave: u32,
        /// Number of zombies in the wave.
        zombies: u32,
        /// Set for the first wave of the level, which carries a warning cue.
        first: bool,
    },
    /// Every zombie of a wave has been defeated.
    WaveCleared {
        /// One-based wave number.
        wave: u32,
    },
    /// A zombie reached the defended edge with no cart left in its row.
    LevelFailed {
        /// Row the zombie broke through.
        row: u32,
    },
    /// Every wave was issued and cleared.
    LevelCompleted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_round_trip_numeric_value() {
        assert_eq!(ZombieId::new(7).get(), 7);
        assert_eq!(PlantId::new(3).get(), 3);
        assert_eq!(ProjectileId::new(11).get(), 11);
        assert_eq!(PortalId::new(2).get(), 2);
    }

    #[test]
    fn identifiers_order_by_value() {
        assert!(ZombieId::new(1) < ZombieId::new(2));
        assert!(PlantId::new(9) > PlantId::new(4));
    }

    #[test]
    fn cell_coord_reports_components() {
        let cell = CellCoord::new(2, 5);
        assert_eq!(cell.row(), 2);
        assert_eq!(cell.column(), 5);
        assert_eq!(cell.column_f32(), 5.0);
    }

    #[test]
    fn cell_coord_serializes_with_bincode() {
        let cell = CellCoord::new(4, 8);
        let bytes = bincode::serialize(&cell).expect("serialize cell");
        let restored: CellCoord = bincode::deserialize(&bytes).expect("deserialize cell");
        assert_eq!(restored, cell);
    }

    #[test]
    fn plain_blueprint_has_no_traits() {
        let blueprint = ZombieBlueprint::plain(ZombieKind::Normal);
        assert!(!blueprint.armored);
        assert!(!blueprint.fast);
        assert!(!blueprint.wave);
    }
}
