//! Error types reported by command validation and configuration checks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a plant placement is rejected. Rejections never mutate the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The cell lies outside the lawn.
    #[error("cell lies outside the lawn")]
    OutOfBounds,
    /// Another plant already occupies the cell.
    #[error("cell is already occupied")]
    CellOccupied,
    /// A portal occupies the cell.
    #[error("a portal occupies the cell")]
    PortalOccupied,
    /// The player cannot afford the plant.
    #[error("insufficient sun: {required} required, {available} available")]
    InsufficientSun {
        /// Sun the plant costs.
        required: u32,
        /// Sun the player holds.
        available: u32,
    },
    /// The card for this kind is still cooling down.
    #[error("card is cooling down for {remaining} more ticks")]
    CardCoolingDown {
        /// Ticks until the card is available again.
        remaining: u32,
    },
    /// The level caps the number of sunflowers.
    #[error("sunflower limit of {limit} reached")]
    SunflowerLimitReached {
        /// Maximum number of sunflowers allowed.
        limit: u32,
    },
    /// The level has already ended.
    #[error("the level is over")]
    LevelOver,
}

/// Reasons a shovel, hammer or cart request is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum ToolError {
    /// The cell or row lies outside the lawn.
    #[error("target lies outside the lawn")]
    OutOfBounds,
    /// The shovel found no plant in the cell.
    #[error("no plant to remove")]
    NothingToRemove,
    /// The hammer is still cooling down.
    #[error("hammer is cooling down for {remaining} more ticks")]
    HammerCoolingDown {
        /// Ticks until the hammer is available again.
        remaining: u32,
    },
    /// The hammer found no zombie in the cell.
    #[error("no zombie in the struck cell")]
    NoZombieInCell,
    /// The row has no parked cart.
    #[error("no cart available in the row")]
    CartUnavailable,
    /// The level has already ended.
    #[error("the level is over")]
    LevelOver,
}

/// Problems detected while validating a level configuration.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A probability lies outside `[0, 1]`.
    #[error("{name} must lie within [0, 1], got {value}")]
    InvalidProbability {
        /// Name of the offending parameter.
        name: &'static str,
        /// Value that was supplied.
        value: f32,
    },
    /// The lawn has no rows or no columns.
    #[error("the lawn must have at least one row and one column")]
    EmptyField,
    /// A portal column lies outside the lawn.
    #[error("portal column {column} lies outside a lawn of {columns} columns")]
    PortalColumnOutOfRange {
        /// Offending column.
        column: u32,
        /// Columns available on the lawn.
        columns: u32,
    },
    /// Portals are enabled but cannot be placed.
    #[error("portals need at least one column and as many rows as portals")]
    PortalLayoutImpossible,
    /// Wave row counts are inverted.
    #[error("wave row minimum {min} exceeds maximum {max}")]
    InvertedWaveRange {
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },
}

/// Error returned when parsing a kind from text fails.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseKindError {
    /// No plant kind carries the given name.
    #[error("unknown plant kind `{0}`")]
    UnknownPlant(String),
}
