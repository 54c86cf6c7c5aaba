//! Per-level configuration read by the world and its systems.
//!
//! Every structure here deserializes with `#[serde(default)]`, so a level
//! file only needs to name the parameters it changes. Missing values fall back
//! to the defaults documented on each field.

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, CellCoord};

/// Dimensions of the lawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDimensions {
    /// Number of lanes. Defaults to 5.
    pub rows: u32,
    /// Number of plantable columns. Defaults to 9.
    pub columns: u32,
}

impl FieldDimensions {
    /// Creates lawn dimensions.
    #[must_use]
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Reports whether the cell lies on the lawn.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.row() < self.rows && cell.column() < self.columns
    }

    /// Right-hand edge where zombies enter, in continuous column units.
    #[must_use]
    pub fn entry_column(&self) -> f32 {
        self.columns as f32
    }
}

impl Default for FieldDimensions {
    fn default() -> Self {
        Self::new(5, 9)
    }
}

/// Portal layer parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Number of portals kept on the field. Defaults to 2.
    pub count: u32,
    /// Columns portals may occupy. Defaults to `[4, 5, 6, 7, 8]`.
    pub columns: Vec<u32>,
    /// Ticks between two relocations. Defaults to 1200.
    pub switch_interval: u32,
    /// Ticks a portal spends materializing. Defaults to 60.
    pub spawn_duration: u32,
    /// Ticks a portal spends fading out. Defaults to 30.
    pub despawn_duration: u32,
    /// Probability that a zombie stepping onto a portal is teleported. Defaults to 0.3.
    pub teleport_chance: f32,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            count: 2,
            columns: vec![4, 5, 6, 7, 8],
            switch_interval: 1200,
            spawn_duration: 60,
            despawn_duration: 30,
            teleport_chance: 0.3,
        }
    }
}

/// Spawn scheduler parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Ticks between two trickle spawns. Defaults to 180.
    pub trickle_interval: u32,
    /// Ticks between two waves. Defaults to 360.
    pub wave_interval: u32,
    /// Maximum number of trickle zombies per level. Defaults to 100.
    pub max_trickle_spawns: u32,
    /// Trickle spawning pauses while this many zombies are alive. Defaults to 10.
    pub population_cap: u32,
    /// Pre-wave kills per configured wave required to enter wave mode. Defaults to 5.
    pub kills_per_wave: u32,
    /// Fewest zombies a wave puts in each row. Defaults to 3.
    pub wave_row_min: u32,
    /// Most zombies a wave puts in each row. Defaults to 4.
    pub wave_row_max: u32,
    /// Column spacing between zombies of the same row in a wave. Defaults to 0.3.
    pub wave_column_stagger: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            trickle_interval: 180,
            wave_interval: 360,
            max_trickle_spawns: 100,
            population_cap: 10,
            kills_per_wave: 5,
            wave_row_min: 3,
            wave_row_max: 4,
            wave_column_stagger: 0.3,
        }
    }
}

/// Complete description of a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Seed of the level's random number generator. Defaults to `0x5eed`.
    pub seed: u64,
    /// Lawn dimensions.
    pub field: FieldDimensions,
    /// Sun available at the start of the level. Defaults to 50.
    pub initial_sun: u32,
    /// Upper bound on banked sun. Defaults to 1000.
    pub max_sun: u32,
    /// Per-tick probability that sun falls from the sky. Defaults to 0.01.
    pub ambient_sun_chance: f32,
    /// Sun added by each ambient drop. Defaults to 5.
    pub ambient_sun_amount: u32,
    /// Number of scripted waves. Defaults to 3.
    pub max_waves: u32,
    /// Probability that a zombie spawns armored. Defaults to 0.3.
    pub armor_probability: f32,
    /// Speed multiplier applied to fast zombies. Defaults to 2.5.
    pub fast_speed_multiplier: f32,
    /// Every zombie spawns fast. Defaults to off.
    pub all_fast_zombies: bool,
    /// Probability that a spawned zombie is a giant. Defaults to 0.
    pub giant_chance: f32,
    /// Multiplier applied to zombie health. Defaults to 1.
    pub zombie_health_scale: f32,
    /// Probability that a zombie ignores a hit. Defaults to 0.
    pub zombie_immunity_chance: f32,
    /// Every pea penetrates. Defaults to off.
    pub bullet_penetration: bool,
    /// Per-shot probability that a pea penetrates. Defaults to 0.
    pub random_penetration_chance: f32,
    /// Attack speed multiplier for every plant. Defaults to 1.
    pub plant_speed_multiplier: f32,
    /// Cards cool down after use. Defaults to off.
    pub card_cooldowns: bool,
    /// Maximum number of sunflowers on the lawn. Defaults to unlimited.
    pub sunflower_limit: Option<u32>,
    /// Kills in wave mode drop no sun. Defaults to off.
    pub no_sun_drop_in_wave_mode: bool,
    /// Kills drop 5 or 10 sun at random instead of the fixed amount. Defaults to off.
    pub random_sun_drop: bool,
    /// A lawn cart guards every row. Defaults to on.
    pub carts: bool,
    /// Portal layer, absent when the level has no portals.
    pub portals: Option<PortalConfig>,
    /// Spawn scheduler parameters.
    pub spawning: SpawnTuning,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            field: FieldDimensions::default(),
            initial_sun: 50,
            max_sun: 1000,
            ambient_sun_chance: 0.01,
            ambient_sun_amount: 5,
            max_waves: 3,
            armor_probability: 0.3,
            fast_speed_multiplier: 2.5,
            all_fast_zombies: false,
            giant_chance: 0.0,
            zombie_health_scale: 1.0,
            zombie_immunity_chance: 0.0,
            bullet_penetration: false,
            random_penetration_chance: 0.0,
            plant_speed_multiplier: 1.0,
            card_cooldowns: false,
            sunflower_limit: None,
            no_sun_drop_in_wave_mode: false,
            random_sun_drop: false,
            carts: true,
            portals: None,
            spawning: SpawnTuning::default(),
        }
    }
}

impl LevelConfig {
    /// Checks the configuration for values the simulation cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field.rows == 0 || self.field.columns == 0 {
            return Err(ConfigError::EmptyField);
        }

        let mut probabilities = vec![
            ("ambient_sun_chance", self.ambient_sun_chance),
            ("armor_probability", self.armor_probability),
            ("giant_chance", self.giant_chance),
            ("zombie_immunity_chance", self.zombie_immunity_chance),
            ("random_penetration_chance", self.random_penetration_chance),
        ];
        if let Some(portals) = &self.portals {
            probabilities.push(("teleport_chance", portals.teleport_chance));
        }
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }

        if self.spawning.wave_row_min > self.spawning.wave_row_max {
            return Err(ConfigError::InvertedWaveRange {
                min: self.spawning.wave_row_min,
                max: self.spawning.wave_row_max,
            });
        }

        if let Some(portals) = &self.portals {
            if let Some(&column) = portals
                .columns
                .iter()
                .find(|column| **column >= self.field.columns)
            {
                return Err(ConfigError::PortalColumnOutOfRange {
                    column,
                    columns: self.field.columns,
                });
            }
            if portals.columns.is_empty() || portals.count > self.field.rows {
                return Err(ConfigError::PortalLayoutImpossible);
            }
        }

        Ok(())
    }

    /// Returns a copy with every parameter forced into a usable range.
    ///
    /// Probabilities are clamped to `[0, 1]`, multipliers to positive values,
    /// an empty lawn falls back to the default dimensions, inverted wave ranges
    /// collapse to the minimum, and portal settings that cannot be honoured
    /// disable the portal layer.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        if config.field.rows == 0 || config.field.columns == 0 {
            config.field = FieldDimensions::default();
        }
        config.ambient_sun_chance = clamp_probability(config.ambient_sun_chance);
        config.armor_probability = clamp_probability(config.armor_probability);
        config.giant_chance = clamp_probability(config.giant_chance);
        config.zombie_immunity_chance = clamp_probability(config.zombie_immunity_chance);
        config.random_penetration_chance = clamp_probability(config.random_penetration_chance);
        config.fast_speed_multiplier = positive_or_one(config.fast_speed_multiplier);
        config.zombie_health_scale = positive_or_one(config.zombie_health_scale);
        config.plant_speed_multiplier =
            positive_or_one(config.plant_speed_multiplier).max(MIN_PLANT_SPEED_MULTIPLIER);
        config.spawning.wave_row_max = config
            .spawning
            .wave_row_max
            .max(config.spawning.wave_row_min);

        let columns = config.field.columns;
        let rows = config.field.rows;
        config.portals = config.portals.take().and_then(|mut portals| {
            portals.teleport_chance = clamp_probability(portals.teleport_chance);
            portals.columns.retain(|column| *column < columns);
            if portals.columns.is_empty() || portals.count == 0 || portals.count > rows {
                None
            } else {
                Some(portals)
            }
        });
        config
    }
}

/// Slowest plant speed a level may request; keeps shot delays finite.
const MIN_PLANT_SPEED_MULTIPLIER: f32 = 0.01;

fn clamp_probability(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn positive_or_one(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}
