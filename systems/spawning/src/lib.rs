#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawn scheduler deciding when zombies enter the lawn.
//!
//! A level starts in [`SpawnMode::NormalTrickle`], where single zombies enter
//! on a fixed interval. Once enough trickle zombies were defeated the
//! scheduler switches to [`SpawnMode::WaveMode`] for good and issues scripted
//! waves whenever the previous one has been cleared. The scheduler never
//! decides whether the level is over; it only decides what to inject.

mod roster;

pub use roster::ZombieRoster;

use lane_defence_core::{LevelConfig, SpawnMode, SpawnTuning, ZombieBlueprint};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Placement of a single zombie requested by the scheduler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnOrder {
    /// Lane the zombie enters.
    pub row: u32,
    /// Distance past the entry column the zombie starts at.
    pub column_offset: f32,
    /// Rolled attributes of the zombie.
    pub blueprint: ZombieBlueprint,
}

/// Decisions emitted by a scheduler tick, in the order they must be applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnDirective {
    /// The scheduler switched to wave mode.
    EnterWaveMode,
    /// A wave was issued; its zombies follow as [`SpawnDirective::Zombie`].
    Wave {
        /// One-based wave number.
        wave: u32,
        /// Number of zombies in the wave.
        zombies: u32,
        /// Set for the first wave of the level.
        first: bool,
    },
    /// A zombie should be created.
    Zombie(SpawnOrder),
}

/// World facts the scheduler reads each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpawnContext {
    /// Trickle zombies defeated so far.
    pub pre_wave_kills: u32,
    /// Zombies currently on the lawn, dying ones included.
    pub population: u32,
    /// Whether the last issued wave still has zombies left to defeat.
    pub wave_in_flight: bool,
}

/// Trickle/wave state machine of a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnScheduler {
    tuning: SpawnTuning,
    roster: ZombieRoster,
    rows: u32,
    max_waves: u32,
    mode: SpawnMode,
    trickle_timer: u32,
    wave_timer: u32,
    trickle_spawned: u32,
    waves_issued: u32,
}

impl SpawnScheduler {
    /// Creates a scheduler for the level.
    #[must_use]
    pub fn new(config: &LevelConfig) -> Self {
        Self {
            tuning: config.spawning,
            roster: ZombieRoster::from_config(config),
            rows: config.field.rows,
            max_waves: config.max_waves,
            mode: SpawnMode::NormalTrickle,
            trickle_timer: 0,
            wave_timer: 0,
            trickle_spawned: 0,
            waves_issued: 0,
        }
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> SpawnMode {
        self.mode
    }

    /// Whether the scheduler reached wave mode.
    #[must_use]
    pub fn is_wave_mode(&self) -> bool {
        self.mode == SpawnMode::WaveMode
    }

    /// Number of waves issued so far.
    #[must_use]
    pub const fn waves_issued(&self) -> u32 {
        self.waves_issued
    }

    /// Number of waves the level scripts.
    #[must_use]
    pub const fn max_waves(&self) -> u32 {
        self.max_waves
    }

    /// Whether every scripted wave has been issued.
    #[must_use]
    pub const fn all_waves_issued(&self) -> bool {
        self.waves_issued >= self.max_waves
    }

    #[cfg(test)]
    pub(crate) const fn trickle_spawned(&self) -> u32 {
        self.trickle_spawned
    }

    /// Trickle kills needed before waves start.
    #[must_use]
    pub const fn wave_threshold(&self) -> u32 {
        self.max_waves.saturating_mul(self.tuning.kills_per_wave)
    }

    /// Advances the scheduler by one tick.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        context: SpawnContext,
        rng: &mut R,
        out: &mut Vec<SpawnDirective>,
    ) {
        match self.mode {
            SpawnMode::NormalTrickle => {
                if context.pre_wave_kills >= self.wave_threshold() {
                    self.mode = SpawnMode::WaveMode;
                    self.wave_timer = 0;
                    info!(kills = context.pre_wave_kills, "wave mode entered");
                    out.push(SpawnDirective::EnterWaveMode);
                    return;
                }
                self.trickle(context, rng, out);
            }
            SpawnMode::WaveMode => self.waves(context, rng, out),
        }
    }

    fn trickle<R: Rng + ?Sized>(
        &mut self,
        context: SpawnContext,
        rng: &mut R,
        out: &mut Vec<SpawnDirective>,
    ) {
        self.trickle_timer += 1;
        if self.trickle_timer < self.tuning.trickle_interval {
            return;
        }
        self.trickle_timer = 0;

        if self.rows == 0
            || context.population >= self.tuning.population_cap
            || self.trickle_spawned >= self.tuning.max_trickle_spawns
        {
            return;
        }

        self.trickle_spawned += 1;
        let row = rng.gen_range(0..self.rows);
        out.push(SpawnDirective::Zombie(SpawnOrder {
            row,
            column_offset: 0.0,
            blueprint: self.roster.trickle(rng),
        }));
    }

    fn waves<R: Rng + ?Sized>(
        &mut self,
        context: SpawnContext,
        rng: &mut R,
        out: &mut Vec<SpawnDirective>,
    ) {
        if self.all_waves_issued() {
            return;
        }
        self.wave_timer += 1;
        if self.wave_timer < self.tuning.wave_interval || context.wave_in_flight {
            return;
        }
        self.wave_timer = 0;

        let (low, high) = (
            self.tuning.wave_row_min.min(self.tuning.wave_row_max),
            self.tuning.wave_row_min.max(self.tuning.wave_row_max),
        );
        let counts: Vec<u32> = (0..self.rows).map(|_| rng.gen_range(low..=high)).collect();

        let mut orders = Vec::new();
        self.plan_wave(&counts, rng, &mut orders);

        self.waves_issued += 1;
        let first = self.waves_issued == 1;
        info!(
            wave = self.waves_issued,
            zombies = orders.len(),
            "wave issued"
        );
        out.push(SpawnDirective::Wave {
            wave: self.waves_issued,
            zombies: orders.len() as u32,
            first,
        });
        out.extend(orders.into_iter().map(SpawnDirective::Zombie));
    }

    /// Lays out a wave with `row_counts[row]` zombies in each row.
    ///
    /// Zombies sharing a row are staggered by the configured column spacing,
    /// and one zombie per non-empty row is the row's fast runner.
    pub fn plan_wave<R: Rng + ?Sized>(
        &self,
        row_counts: &[u32],
        rng: &mut R,
        out: &mut Vec<SpawnOrder>,
    ) {
        for (row, &count) in row_counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let runner = rng.gen_range(0..count);
            for slot in 0..count {
                out.push(SpawnOrder {
                    row: row as u32,
                    column_offset: slot as f32 * self.tuning.wave_column_stagger,
                    blueprint: self.roster.wave(rng, slot == runner),
                });
            }
            debug!(row, count, "wave row planned");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn quick_config() -> LevelConfig {
        let mut config = LevelConfig::default();
        config.spawning.trickle_interval = 2;
        config.spawning.wave_interval = 3;
        config
    }

    #[test]
    fn trickle_respects_interval_and_population_cap() {
        let mut scheduler = SpawnScheduler::new(&quick_config());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut out = Vec::new();

        scheduler.tick(SpawnContext::default(), &mut rng, &mut out);
        assert!(out.is_empty());
        scheduler.tick(SpawnContext::default(), &mut rng, &mut out);
        assert_eq!(out.len(), 1);

        let crowded = SpawnContext {
            population: 10,
            ..SpawnContext::default()
        };
        for _ in 0..10 {
            scheduler.tick(crowded, &mut rng, &mut out);
        }
        assert_eq!(out.len(), 1, "population cap pauses the trickle");
        assert_eq!(scheduler.trickle_spawned(), 1);
    }

    #[test]
    fn trickle_stops_at_level_limit() {
        let mut config = quick_config();
        config.spawning.max_trickle_spawns = 3;
        let mut scheduler = SpawnScheduler::new(&config);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut out = Vec::new();
        for _ in 0..40 {
            scheduler.tick(SpawnContext::default(), &mut rng, &mut out);
        }
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn wave_mode_waits_for_the_previous_wave() {
        let mut scheduler = SpawnScheduler::new(&quick_config());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut out = Vec::new();
        let kills = SpawnContext {
            pre_wave_kills: 15,
            ..SpawnContext::default()
        };
        scheduler.tick(kills, &mut rng, &mut out);
        assert_eq!(out, vec![SpawnDirective::EnterWaveMode]);

        out.clear();
        let busy = SpawnContext {
            wave_in_flight: true,
            ..kills
        };
        for _ in 0..10 {
            scheduler.tick(busy, &mut rng, &mut out);
        }
        assert!(out.is_empty());

        scheduler.tick(kills, &mut rng, &mut out);
        match out.first() {
            Some(SpawnDirective::Wave { wave, zombies, first }) => {
                assert_eq!(*wave, 1);
                assert!(*first);
                assert!((15..=20).contains(zombies));
                assert_eq!(out.len() as u32, zombies + 1);
            }
            other => panic!("expected a wave, got {other:?}"),
        }
    }

    #[test]
    fn planned_wave_has_one_runner_per_row_and_distinct_offsets() {
        let scheduler = SpawnScheduler::new(&LevelConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut orders = Vec::new();
        scheduler.plan_wave(&[3, 4, 3, 4, 3], &mut rng, &mut orders);

        assert_eq!(orders.len(), 17);
        for row in 0..5 {
            let lane: Vec<&SpawnOrder> = orders.iter().filter(|order| order.row == row).collect();
            let runners = lane.iter().filter(|order| order.blueprint.fast).count();
            assert_eq!(runners, 1, "row {row} needs exactly one runner");
            for (slot, order) in lane.iter().enumerate() {
                assert!((order.column_offset - slot as f32 * 0.3).abs() < 1e-6);
                assert!(order.blueprint.wave);
            }
        }
    }
}
