//! Per-level rolls that turn a spawn slot into a zombie blueprint.

use lane_defence_core::{LevelConfig, ZombieBlueprint, ZombieKind};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Probabilities used to dress up freshly spawned zombies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZombieRoster {
    /// Probability that a zombie carries armor.
    pub armor_probability: f32,
    /// Probability that a zombie is a giant.
    pub giant_chance: f32,
    /// Every zombie spawns fast.
    pub all_fast: bool,
}

impl ZombieRoster {
    /// Extracts the roster from a level configuration.
    #[must_use]
    pub fn from_config(config: &LevelConfig) -> Self {
        Self {
            armor_probability: config.armor_probability,
            giant_chance: config.giant_chance,
            all_fast: config.all_fast_zombies,
        }
    }

    /// Rolls a trickle zombie.
    pub fn trickle<R: Rng + ?Sized>(&self, rng: &mut R) -> ZombieBlueprint {
        ZombieBlueprint {
            kind: self.kind(rng),
            armored: roll(rng, self.armor_probability),
            fast: self.all_fast,
            wave: false,
        }
    }

    /// Rolls a wave zombie. `fast` marks the row's designated runner.
    pub fn wave<R: Rng + ?Sized>(&self, rng: &mut R, fast: bool) -> ZombieBlueprint {
        ZombieBlueprint {
            kind: self.kind(rng),
            armored: roll(rng, self.armor_probability),
            fast: fast || self.all_fast,
            wave: true,
        }
    }

    fn kind<R: Rng + ?Sized>(&self, rng: &mut R) -> ZombieKind {
        if roll(rng, self.giant_chance) {
            ZombieKind::Giant
        } else {
            ZombieKind::Normal
        }
    }
}

impl Default for ZombieRoster {
    fn default() -> Self {
        Self::from_config(&LevelConfig::default())
    }
}

fn roll<R: Rng + ?Sized>(rng: &mut R, probability: f32) -> bool {
    probability > 0.0 && rng.gen::<f32>() < probability
}
