//! Sun, coins and the cooldowns that gate player actions.

use std::collections::BTreeMap;

use lane_defence_core::{KillCause, LevelConfig, PlacementError, PlantKind};
use rand::Rng;
use serde::{Deserialize, Serialize};

const KILL_SUN: u32 = 20;
const REDUCED_KILL_SUN: u32 = 15;
const RANDOM_KILL_SUN: [u32; 2] = [5, 10];
/// Coin drop table as `(roll below, coins)`, checked in order.
const COIN_TABLE: [(f32, u32); 3] = [(0.01, 10), (0.05, 5), (0.10, 1)];

/// Resources banked by the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Economy {
    sun: u32,
    max_sun: u32,
    coins: u32,
    card_cooldowns: BTreeMap<PlantKind, u32>,
    hammer_cooldown: u32,
}

impl Economy {
    /// Creates the economy a level starts with.
    #[must_use]
    pub fn new(config: &LevelConfig) -> Self {
        Self {
            sun: config.initial_sun.min(config.max_sun),
            max_sun: config.max_sun,
            coins: 0,
            card_cooldowns: BTreeMap::new(),
            hammer_cooldown: 0,
        }
    }

    /// Banked sun.
    #[must_use]
    pub const fn sun(&self) -> u32 {
        self.sun
    }

    /// Coins collected during the level.
    #[must_use]
    pub const fn coins(&self) -> u32 {
        self.coins
    }

    /// Ticks until the hammer can be used again.
    #[must_use]
    pub const fn hammer_cooldown(&self) -> u32 {
        self.hammer_cooldown
    }

    /// Ticks until the plant's card can be used again.
    #[must_use]
    pub fn card_cooldown(&self, kind: PlantKind) -> u32 {
        self.card_cooldowns.get(&kind).copied().unwrap_or(0)
    }

    /// Adds sun up to the cap and returns how much was actually banked.
    pub fn earn(&mut self, amount: u32) -> u32 {
        let banked = amount.min(self.max_sun.saturating_sub(self.sun));
        self.sun += banked;
        banked
    }

    /// Adds coins.
    pub fn collect_coins(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
    }

    /// Checks that `cost` sun is available without spending it.
    pub fn can_afford(&self, cost: u32) -> Result<(), PlacementError> {
        if self.sun < cost {
            return Err(PlacementError::InsufficientSun {
                required: cost,
                available: self.sun,
            });
        }
        Ok(())
    }

    /// Spends sun that was checked with [`Economy::can_afford`].
    pub fn spend(&mut self, cost: u32) {
        self.sun = self.sun.saturating_sub(cost);
    }

    /// Puts the plant's card on cooldown.
    pub fn start_card_cooldown(&mut self, kind: PlantKind, ticks: u32) {
        if ticks > 0 {
            let _ = self.card_cooldowns.insert(kind, ticks);
        }
    }

    /// Puts the hammer on cooldown.
    pub fn start_hammer_cooldown(&mut self, ticks: u32) {
        self.hammer_cooldown = ticks;
    }

    /// Advances every cooldown by one tick.
    pub fn tick(&mut self) {
        self.hammer_cooldown = self.hammer_cooldown.saturating_sub(1);
        for remaining in self.card_cooldowns.values_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        self.card_cooldowns.retain(|_, remaining| *remaining > 0);
    }
}

/// Sun and coins dropped by a defeated zombie.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Loot {
    pub(crate) sun: u32,
    pub(crate) coins: u32,
}

/// Rolls the loot for a kill.
pub(crate) fn roll_loot<R: Rng + ?Sized>(
    config: &LevelConfig,
    cause: KillCause,
    wave_mode: bool,
    rng: &mut R,
) -> Loot {
    let sun = if wave_mode && config.no_sun_drop_in_wave_mode {
        0
    } else if config.random_sun_drop {
        RANDOM_KILL_SUN[rng.gen_range(0..RANDOM_KILL_SUN.len())]
    } else {
        match cause {
            KillCause::Defeated => KILL_SUN,
            KillCause::Spray | KillCause::Hammer => REDUCED_KILL_SUN,
        }
    };

    let roll = rng.gen::<f32>();
    let coins = COIN_TABLE
        .iter()
        .find(|(threshold, _)| roll < *threshold)
        .map_or(0, |(_, coins)| *coins);

    Loot { sun, coins }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn sun_is_capped() {
        let mut config = LevelConfig::default();
        config.max_sun = 100;
        config.initial_sun = 90;
        let mut economy = Economy::new(&config);
        assert_eq!(economy.earn(25), 10);
        assert_eq!(economy.sun(), 100);
    }

    #[test]
    fn spending_requires_enough_sun() {
        let mut economy = Economy::new(&LevelConfig::default());
        assert_eq!(
            economy.can_afford(75),
            Err(PlacementError::InsufficientSun {
                required: 75,
                available: 50,
            })
        );
        assert!(economy.can_afford(50).is_ok());
        economy.spend(50);
        assert_eq!(economy.sun(), 0);
    }

    #[test]
    fn cooldowns_count_down_and_clear() {
        let mut economy = Economy::new(&LevelConfig::default());
        economy.start_card_cooldown(PlantKind::PeaShooter, 2);
        economy.start_hammer_cooldown(1);
        economy.tick();
        assert_eq!(economy.card_cooldown(PlantKind::PeaShooter), 1);
        assert_eq!(economy.hammer_cooldown(), 0);
        economy.tick();
        assert_eq!(economy.card_cooldown(PlantKind::PeaShooter), 0);
    }

    #[test]
    fn loot_depends_on_cause_and_mode() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut config = LevelConfig::default();
        assert_eq!(roll_loot(&config, KillCause::Defeated, false, &mut rng).sun, 20);
        assert_eq!(roll_loot(&config, KillCause::Hammer, false, &mut rng).sun, 15);

        config.no_sun_drop_in_wave_mode = true;
        assert_eq!(roll_loot(&config, KillCause::Defeated, true, &mut rng).sun, 0);
        assert_eq!(roll_loot(&config, KillCause::Defeated, false, &mut rng).sun, 20);

        config.random_sun_drop = true;
        for _ in 0..20 {
            let sun = roll_loot(&config, KillCause::Spray, false, &mut rng).sun;
            assert!(sun == 5 || sun == 10);
        }
    }
}
