//! Bookkeeping of issued and cleared waves.

use serde::{Deserialize, Serialize};

/// Progress through the scripted waves of a level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaveProgress {
    current_wave: u32,
    max_waves: u32,
    zombies_in_wave: u32,
    zombies_defeated_in_wave: u32,
    waves_completed: u32,
}

impl WaveProgress {
    /// Creates progress for a level with `max_waves` waves.
    #[must_use]
    pub const fn new(max_waves: u32) -> Self {
        Self {
            current_wave: 0,
            max_waves,
            zombies_in_wave: 0,
            zombies_defeated_in_wave: 0,
            waves_completed: 0,
        }
    }

    /// One-based number of the last issued wave, zero before the first.
    #[must_use]
    pub const fn current_wave(&self) -> u32 {
        self.current_wave
    }

    /// Number of waves the level scripts.
    #[must_use]
    pub const fn max_waves(&self) -> u32 {
        self.max_waves
    }

    /// Zombies issued in the current wave.
    #[must_use]
    pub const fn zombies_in_wave(&self) -> u32 {
        self.zombies_in_wave
    }

    /// Zombies of the current wave defeated so far.
    #[must_use]
    pub const fn zombies_defeated_in_wave(&self) -> u32 {
        self.zombies_defeated_in_wave
    }

    /// Number of waves cleared.
    #[must_use]
    pub const fn waves_completed(&self) -> u32 {
        self.waves_completed
    }

    /// Whether the current wave still has zombies left to defeat.
    #[must_use]
    pub const fn in_flight(&self) -> bool {
        self.zombies_defeated_in_wave < self.zombies_in_wave
    }

    /// Starts tracking a freshly issued wave. Returns `true` when the wave is
    /// empty and therefore cleared on the spot.
    pub fn begin_wave(&mut self, wave: u32, zombies: u32) -> bool {
        self.current_wave = wave;
        self.zombies_in_wave = zombies;
        self.zombies_defeated_in_wave = 0;
        if zombies == 0 {
            self.waves_completed += 1;
            return true;
        }
        false
    }

    /// Counts a defeated wave zombie. Returns the wave number when this kill
    /// cleared it.
    pub fn zombie_defeated(&mut self) -> Option<u32> {
        if !self.in_flight() {
            return None;
        }
        self.zombies_defeated_in_wave += 1;
        if self.in_flight() {
            None
        } else {
            self.waves_completed += 1;
            Some(self.current_wave)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wave_clears_on_last_kill() {
        let mut progress = WaveProgress::new(3);
        assert!(!progress.begin_wave(1, 2));
        assert!(progress.in_flight());
        assert_eq!(progress.zombie_defeated(), None);
        assert_eq!(progress.zombie_defeated(), Some(1));
        assert!(!progress.in_flight());
        assert_eq!(progress.zombie_defeated(), None, "stray kills are ignored");
        assert_eq!(progress.waves_completed(), 1);
    }

    #[test]
    fn empty_wave_is_cleared_immediately() {
        let mut progress = WaveProgress::new(1);
        assert!(progress.begin_wave(1, 0));
        assert_eq!(progress.waves_completed(), 1);
    }
}
