//! Periodic healing pulses for plants.

use std::collections::BTreeMap;

use lane_defence_core::PlantId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct HealingEntry {
    remaining: u32,
    pulse: u32,
}

/// Healing countdowns keyed by plant handle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealingTable {
    interval: u32,
    entries: BTreeMap<PlantId, HealingEntry>,
}

impl HealingTable {
    /// Creates a table that pulses every `interval` ticks.
    #[must_use]
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            entries: BTreeMap::new(),
        }
    }

    /// Heals the plant on every pulse for the next `duration` ticks.
    pub fn start(&mut self, plant: PlantId, duration: u32) {
        let entry = self.entries.entry(plant).or_insert(HealingEntry {
            remaining: 0,
            pulse: 0,
        });
        entry.remaining = entry.remaining.max(duration);
    }

    /// Whether the plant is being healed.
    #[must_use]
    pub fn is_healing(&self, plant: PlantId) -> bool {
        self.entries.contains_key(&plant)
    }

    /// Advances every countdown and appends the plants due a pulse to `pulses`.
    pub fn tick(&mut self, pulses: &mut Vec<PlantId>) {
        let interval = self.interval;
        for (plant, entry) in &mut self.entries {
            entry.remaining = entry.remaining.saturating_sub(1);
            entry.pulse += 1;
            if entry.pulse >= interval {
                entry.pulse = 0;
                pulses.push(*plant);
            }
        }
        self.entries.retain(|_, entry| entry.remaining > 0);
    }

    /// Drops the countdown of a removed plant.
    pub fn remove(&mut self, plant: PlantId) {
        let _ = self.entries.remove(&plant);
    }

    /// Drops every countdown whose plant no longer exists.
    pub fn prune(&mut self, mut is_live: impl FnMut(PlantId) -> bool) {
        self.entries.retain(|plant, _| is_live(*plant));
    }

    /// Number of plants being healed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no plant is being healed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
