#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timed status conditions keyed by entity handle.
//!
//! [`StatusTable`] stores stun, spray and freeze countdowns plus the
//! marked-for-death flag for zombies. It is advisory storage: the world checks
//! [`StatusTable::is_stunned`] before running a zombie's think step and mirrors
//! the flags onto each zombie at the start of a tick. Lookups for handles that
//! have no entry, including handles of removed zombies, report "no effect".
//!
//! [`HealingTable`] drives the periodic healing pulses that follow a
//! full-field detonation.

mod healing;

use std::collections::BTreeMap;

use lane_defence_core::{StatusFlags, ZombieId};
use serde::{Deserialize, Serialize};

pub use healing::HealingTable;

/// Countdown timers attached to a single zombie.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct StatusEntry {
    stun: u32,
    spray: u32,
    freeze: u32,
    marked_for_death: bool,
}

impl StatusEntry {
    const fn is_idle(&self) -> bool {
        self.stun == 0 && self.spray == 0 && self.freeze == 0
    }

    const fn flags(&self) -> StatusFlags {
        StatusFlags {
            stunned: self.stun > 0,
            spraying: self.spray > 0,
            frozen: self.freeze > 0,
        }
    }
}

/// Status timers for every affected zombie.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusTable {
    entries: BTreeMap<ZombieId, StatusEntry>,
}

impl StatusTable {
    /// Creates an empty status table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stuns the zombie for at least `duration` ticks.
    pub fn set_stun(&mut self, zombie: ZombieId, duration: u32) {
        let entry = self.entries.entry(zombie).or_default();
        entry.stun = entry.stun.max(duration);
    }

    /// Sprays the zombie for at least `duration` ticks.
    pub fn set_spray(&mut self, zombie: ZombieId, duration: u32) {
        let entry = self.entries.entry(zombie).or_default();
        entry.spray = entry.spray.max(duration);
    }

    /// Freezes the zombie for at least `duration` ticks.
    pub fn set_freeze(&mut self, zombie: ZombieId, duration: u32) {
        let entry = self.entries.entry(zombie).or_default();
        entry.freeze = entry.freeze.max(duration);
    }

    /// Marks the zombie to die once its spray expires.
    ///
    /// The mark is dropped together with the entry if no timer is running when
    /// the table is next ticked.
    pub fn mark_for_death(&mut self, zombie: ZombieId) {
        self.entries.entry(zombie).or_default().marked_for_death = true;
    }

    /// Whether the zombie is stunned.
    #[must_use]
    pub fn is_stunned(&self, zombie: ZombieId) -> bool {
        self.entries.get(&zombie).is_some_and(|entry| entry.stun > 0)
    }

    /// Whether the zombie is sprayed.
    #[must_use]
    pub fn is_spraying(&self, zombie: ZombieId) -> bool {
        self.entries.get(&zombie).is_some_and(|entry| entry.spray > 0)
    }

    /// Whether the zombie is frozen.
    #[must_use]
    pub fn is_frozen(&self, zombie: ZombieId) -> bool {
        self.entries.get(&zombie).is_some_and(|entry| entry.freeze > 0)
    }

    /// Flags to mirror onto the zombie, all clear when it has no entry.
    #[must_use]
    pub fn flags(&self, zombie: ZombieId) -> StatusFlags {
        self.entries
            .get(&zombie)
            .map_or_else(StatusFlags::default, StatusEntry::flags)
    }

    /// Decrements every running timer by one tick.
    ///
    /// Zombies whose spray ran out this tick while marked for death are
    /// appended to `doomed` in handle order. Entries with no running timer
    /// left are discarded.
    pub fn tick(&mut self, doomed: &mut Vec<ZombieId>) {
        for (zombie, entry) in &mut self.entries {
            entry.stun = entry.stun.saturating_sub(1);
            entry.freeze = entry.freeze.saturating_sub(1);
            if entry.spray > 0 {
                entry.spray -= 1;
                if entry.spray == 0 && entry.marked_for_death {
                    entry.marked_for_death = false;
                    doomed.push(*zombie);
                }
            }
        }
        self.entries.retain(|_, entry| !entry.is_idle());
    }

    /// Drops the entry of a removed zombie.
    pub fn remove(&mut self, zombie: ZombieId) {
        let _ = self.entries.remove(&zombie);
    }

    /// Drops every entry whose zombie no longer exists.
    pub fn prune(&mut self, mut is_live: impl FnMut(ZombieId) -> bool) {
        self.entries.retain(|zombie, _| is_live(*zombie));
    }

    /// Number of zombies with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no zombie has an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
