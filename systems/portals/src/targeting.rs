//! Portal-aware target selection for row-bound shooters.
//!
//! A shooter first looks for the nearest active portal on its firing side.
//! Zombies between the plant and that portal are ordinary targets. When none
//! are there, zombies standing past the exit of any other active portal count
//! as targets too, since shots crossing the portal come out there.

use lane_defence_core::{CellCoord, PortalId, Zombie};
use lane_defence_system_spatial_index::SpatialIndex;

use crate::{Portal, PortalField};

#[derive(Clone, Copy, Debug)]
struct Candidate {
    distance: f32,
    index: usize,
}

impl Candidate {
    fn precedes(&self, other: &Candidate) -> bool {
        self.distance < other.distance
            || (self.distance == other.distance && self.index < other.index)
    }
}

fn keep_best(best: &mut Option<Candidate>, current: Candidate) {
    match best {
        Some(existing) => {
            if current.precedes(existing) {
                *existing = current;
            }
        }
        None => *best = Some(current),
    }
}

/// Nearest targetable zombie in `row` at or beyond `from`, optionally strictly
/// before `until`. Returns a position in `zombies`.
#[must_use]
pub fn nearest_ahead(
    zombies: &[Zombie],
    index: &SpatialIndex,
    row: u32,
    from: f32,
    until: Option<f32>,
) -> Option<usize> {
    let mut best = None;
    for &position in index.zombies_in_row(row) {
        let Some(zombie) = zombies.get(position) else {
            continue;
        };
        if !zombie.is_targetable() || zombie.col() < from {
            continue;
        }
        if until.is_some_and(|limit| zombie.col() >= limit) {
            continue;
        }
        keep_best(
            &mut best,
            Candidate {
                distance: zombie.col() - from,
                index: position,
            },
        );
    }
    best.map(|candidate| candidate.index)
}

impl PortalField {
    /// Nearest active portal in the origin's row strictly to its firing side.
    #[must_use]
    pub fn entry_ahead(&self, origin: CellCoord) -> Option<&Portal> {
        self.active()
            .filter(|portal| {
                portal.row() == origin.row() && portal.cell().column() > origin.column()
            })
            .min_by_key(|portal| portal.cell().column())
    }

    /// Resolves the zombie a row-bound shooter at `origin` should attack.
    ///
    /// Returns a position in `zombies`, which must be the slice `index` was
    /// last rebuilt from.
    #[must_use]
    pub fn effective_target(
        &self,
        origin: CellCoord,
        zombies: &[Zombie],
        index: &SpatialIndex,
    ) -> Option<usize> {
        let from = origin.column_f32();
        match self.entry_ahead(origin) {
            None => nearest_ahead(zombies, index, origin.row(), from, None),
            Some(entry) => {
                nearest_ahead(zombies, index, origin.row(), from, Some(entry.column()))
                    .or_else(|| self.nearest_beyond_exits(entry.id(), zombies, index))
            }
        }
    }

    /// Whether a portal cuts the origin's line of sight: an active portal lies
    /// ahead in the row and no targetable zombie stands between the plant and it.
    #[must_use]
    pub fn blocks_line_of_sight(
        &self,
        origin: CellCoord,
        zombies: &[Zombie],
        index: &SpatialIndex,
    ) -> bool {
        self.entry_ahead(origin).is_some_and(|entry| {
            nearest_ahead(
                zombies,
                index,
                origin.row(),
                origin.column_f32(),
                Some(entry.column()),
            )
            .is_none()
        })
    }

    /// Column a lobbed shot from `origin` should land on to reach `target`.
    ///
    /// Targets reached through a portal are aimed at the entry portal; with no
    /// target the shot lands on `fallback`.
    #[must_use]
    pub fn landing_column(&self, origin: CellCoord, target: Option<&Zombie>, fallback: f32) -> f32 {
        let Some(target) = target else {
            return fallback;
        };
        match self.entry_ahead(origin) {
            Some(entry) if target.row() != origin.row() || target.col() >= entry.column() => {
                entry.column()
            }
            _ => target.col(),
        }
    }

    fn nearest_beyond_exits(
        &self,
        entry: PortalId,
        zombies: &[Zombie],
        index: &SpatialIndex,
    ) -> Option<usize> {
        let mut best = None;
        for exit in self.active().filter(|portal| portal.id() != entry) {
            let threshold = exit.column();
            for &position in index.zombies_in_row(exit.row()) {
                let Some(zombie) = zombies.get(position) else {
                    continue;
                };
                if !zombie.is_targetable() || zombie.col() <= threshold {
                    continue;
                }
                keep_best(
                    &mut best,
                    Candidate {
                        distance: zombie.col() - threshold,
                        index: position,
                    },
                );
            }
        }
        best.map(|candidate| candidate.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{field_with, zombie};

    fn indexed(zombies: &[Zombie]) -> SpatialIndex {
        let mut index = SpatialIndex::new(5);
        index.rebuild(zombies);
        index
    }

    #[test]
    fn without_portals_targets_nearest_zombie_ahead() {
        let field = field_with(&[]);
        let zombies = vec![zombie(0, 2, 7.0), zombie(1, 2, 4.0), zombie(2, 2, 0.5)];
        let index = indexed(&zombies);
        assert_eq!(
            field.effective_target(CellCoord::new(2, 1), &zombies, &index),
            Some(1)
        );
    }

    #[test]
    fn zombie_before_portal_is_a_normal_target() {
        let field = field_with(&[(2, 6), (4, 5)]);
        let zombies = vec![zombie(0, 2, 3.0), zombie(1, 4, 6.0)];
        let index = indexed(&zombies);
        let origin = CellCoord::new(2, 1);

        assert_eq!(field.effective_target(origin, &zombies, &index), Some(0));
        assert!(!field.blocks_line_of_sight(origin, &zombies, &index));
    }

    #[test]
    fn zombie_past_exit_is_targeted_through_portal() {
        let field = field_with(&[(2, 6), (4, 5)]);
        let zombies = vec![zombie(0, 2, 7.5), zombie(1, 4, 8.0), zombie(2, 4, 6.0)];
        let index = indexed(&zombies);
        let origin = CellCoord::new(2, 1);

        assert!(field.blocks_line_of_sight(origin, &zombies, &index));
        assert_eq!(
            field.effective_target(origin, &zombies, &index),
            Some(2),
            "nearest zombie past the exit wins over one hidden behind the entry"
        );
    }

    #[test]
    fn dying_zombies_are_never_targets() {
        let field = field_with(&[]);
        let mut dying = zombie(0, 0, 2.0);
        dying.defeat();
        let _ = dying.begin_dying();
        let zombies = vec![dying];
        let index = indexed(&zombies);
        assert_eq!(field.effective_target(CellCoord::new(0, 0), &zombies, &index), None);
    }

    #[test]
    fn lobbed_shots_aim_at_entry_portal_for_exit_targets() {
        let field = field_with(&[(2, 6), (4, 5)]);
        let origin = CellCoord::new(2, 1);
        let beyond = zombie(0, 4, 7.0);
        let near = zombie(1, 2, 3.5);

        assert_eq!(field.landing_column(origin, Some(&beyond), 9.0), 6.0);
        assert_eq!(field.landing_column(origin, Some(&near), 9.0), 3.5);
        assert_eq!(field.landing_column(origin, None, 9.0), 9.0);
    }
}
