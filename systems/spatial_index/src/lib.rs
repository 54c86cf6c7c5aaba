#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Row-bucketed index over the zombies on the lawn.
//!
//! The index stores positions into the caller's zombie slice rather than
//! copies, so it must be rebuilt whenever that slice changes shape. The world
//! rebuilds it once before the think steps and once before combat resolution.

use lane_defence_core::Zombie;

/// Buckets zombie indices by lane for row-scoped queries.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    rows: Vec<Vec<usize>>,
}

impl SpatialIndex {
    /// Creates an empty index covering the given number of rows.
    #[must_use]
    pub fn new(rows: u32) -> Self {
        Self {
            rows: vec![Vec::new(); rows as usize],
        }
    }

    /// Clears every bucket and re-buckets the provided zombies by row.
    ///
    /// Zombies on rows outside the index are skipped. Bucket storage is reused
    /// between rebuilds.
    pub fn rebuild(&mut self, zombies: &[Zombie]) {
        for bucket in &mut self.rows {
            bucket.clear();
        }

        for (index, zombie) in zombies.iter().enumerate() {
            if let Some(bucket) = self.rows.get_mut(zombie.row() as usize) {
                bucket.push(index);
            }
        }
    }

    /// Positions of the zombies in `row`, in insertion order.
    ///
    /// Rows outside the index yield an empty slice.
    #[must_use]
    pub fn zombies_in_row(&self, row: u32) -> &[usize] {
        self.rows
            .get(row as usize)
            .map_or(&[][..], |bucket| bucket.as_slice())
    }

    /// Total number of indexed zombies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Reports whether the index holds no zombies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{ZombieBlueprint, ZombieId, ZombieKind, ZombieTuning};

    fn zombie(id: u32, row: u32, col: f32) -> Zombie {
        Zombie::spawn(
            ZombieId::new(id),
            ZombieBlueprint::plain(ZombieKind::Normal),
            row,
            col,
            ZombieTuning::default(),
        )
    }

    #[test]
    fn buckets_zombies_by_row_in_insertion_order() {
        let zombies = vec![
            zombie(0, 1, 8.0),
            zombie(1, 3, 7.0),
            zombie(2, 1, 4.5),
            zombie(3, 0, 2.0),
        ];
        let mut index = SpatialIndex::new(5);
        index.rebuild(&zombies);

        assert_eq!(index.zombies_in_row(1), &[0, 2]);
        assert_eq!(index.zombies_in_row(3), &[1]);
        assert_eq!(index.zombies_in_row(0), &[3]);
        assert!(index.zombies_in_row(2).is_empty());
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn out_of_range_rows_are_empty() {
        let mut index = SpatialIndex::new(5);
        index.rebuild(&[zombie(0, 4, 1.0)]);
        assert!(index.zombies_in_row(5).is_empty());
        assert!(index.zombies_in_row(u32::MAX).is_empty());
    }

    #[test]
    fn rebuild_discards_previous_contents() {
        let mut index = SpatialIndex::new(3);
        index.rebuild(&[zombie(0, 2, 1.0), zombie(1, 2, 2.0)]);
        index.rebuild(&[zombie(5, 0, 1.0)]);
        assert!(index.zombies_in_row(2).is_empty());
        assert_eq!(index.zombies_in_row(0), &[0]);
    }

    #[test]
    fn zombies_outside_the_lawn_are_not_indexed() {
        let mut index = SpatialIndex::new(2);
        index.rebuild(&[zombie(0, 7, 1.0)]);
        assert!(index.is_empty());
    }
}
