#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Teleport portals that rewrite lane adjacency for movement and targeting.
//!
//! The field keeps a fixed number of portals on distinct rows. Every
//! relocation interval one active portal fades out while a replacement
//! materializes on a row no other portal occupies, so at most one portal is
//! missing from the active set at any time. Portal-aware targeting lives in
//! the [`targeting`] module.

pub mod targeting;

use lane_defence_core::{CellCoord, Event, PortalConfig, PortalId, Zombie};
use rand::{seq::index, Rng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Half-width of the cell band in which a zombie counts as standing on a portal.
const CONTACT_RANGE: f32 = 0.5;

/// Lifecycle phase of a portal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortalPhase {
    /// Materializing; not yet usable.
    Spawning {
        /// Ticks until the portal becomes active.
        remaining: u32,
    },
    /// Teleports zombies and relays shots.
    Active,
    /// Fading out; removed once the countdown ends.
    Despawning {
        /// Ticks until the portal disappears.
        remaining: u32,
    },
}

/// A single portal on the lawn.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Portal {
    id: PortalId,
    cell: CellCoord,
    phase: PortalPhase,
}

impl Portal {
    /// Identifier of the portal.
    #[must_use]
    pub const fn id(&self) -> PortalId {
        self.id
    }

    /// Cell the portal occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Row of the portal.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.cell.row()
    }

    /// Column of the portal in continuous lawn units.
    #[must_use]
    pub fn column(&self) -> f32 {
        self.cell.column_f32()
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> PortalPhase {
        self.phase
    }

    /// Whether the portal teleports zombies and relays shots.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.phase, PortalPhase::Active)
    }

    /// Whether the portal blocks planting on its cell.
    #[must_use]
    pub const fn occupies_cell(&self) -> bool {
        !matches!(self.phase, PortalPhase::Despawning { .. })
    }

    fn touches(&self, zombie: &Zombie) -> bool {
        self.row() == zombie.row() && (zombie.col() - self.column()).abs() < CONTACT_RANGE
    }
}

/// Entry and exit of a completed teleport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Teleport {
    /// Portal the zombie stepped on.
    pub from: PortalId,
    /// Portal the zombie came out of.
    pub to: PortalId,
}

/// Every portal on the lawn together with the relocation clock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortalField {
    config: PortalConfig,
    rows: u32,
    portals: Vec<Portal>,
    switch_timer: u32,
    next_id: u32,
    initialized: bool,
}

impl PortalField {
    /// Creates an empty field for a lawn with the given number of rows.
    #[must_use]
    pub fn new(config: PortalConfig, rows: u32) -> Self {
        Self {
            config,
            rows,
            portals: Vec::new(),
            switch_timer: 0,
            next_id: 0,
            initialized: false,
        }
    }

    /// Places the initial portals on distinct random rows.
    ///
    /// Does nothing once the field was initialized, which lets restored fields
    /// skip the one-shot placement.
    pub fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R, out: &mut Vec<Event>) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        let count = self.config.count.min(self.rows) as usize;
        if count == 0 || self.config.columns.is_empty() {
            return;
        }

        let rows = index::sample(rng, self.rows as usize, count).into_vec();
        for row in rows {
            let column = self.pick_column(rng);
            let _ = self.spawn(CellCoord::new(row as u32, column), out);
        }
    }

    /// Configuration the field was built from.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Every portal regardless of phase.
    #[must_use]
    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }

    /// Portals that currently teleport zombies.
    pub fn active(&self) -> impl Iterator<Item = &Portal> + '_ {
        self.portals.iter().filter(|portal| portal.is_active())
    }

    /// Number of active portals.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Advances every portal's lifecycle clock and relocates one active portal
    /// whenever the switch interval elapses.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R, out: &mut Vec<Event>) {
        for portal in &mut self.portals {
            portal.phase = match portal.phase {
                PortalPhase::Spawning { remaining } if remaining <= 1 => PortalPhase::Active,
                PortalPhase::Spawning { remaining } => PortalPhase::Spawning {
                    remaining: remaining - 1,
                },
                PortalPhase::Despawning { remaining } => PortalPhase::Despawning {
                    remaining: remaining.saturating_sub(1),
                },
                PortalPhase::Active => PortalPhase::Active,
            };
        }
        self.portals
            .retain(|portal| portal.phase != PortalPhase::Despawning { remaining: 0 });

        if self.config.switch_interval == 0 {
            return;
        }
        self.switch_timer += 1;
        if self.switch_timer >= self.config.switch_interval {
            self.switch_timer = 0;
            self.relocate(rng, out);
        }
    }

    /// Portal occupying the given cell, in any phase.
    #[must_use]
    pub fn portal_at(&self, row: u32, column: u32) -> Option<&Portal> {
        let cell = CellCoord::new(row, column);
        self.portals.iter().find(|portal| portal.cell == cell)
    }

    /// Whether a plant may be placed on the cell.
    #[must_use]
    pub fn can_place(&self, cell: CellCoord) -> bool {
        !self
            .portals
            .iter()
            .any(|portal| portal.cell == cell && portal.occupies_cell())
    }

    /// Active portal the zombie is standing on.
    #[must_use]
    pub fn contact(&self, zombie: &Zombie) -> Option<&Portal> {
        self.active().find(|portal| portal.touches(zombie))
    }

    /// Active portal a zombie or shot leaving `entry` comes out of.
    ///
    /// With more than two portals the first other active portal in placement
    /// order is used.
    #[must_use]
    pub fn exit_for(&self, entry: PortalId) -> Option<&Portal> {
        self.active().find(|portal| portal.id != entry)
    }

    /// Active portal in `row` whose column lies in `(from, to]`.
    #[must_use]
    pub fn crossed(&self, row: u32, from: f32, to: f32) -> Option<&Portal> {
        self.active()
            .find(|portal| portal.row() == row && portal.column() > from && portal.column() <= to)
    }

    /// Moves a zombie standing on an active portal to another active portal.
    ///
    /// The teleport chance is rolled by the caller; this only performs the
    /// move. Returns `None` when the zombie is not on an active portal or no
    /// other portal is active.
    pub fn teleport<R: Rng + ?Sized>(&self, zombie: &mut Zombie, rng: &mut R) -> Option<Teleport> {
        let entry = self.contact(zombie)?;
        let exits = self.active().filter(|portal| portal.id != entry.id).count();
        let pick = match exits {
            0 => return None,
            1 => 0,
            n => rng.gen_range(0..n),
        };
        let exit = self
            .active()
            .filter(|portal| portal.id != entry.id)
            .nth(pick)?;

        zombie.relocate(exit.row(), exit.column());
        zombie.set_portal_contact(Some(exit.id));
        debug!(
            zombie = zombie.id().get(),
            from = entry.id.get(),
            to = exit.id.get(),
            "zombie teleported"
        );
        Some(Teleport {
            from: entry.id,
            to: exit.id,
        })
    }

    fn relocate<R: Rng + ?Sized>(&mut self, rng: &mut R, out: &mut Vec<Event>) {
        let active: Vec<usize> = self
            .portals
            .iter()
            .enumerate()
            .filter(|(_, portal)| portal.is_active())
            .map(|(index, _)| index)
            .collect();
        if active.is_empty() {
            return;
        }

        let retiring = active[rng.gen_range(0..active.len())];
        let retired_id = self.portals[retiring].id;
        let free_rows: Vec<u32> = (0..self.rows)
            .filter(|row| {
                !self
                    .portals
                    .iter()
                    .any(|portal| portal.id != retired_id && portal.row() == *row)
            })
            .collect();
        if free_rows.is_empty() {
            debug!(portal = retired_id.get(), "no free row for replacement portal");
            return;
        }

        self.portals[retiring].phase = PortalPhase::Despawning {
            remaining: self.config.despawn_duration,
        };
        out.push(Event::PortalRetired { portal: retired_id });

        let row = free_rows[rng.gen_range(0..free_rows.len())];
        let column = self.pick_column(rng);
        let spawned = self.spawn(CellCoord::new(row, column), out);
        debug!(
            retired = retired_id.get(),
            spawned = spawned.get(),
            row,
            column,
            "portal relocated"
        );
    }

    fn pick_column<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let columns = &self.config.columns;
        columns[rng.gen_range(0..columns.len())]
    }

    fn spawn(&mut self, cell: CellCoord, out: &mut Vec<Event>) -> PortalId {
        let id = PortalId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let phase = if self.config.spawn_duration == 0 {
            PortalPhase::Active
        } else {
            PortalPhase::Spawning {
                remaining: self.config.spawn_duration,
            }
        };
        self.portals.push(Portal { id, cell, phase });
        out.push(Event::PortalSpawned { portal: id, cell });
        id
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use lane_defence_core::{
        CellCoord, PortalConfig, PortalId, Zombie, ZombieBlueprint, ZombieId, ZombieKind,
        ZombieTuning,
    };

    use super::{Portal, PortalField, PortalPhase};

    pub(crate) fn field_with(cells: &[(u32, u32)]) -> PortalField {
        let mut field = PortalField::new(PortalConfig::default(), 5);
        field.initialized = true;
        for (index, (row, column)) in cells.iter().enumerate() {
            field.portals.push(Portal {
                id: PortalId::new(index as u32),
                cell: CellCoord::new(*row, *column),
                phase: PortalPhase::Active,
            });
        }
        field.next_id = cells.len() as u32;
        field
    }

    pub(crate) fn zombie(id: u32, row: u32, col: f32) -> Zombie {
        Zombie::spawn(
            ZombieId::new(id),
            ZombieBlueprint::plain(ZombieKind::Normal),
            row,
            col,
            ZombieTuning::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{field_with, zombie};
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn initialization_uses_distinct_rows_and_configured_columns() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut field = PortalField::new(PortalConfig::default(), 5);
        let mut events = Vec::new();
        field.initialize(&mut rng, &mut events);

        assert_eq!(field.portals().len(), 2);
        assert_ne!(field.portals()[0].row(), field.portals()[1].row());
        for portal in field.portals() {
            assert!((4..=8).contains(&portal.cell().column()));
            assert!(!portal.is_active(), "portals start materializing");
        }
        assert_eq!(events.len(), 2);

        field.initialize(&mut rng, &mut events);
        assert_eq!(field.portals().len(), 2, "initialization runs once");
    }

    #[test]
    fn portals_activate_after_spawn_duration() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut field = PortalField::new(PortalConfig::default(), 5);
        let mut events = Vec::new();
        field.initialize(&mut rng, &mut events);
        for _ in 0..59 {
            field.update(&mut rng, &mut events);
        }
        assert_eq!(field.active_count(), 0);
        field.update(&mut rng, &mut events);
        assert_eq!(field.active_count(), 2);
    }

    #[test]
    fn relocation_keeps_two_portals_active_outside_spawn_windows() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut field = PortalField::new(PortalConfig::default(), 5);
        let mut events = Vec::new();
        field.initialize(&mut rng, &mut events);

        let mut relocations = 0;
        for _ in 0..6000 {
            events.clear();
            field.update(&mut rng, &mut events);
            relocations += events
                .iter()
                .filter(|event| matches!(event, Event::PortalRetired { .. }))
                .count();

            let spawning = field
                .portals()
                .iter()
                .any(|portal| matches!(portal.phase(), PortalPhase::Spawning { .. }));
            if !spawning {
                assert!(field.active_count() >= 2, "portal missing: {:?}", field.portals());
            }

            let mut rows: Vec<u32> = field
                .portals()
                .iter()
                .filter(|portal| portal.occupies_cell())
                .map(Portal::row)
                .collect();
            let occupied = rows.len();
            rows.sort_unstable();
            rows.dedup();
            assert_eq!(rows.len(), occupied, "two live portals share a row");
        }
        assert_eq!(relocations, 5);
    }

    #[test]
    fn relocation_without_a_free_row_keeps_the_portal() {
        let mut field = field_with(&[(0, 5), (0, 7)]);
        field.rows = 1;
        field.config.switch_interval = 1;
        field.portals[1].phase = PortalPhase::Despawning { remaining: 10 };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut events = Vec::new();

        field.update(&mut rng, &mut events);
        assert!(field.portals()[0].is_active());
        assert!(events.is_empty(), "nothing retired without a replacement row");
    }

    #[test]
    fn zombie_on_portal_teleports_to_partner() {
        let field = field_with(&[(1, 6), (3, 5)]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut walker = zombie(9, 1, 6.2);

        let teleport = field.teleport(&mut walker, &mut rng);
        assert_eq!(
            teleport,
            Some(Teleport {
                from: PortalId::new(0),
                to: PortalId::new(1),
            })
        );
        assert_eq!(walker.row(), 3);
        assert_eq!(walker.col(), 5.0);
        assert_eq!(walker.portal_contact(), Some(PortalId::new(1)));
    }

    #[test]
    fn zombie_off_portal_stays_put() {
        let field = field_with(&[(1, 6), (3, 5)]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut walker = zombie(9, 1, 6.6);
        assert_eq!(field.teleport(&mut walker, &mut rng), None);
        assert_eq!((walker.row(), walker.col()), (1, 6.6));
    }

    #[test]
    fn planting_is_blocked_on_portal_cells() {
        let field = field_with(&[(2, 7)]);
        assert!(!field.can_place(CellCoord::new(2, 7)));
        assert!(field.can_place(CellCoord::new(2, 6)));
        assert!(field.portal_at(2, 7).is_some());
        assert!(field.portal_at(0, 0).is_none());
    }

    #[test]
    fn crossing_detects_portal_between_positions() {
        let field = field_with(&[(0, 5)]);
        assert!(field.crossed(0, 4.95, 5.04).is_some());
        assert!(field.crossed(0, 5.0, 5.09).is_none());
        assert!(field.crossed(1, 4.95, 5.04).is_none());
    }
}
