//! Player commands. Every handler validates first and mutates only once the
//! request is known to succeed.

use lane_defence_core::{
    AttackProfile, CellCoord, Event, KillCause, PlacementError, Plant, PlantId, PlantKind,
    PlantRemoval, ShotCadence, ToolError, Zombie, HAMMER_COOLDOWN_TICKS,
};
use rand::Rng;
use tracing::{debug, info};

use crate::World;

impl World {
    pub(crate) fn place_plant(
        &mut self,
        kind: PlantKind,
        cell: CellCoord,
        out: &mut Vec<Event>,
    ) -> Result<PlantId, PlacementError> {
        if !self.is_running() {
            return Err(PlacementError::LevelOver);
        }
        if !self.config.field.contains(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if self
            .portals
            .as_ref()
            .is_some_and(|field| !field.can_place(cell))
        {
            return Err(PlacementError::PortalOccupied);
        }

        let repair = match self.plants.iter().position(|plant| plant.cell() == cell) {
            None => None,
            Some(position) if repairs(kind, &self.plants[position]) => Some(position),
            Some(_) => return Err(PlacementError::CellOccupied),
        };

        let remaining = self.economy.card_cooldown(kind);
        if remaining > 0 {
            return Err(PlacementError::CardCoolingDown { remaining });
        }
        if repair.is_none() && kind == PlantKind::Sunflower {
            if let Some(limit) = self.config.sunflower_limit {
                let planted = self
                    .plants
                    .iter()
                    .filter(|plant| plant.kind() == PlantKind::Sunflower)
                    .count() as u32;
                if planted >= limit {
                    return Err(PlacementError::SunflowerLimitReached { limit });
                }
            }
        }
        self.economy.can_afford(kind.cost())?;

        self.economy.spend(kind.cost());
        if self.config.card_cooldowns {
            self.economy.start_card_cooldown(kind, kind.card_cooldown());
        }

        if let Some(position) = repair {
            let plant = &mut self.plants[position];
            plant.repair();
            out.push(Event::PlantRepaired { plant: plant.id() });
            return Ok(plant.id());
        }

        let id = PlantId::new(self.next_plant);
        self.next_plant = self.next_plant.saturating_add(1);
        let cadence = kind.attack().map(|profile| self.roll_cadence(profile));
        self.plants.push(Plant::new(id, kind, cell, cadence));
        debug!(
            plant = id.get(),
            kind = kind.as_str(),
            row = cell.row(),
            column = cell.column(),
            "plant placed"
        );
        out.push(Event::PlantPlaced {
            plant: id,
            kind,
            cell,
        });
        Ok(id)
    }

    fn roll_cadence(&mut self, profile: AttackProfile) -> ShotCadence {
        let deviation = if profile.variation > 0.0 {
            self.rng.gen_range(-profile.variation..=profile.variation)
        } else {
            0.0
        };
        let delay = (profile.base_delay * (1.0 + deviation) / self.config.plant_speed_multiplier)
            .max(1.0);
        ShotCadence {
            delay,
            initial_charge: self.rng.gen_range(0.0..delay),
        }
    }

    pub(crate) fn remove_plant(
        &mut self,
        cell: CellCoord,
        out: &mut Vec<Event>,
    ) -> Result<(), ToolError> {
        if !self.is_running() {
            return Err(ToolError::LevelOver);
        }
        if !self.config.field.contains(cell) {
            return Err(ToolError::OutOfBounds);
        }
        let position = self
            .plants
            .iter()
            .position(|plant| plant.cell() == cell)
            .ok_or(ToolError::NothingToRemove)?;

        let plant = self.plants.remove(position);
        self.healing.remove(plant.id());
        out.push(Event::PlantRemoved {
            plant: plant.id(),
            cell,
            cause: PlantRemoval::Shovelled,
        });
        Ok(())
    }

    /// Kills every live zombie under the hammer. Returns how many were killed.
    pub(crate) fn use_hammer(
        &mut self,
        cell: CellCoord,
        out: &mut Vec<Event>,
    ) -> Result<u32, ToolError> {
        if !self.is_running() {
            return Err(ToolError::LevelOver);
        }
        if !self.config.field.contains(cell) {
            return Err(ToolError::OutOfBounds);
        }
        let remaining = self.economy.hammer_cooldown();
        if remaining > 0 {
            return Err(ToolError::HammerCoolingDown { remaining });
        }

        let struck: Vec<_> = self
            .zombies
            .iter()
            .filter(|zombie| zombie.is_targetable() && under_hammer(zombie, cell))
            .map(Zombie::id)
            .collect();
        if struck.is_empty() {
            return Err(ToolError::NoZombieInCell);
        }

        for zombie in &struck {
            if let Some(position) = self.position_of(*zombie) {
                self.retire_zombie(position, KillCause::Hammer, out);
            }
        }
        self.economy.start_hammer_cooldown(HAMMER_COOLDOWN_TICKS);

        let killed = struck.len() as u32;
        debug!(row = cell.row(), column = cell.column(), killed, "hammer struck");
        out.push(Event::HammerStruck { cell, killed });
        Ok(killed)
    }

    pub(crate) fn trigger_cart(&mut self, row: u32, out: &mut Vec<Event>) -> Result<(), ToolError> {
        if !self.is_running() {
            return Err(ToolError::LevelOver);
        }
        if row >= self.config.field.rows {
            return Err(ToolError::OutOfBounds);
        }
        let cart = self
            .carts
            .iter_mut()
            .find(|cart| cart.row() == row)
            .ok_or(ToolError::CartUnavailable)?;
        if !cart.trigger() {
            return Err(ToolError::CartUnavailable);
        }
        info!(row, "cart launched by hand");
        out.push(Event::CartTriggered { row });
        Ok(())
    }
}

/// Re-placing a wall-nut on a damaged wall-nut restores it.
fn repairs(kind: PlantKind, occupant: &Plant) -> bool {
    kind == PlantKind::WallNut && occupant.kind() == PlantKind::WallNut && occupant.is_damaged()
}

/// A zombie is hit when its footprint covers a quarter of its size inside the
/// cell or when its centre lies inside.
fn under_hammer(zombie: &Zombie, cell: CellCoord) -> bool {
    if zombie.row() != cell.row() {
        return false;
    }
    let left = cell.column_f32();
    let right = left + 1.0;
    let start = zombie.col();
    let end = start + zombie.size();
    let overlap = end.min(right) - start.max(left);
    let centre = start + zombie.size() / 2.0;
    overlap >= zombie.size() / 4.0 || (left..right).contains(&centre)
}
