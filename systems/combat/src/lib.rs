#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile flight, hit resolution and area effects.
//!
//! The resolver runs once per tick after every plant and zombie has thought.
//! It never removes zombies: damage drops health to zero at most, and the
//! world's sweep turns defeated zombies into dying ones and charges the kill.
//! Projectiles, on the other hand, are owned and retired here.

mod effects;
mod flight;

use lane_defence_core::{
    Cart, CellCoord, DamageSource, Event, FieldDimensions, FireIntent, PlantId, PlantKind,
    Projectile, ProjectileId, ProjectileKind, Zombie, ZombieId, DANDELION_VOLLEY,
};
use lane_defence_system_portals::PortalField;
use lane_defence_system_spatial_index::SpatialIndex;
use lane_defence_system_status_effects::StatusTable;
use rand::Rng;

/// Mutable view of the state a combat pass reads and writes.
///
/// `index` must have been rebuilt from `zombies` after the last change to the
/// slice's length or order.
#[derive(Debug)]
pub struct CombatScene<'a> {
    /// Every zombie on the lawn.
    pub zombies: &'a mut [Zombie],
    /// Row buckets over `zombies`.
    pub index: &'a SpatialIndex,
    /// Status timers, written by freezing and full-field effects.
    pub status: &'a mut StatusTable,
    /// Portal layer, when the level has one.
    pub portals: Option<&'a PortalField>,
    /// Lawn dimensions.
    pub field: FieldDimensions,
}

impl CombatScene<'_> {
    fn position_of(&self, zombie: ZombieId) -> Option<usize> {
        self.zombies.iter().position(|candidate| candidate.id() == zombie)
    }

    fn targetable(&self, position: usize) -> bool {
        self.zombies
            .get(position)
            .is_some_and(Zombie::is_targetable)
    }
}

/// Result of resolving a single hit against a zombie.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitOutcome {
    /// The zombie could not be hit.
    Missed,
    /// The zombie rolled immunity; no damage was applied.
    Immune,
    /// Damage was applied.
    Hit,
}

/// Rolls immunity and applies damage to a targetable zombie.
pub fn strike<R: Rng + ?Sized>(
    zombie: &mut Zombie,
    damage: u32,
    source: DamageSource,
    rng: &mut R,
    out: &mut Vec<Event>,
) -> HitOutcome {
    if !zombie.is_targetable() {
        return HitOutcome::Missed;
    }

    let chance = zombie.immunity_chance();
    if chance > 0.0 && rng.gen::<f32>() < chance {
        out.push(Event::ZombieImmune {
            zombie: zombie.id(),
            source,
        });
        return HitOutcome::Immune;
    }

    let report = zombie.apply_damage(damage);
    out.push(Event::ZombieHit {
        zombie: zombie.id(),
        source,
        damage,
        armor_hit: report.armor_absorbed > 0,
    });
    HitOutcome::Hit
}

/// Resolves a projectile's hit against a zombie, recording the zombie in the
/// projectile's hit-set so no zombie is resolved twice by the same projectile.
pub fn strike_with<R: Rng + ?Sized>(
    projectile: &mut Projectile,
    zombie: &mut Zombie,
    damage: u32,
    source: DamageSource,
    rng: &mut R,
    out: &mut Vec<Event>,
) -> HitOutcome {
    if projectile.has_hit(zombie.id()) || !zombie.is_targetable() {
        return HitOutcome::Missed;
    }
    let outcome = strike(zombie, damage, source, rng, out);
    let _ = projectile.record_hit(zombie.id());
    outcome
}

/// Combat system that owns projectile identifiers and scratch buffers.
#[derive(Debug, Default)]
pub struct CombatResolver {
    next_projectile: u32,
    retired: Vec<usize>,
}

impl CombatResolver {
    /// Creates a resolver whose first projectile receives identifier zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver that continues numbering at `next_projectile`.
    #[must_use]
    pub fn resume(next_projectile: u32) -> Self {
        Self {
            next_projectile,
            retired: Vec::new(),
        }
    }

    /// Identifier the next projectile will receive.
    #[must_use]
    pub const fn next_projectile_id(&self) -> u32 {
        self.next_projectile
    }

    /// Takes ownership of an existing projectile, keeping identifiers unique.
    pub fn adopt(&mut self, projectiles: &mut Vec<Projectile>, projectile: Projectile) {
        self.next_projectile = self
            .next_projectile
            .max(projectile.id().get().saturating_add(1));
        projectiles.push(projectile);
    }

    fn allocate(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile);
        self.next_projectile = self.next_projectile.saturating_add(1);
        id
    }

    fn launch(
        &mut self,
        projectiles: &mut Vec<Projectile>,
        intent: FireIntent,
        build: impl FnOnce(ProjectileId) -> Projectile,
        out: &mut Vec<Event>,
    ) {
        let projectile = build(self.allocate());
        out.push(Event::ProjectileLaunched {
            projectile: projectile.id(),
            kind: projectile.kind(),
            plant: intent.plant,
        });
        projectiles.push(projectile);
    }

    /// Turns a plant's fire intent into projectiles or an instant strike.
    pub fn fire<R: Rng + ?Sized>(
        &mut self,
        intent: &FireIntent,
        projectiles: &mut Vec<Projectile>,
        scene: &mut CombatScene<'_>,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) {
        let intent = *intent;
        match intent.kind {
            PlantKind::PeaShooter => self.launch(
                projectiles,
                intent,
                |id| {
                    Projectile::linear(
                        id,
                        ProjectileKind::Pea,
                        intent.plant,
                        intent.origin,
                        intent.penetrating,
                    )
                },
                out,
            ),
            PlantKind::IceCactus => self.launch(
                projectiles,
                intent,
                |id| {
                    Projectile::linear(id, ProjectileKind::Ice, intent.plant, intent.origin, true)
                },
                out,
            ),
            PlantKind::MelonPult => self.launch(
                projectiles,
                intent,
                |id| {
                    Projectile::ballistic(
                        id,
                        intent.plant,
                        intent.origin,
                        intent.landing_column,
                        intent.target,
                    )
                },
                out,
            ),
            PlantKind::Cattail => self.launch(
                projectiles,
                intent,
                |id| Projectile::homing(id, intent.plant, intent.origin, intent.target),
                out,
            ),
            PlantKind::Dandelion => self.release_seeds(&intent, projectiles, scene, rng, out),
            PlantKind::LightningFlower => effects::strike_lightning(&intent, scene, rng, out),
            PlantKind::Sunflower
            | PlantKind::WallNut
            | PlantKind::CherryBomb
            | PlantKind::Cucumber => {}
        }
    }

    fn release_seeds<R: Rng + ?Sized>(
        &mut self,
        intent: &FireIntent,
        projectiles: &mut Vec<Projectile>,
        scene: &CombatScene<'_>,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) {
        let targets: Vec<usize> = (0..scene.zombies.len())
            .filter(|position| scene.targetable(*position))
            .collect();
        if targets.is_empty() {
            return;
        }

        for _ in 0..DANDELION_VOLLEY {
            let zombie = &scene.zombies[targets[rng.gen_range(0..targets.len())]];
            let heading = flight::heading_between(
                (intent.origin.row() as f32, intent.origin.column_f32()),
                (zombie.row() as f32, zombie.col()),
                (0.0, 1.0),
            );
            let target = Some(zombie.id());
            self.launch(
                projectiles,
                *intent,
                |id| Projectile::seed(id, intent.plant, intent.origin, target, heading),
                out,
            );
        }
    }

    /// Advances every projectile one tick, resolves its hits and retires the
    /// projectiles that reached a terminal state.
    pub fn resolve<R: Rng + ?Sized>(
        &mut self,
        projectiles: &mut Vec<Projectile>,
        scene: &mut CombatScene<'_>,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) {
        self.retired.clear();
        for (position, projectile) in projectiles.iter_mut().enumerate() {
            let finished = match projectile.kind() {
                ProjectileKind::Pea | ProjectileKind::Ice => {
                    flight::advance_linear(projectile, scene, rng, out)
                }
                ProjectileKind::Melon => flight::advance_ballistic(projectile, scene, rng, out),
                ProjectileKind::Spike | ProjectileKind::DandelionSeed => {
                    flight::advance_tracking(projectile, scene, rng, out)
                }
            };
            if finished {
                self.retired.push(position);
            }
        }

        for &position in self.retired.iter().rev() {
            let _ = projectiles.remove(position);
        }
    }

    /// Blasts every zombie within one row and one column of `center`.
    /// Returns the number of zombies caught.
    pub fn detonate_area(
        &mut self,
        plant: PlantId,
        center: CellCoord,
        scene: &mut CombatScene<'_>,
        out: &mut Vec<Event>,
    ) -> u32 {
        effects::detonate_area(plant, center, scene, out)
    }

    /// Stuns and sprays every zombie on the lawn, marking some for death.
    /// Returns the number of zombies affected.
    pub fn detonate_full_field<R: Rng + ?Sized>(
        &mut self,
        plant: PlantId,
        scene: &mut CombatScene<'_>,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> u32 {
        effects::detonate_full_field(plant, scene, rng, out)
    }

    /// Rolls every moving cart and flattens the zombies it reaches.
    pub fn roll_carts(
        &mut self,
        carts: &mut [Cart],
        scene: &mut CombatScene<'_>,
        out: &mut Vec<Event>,
    ) {
        effects::roll_carts(carts, scene, out);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use lane_defence_core::{
        FieldDimensions, Zombie, ZombieBlueprint, ZombieId, ZombieKind, ZombieTuning,
    };
    use lane_defence_system_spatial_index::SpatialIndex;
    use lane_defence_system_status_effects::StatusTable;

    use crate::CombatScene;

    pub(crate) fn zombie(id: u32, row: u32, col: f32) -> Zombie {
        Zombie::spawn(
            ZombieId::new(id),
            ZombieBlueprint::plain(ZombieKind::Normal),
            row,
            col,
            ZombieTuning::default(),
        )
    }

    pub(crate) struct Arena {
        pub(crate) zombies: Vec<Zombie>,
        pub(crate) index: SpatialIndex,
        pub(crate) status: StatusTable,
    }

    impl Arena {
        pub(crate) fn new(zombies: Vec<Zombie>) -> Self {
            let mut index = SpatialIndex::new(5);
            index.rebuild(&zombies);
            Self {
                zombies,
                index,
                status: StatusTable::new(),
            }
        }

        pub(crate) fn scene(&mut self) -> CombatScene<'_> {
            CombatScene {
                zombies: &mut self.zombies,
                index: &self.index,
                status: &mut self.status,
                portals: None,
                field: FieldDimensions::default(),
            }
        }
    }
}
