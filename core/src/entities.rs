//! Entity records shared by the world and every system.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    config::LevelConfig,
    kinds::{
        PlantKind, ProjectileKind, ZombieKind, CART_SPEED, DETONATION_FUSE_TICKS,
        DETONATION_VISUAL_TICKS, DYING_TICKS, SUNFLOWER_PRODUCTION_INTERVAL,
    },
    CellCoord, PlantId, PortalId, ProjectileId, StatusFlags, ZombieBlueprint, ZombieId,
};

const BITE_INTERVAL: u32 = 30;
const DYING_DRIFT_DECAY: f32 = 0.02;
const FROZEN_SPEED_FACTOR: f32 = 0.5;
const CART_REST_COLUMN: f32 = -0.6;

/// Level-wide modifiers applied to every zombie at creation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZombieTuning {
    /// Multiplier applied to the archetype's base health.
    pub health_scale: f32,
    /// Probability that the zombie ignores a hit.
    pub immunity_chance: f32,
    /// Speed multiplier applied to fast zombies.
    pub fast_multiplier: f32,
}

impl ZombieTuning {
    /// Extracts the zombie modifiers from a level configuration.
    #[must_use]
    pub fn from_config(config: &LevelConfig) -> Self {
        Self {
            health_scale: config.zombie_health_scale,
            immunity_chance: config.zombie_immunity_chance,
            fast_multiplier: config.fast_speed_multiplier,
        }
    }
}

impl Default for ZombieTuning {
    fn default() -> Self {
        Self {
            health_scale: 1.0,
            immunity_chance: 0.0,
            fast_multiplier: 2.5,
        }
    }
}

/// Breakdown of a single damage application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DamageReport {
    /// Damage absorbed by the armor pool.
    pub armor_absorbed: u32,
    /// Damage taken from primary health.
    pub health_lost: u32,
    /// Whether this hit emptied the armor pool.
    pub armor_broken: bool,
}

/// Audio cue produced while a zombie chews on a plant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChewCue {
    /// Nothing to report this tick.
    Silent,
    /// Periodic bite.
    Bite,
    /// Giant smash.
    Smash,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
struct DyingClock {
    remaining: u32,
    drift: f32,
}

/// A zombie advancing along its lane toward the defended edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zombie {
    id: ZombieId,
    kind: ZombieKind,
    row: u32,
    col: f32,
    health: u32,
    max_health: u32,
    armor_health: u32,
    max_armor_health: u32,
    speed: f32,
    fast: bool,
    wave: bool,
    immunity_chance: f32,
    attacking: bool,
    status: StatusFlags,
    dying: Option<DyingClock>,
    bite_timer: u32,
    smash_timer: u32,
    smashed_once: bool,
    portal_contact: Option<PortalId>,
}

impl Zombie {
    /// Creates a zombie from a scheduler blueprint at the given lane position.
    #[must_use]
    pub fn spawn(
        id: ZombieId,
        blueprint: ZombieBlueprint,
        row: u32,
        col: f32,
        tuning: ZombieTuning,
    ) -> Self {
        let kind = blueprint.kind;
        let scaled = (kind.base_health() as f32 * tuning.health_scale).round();
        let max_health = if scaled >= 1.0 { scaled as u32 } else { 1 };
        let max_armor_health = if blueprint.armored {
            kind.armor(blueprint.fast && blueprint.wave)
        } else {
            0
        };
        let speed = if blueprint.fast {
            kind.base_speed() * tuning.fast_multiplier
        } else {
            kind.base_speed()
        };

        Self {
            id,
            kind,
            row,
            col,
            health: max_health,
            max_health,
            armor_health: max_armor_health,
            max_armor_health,
            speed,
            fast: blueprint.fast,
            wave: blueprint.wave,
            immunity_chance: tuning.immunity_chance,
            attacking: false,
            status: StatusFlags::default(),
            dying: None,
            bite_timer: 0,
            smash_timer: 0,
            smashed_once: false,
            portal_contact: None,
        }
    }

    /// Copies the runtime state of a saved zombie onto this freshly spawned one.
    ///
    /// Stats fixed at spawn keep the values this zombie was built with, and
    /// the saved health and armor pools are clamped to them.
    pub fn overlay(&mut self, saved: &Zombie) {
        self.col = saved.col;
        self.health = saved.health.min(self.max_health);
        self.armor_health = saved.armor_health.min(self.max_armor_health);
        self.attacking = saved.attacking;
        self.status = saved.status;
        self.dying = saved.dying;
        self.bite_timer = saved.bite_timer;
        self.smash_timer = saved.smash_timer;
        self.smashed_once = saved.smashed_once;
        self.portal_contact = saved.portal_contact;
    }

    /// Blueprint that spawns a zombie of the same archetype.
    #[must_use]
    pub const fn blueprint(&self) -> ZombieBlueprint {
        ZombieBlueprint {
            kind: self.kind,
            armored: self.max_armor_health > 0,
            fast: self.fast,
            wave: self.wave,
        }
    }

    /// Identifier of the zombie.
    #[must_use]
    pub const fn id(&self) -> ZombieId {
        self.id
    }

    /// Archetype of the zombie.
    #[must_use]
    pub const fn kind(&self) -> ZombieKind {
        self.kind
    }

    /// Lane the zombie walks along.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Continuous column of the zombie's front edge.
    #[must_use]
    pub const fn col(&self) -> f32 {
        self.col
    }

    /// Remaining primary health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Primary health at creation.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Remaining armor pool.
    #[must_use]
    pub const fn armor_health(&self) -> u32 {
        self.armor_health
    }

    /// Armor pool at creation.
    #[must_use]
    pub const fn max_armor_health(&self) -> u32 {
        self.max_armor_health
    }

    /// Columns travelled per tick before status modifiers.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Whether the zombie was spawned fast.
    #[must_use]
    pub const fn is_fast(&self) -> bool {
        self.fast
    }

    /// Whether the zombie belongs to a scripted wave.
    #[must_use]
    pub const fn is_wave_zombie(&self) -> bool {
        self.wave
    }

    /// Probability that the zombie ignores a hit.
    #[must_use]
    pub const fn immunity_chance(&self) -> f32 {
        self.immunity_chance
    }

    /// Whether the zombie is chewing on a plant.
    #[must_use]
    pub const fn is_attacking(&self) -> bool {
        self.attacking
    }

    /// Status conditions mirrored from the status table.
    #[must_use]
    pub const fn status(&self) -> StatusFlags {
        self.status
    }

    /// Whether the zombie is in its dying animation.
    #[must_use]
    pub const fn is_dying(&self) -> bool {
        self.dying.is_some()
    }

    /// Ticks left in the dying animation.
    #[must_use]
    pub fn dying_ticks_remaining(&self) -> Option<u32> {
        self.dying.map(|clock| clock.remaining)
    }

    /// Width of the zombie's footprint in columns.
    #[must_use]
    pub const fn size(&self) -> f32 {
        self.kind.size()
    }

    /// Portal the zombie currently stands on, if it already rolled for it.
    #[must_use]
    pub const fn portal_contact(&self) -> Option<PortalId> {
        self.portal_contact
    }

    /// Health remaining as a fraction of the maximum.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            0.0
        } else {
            self.health as f32 / self.max_health as f32
        }
    }

    /// Armor remaining as a fraction of the maximum, zero for unarmored zombies.
    #[must_use]
    pub fn armor_fraction(&self) -> f32 {
        if self.max_armor_health == 0 {
            0.0
        } else {
            self.armor_health as f32 / self.max_armor_health as f32
        }
    }

    /// Whether health has been depleted.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.health == 0
    }

    /// Whether the zombie can still be damaged or targeted.
    #[must_use]
    pub const fn is_targetable(&self) -> bool {
        self.dying.is_none() && self.health > 0
    }

    /// Columns the zombie covers this tick given its status.
    #[must_use]
    pub fn effective_speed(&self) -> f32 {
        if self.status.frozen {
            self.speed * FROZEN_SPEED_FACTOR
        } else {
            self.speed
        }
    }

    /// Applies damage to the armor pool first and carries any overflow into health.
    pub fn apply_damage(&mut self, amount: u32) -> DamageReport {
        let armor_absorbed = amount.min(self.armor_health);
        self.armor_health -= armor_absorbed;
        let overflow = amount - armor_absorbed;
        let health_lost = overflow.min(self.health);
        self.health -= health_lost;

        DamageReport {
            armor_absorbed,
            health_lost,
            armor_broken: armor_absorbed > 0 && self.armor_health == 0,
        }
    }

    /// Drops both pools to zero.
    pub fn defeat(&mut self) {
        self.armor_health = 0;
        self.health = 0;
    }

    /// Enters the dying animation. Returns `false` when the zombie is still alive
    /// or already dying.
    pub fn begin_dying(&mut self) -> bool {
        if self.dying.is_some() || self.health > 0 {
            return false;
        }
        self.dying = Some(DyingClock {
            remaining: DYING_TICKS,
            drift: 1.0,
        });
        self.attacking = false;
        true
    }

    /// Advances the dying animation. Returns `true` once the animation elapsed.
    pub fn advance_dying(&mut self) -> bool {
        let Some(clock) = self.dying.as_mut() else {
            return false;
        };
        self.col -= self.speed * clock.drift;
        clock.drift = (clock.drift - DYING_DRIFT_DECAY).max(0.0);
        clock.remaining = clock.remaining.saturating_sub(1);
        clock.remaining == 0
    }

    /// Walks one tick toward the defended edge.
    pub fn step_forward(&mut self) {
        self.col -= self.effective_speed();
    }

    /// Replaces the mirrored status conditions.
    pub fn set_status(&mut self, status: StatusFlags) {
        self.status = status;
    }

    /// Moves the zombie to a new lane position.
    pub fn relocate(&mut self, row: u32, col: f32) {
        self.row = row;
        self.col = col;
    }

    /// Records the portal the zombie stands on.
    pub fn set_portal_contact(&mut self, portal: Option<PortalId>) {
        self.portal_contact = portal;
    }

    /// Stops chewing and resets the chew clocks.
    pub fn disengage(&mut self) {
        self.attacking = false;
        self.bite_timer = 0;
        self.smash_timer = 0;
    }

    /// Chews on a contacted plant for one tick, returning the damage to apply
    /// and the cue to emit.
    pub fn chew(&mut self) -> (u32, ChewCue) {
        self.attacking = true;
        match self.kind.smash() {
            None => {
                self.bite_timer += 1;
                let cue = if self.bite_timer >= BITE_INTERVAL {
                    self.bite_timer = 0;
                    ChewCue::Bite
                } else {
                    ChewCue::Silent
                };
                (self.kind.melee_damage(), cue)
            }
            Some((damage, interval)) => {
                if !self.smashed_once {
                    self.smashed_once = true;
                    self.smash_timer = 0;
                    return (damage, ChewCue::Smash);
                }
                self.smash_timer += 1;
                if self.smash_timer >= interval {
                    self.smash_timer = 0;
                    (damage, ChewCue::Smash)
                } else {
                    (self.kind.melee_damage(), ChewCue::Silent)
                }
            }
        }
    }
}

/// Attack timing rolled for a plant at placement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShotCadence {
    /// Ticks between two attacks, already adjusted for plant speed.
    pub delay: f32,
    /// Charge the plant starts with.
    pub initial_charge: f32,
}

/// Progress of a one-shot plant's detonation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Detonation {
    visual_remaining: u32,
    damage_applied: bool,
}

impl Detonation {
    /// Ticks of detonation visual left before the plant is removed.
    #[must_use]
    pub const fn visual_remaining(&self) -> u32 {
        self.visual_remaining
    }

    /// Whether the detonation's damage was already charged.
    #[must_use]
    pub const fn damage_applied(&self) -> bool {
        self.damage_applied
    }
}

/// A plant occupying a lawn cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    id: PlantId,
    kind: PlantKind,
    cell: CellCoord,
    health: u32,
    max_health: u32,
    cadence: Option<ShotCadence>,
    charge: f32,
    had_target: bool,
    production_timer: u32,
    fuse: u32,
    detonation: Option<Detonation>,
}

impl Plant {
    /// Creates a plant. Attacking kinds need a cadence, other kinds ignore it.
    #[must_use]
    pub fn new(
        id: PlantId,
        kind: PlantKind,
        cell: CellCoord,
        cadence: Option<ShotCadence>,
    ) -> Self {
        let cadence = kind.attack().and(cadence);
        Self {
            id,
            kind,
            cell,
            health: kind.max_health(),
            max_health: kind.max_health(),
            charge: cadence.map_or(0.0, |cadence| cadence.initial_charge),
            cadence,
            had_target: false,
            production_timer: 0,
            fuse: if kind.is_one_shot() {
                DETONATION_FUSE_TICKS
            } else {
                0
            },
            detonation: None,
        }
    }

    /// Copies the runtime state of a saved plant onto this freshly placed one.
    pub fn overlay(&mut self, saved: &Plant) {
        self.health = saved.health.min(self.max_health);
        self.charge = self
            .cadence
            .map_or(0.0, |cadence| saved.charge.clamp(0.0, cadence.delay));
        self.had_target = saved.had_target;
        self.production_timer = saved.production_timer;
        if self.kind.is_one_shot() {
            self.fuse = saved.fuse.min(DETONATION_FUSE_TICKS);
            self.detonation = saved.detonation;
        }
    }

    /// Identifier of the plant.
    #[must_use]
    pub const fn id(&self) -> PlantId {
        self.id
    }

    /// Kind of the plant.
    #[must_use]
    pub const fn kind(&self) -> PlantKind {
        self.kind
    }

    /// Cell the plant occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Health at placement.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Health remaining as a fraction of the maximum.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        self.health as f32 / self.max_health.max(1) as f32
    }

    /// Attack timing, for plants that attack.
    #[must_use]
    pub const fn cadence(&self) -> Option<ShotCadence> {
        self.cadence
    }

    /// Accumulated attack charge.
    #[must_use]
    pub const fn charge(&self) -> f32 {
        self.charge
    }

    /// Ticks left on a one-shot plant's fuse.
    #[must_use]
    pub const fn fuse(&self) -> u32 {
        self.fuse
    }

    /// Detonation state of a one-shot plant that went off.
    #[must_use]
    pub const fn detonation(&self) -> Option<Detonation> {
        self.detonation
    }

    /// Whether the plant lost any health.
    #[must_use]
    pub const fn is_damaged(&self) -> bool {
        self.health < self.max_health
    }

    /// Whether the plant's health was depleted.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.health == 0
    }

    /// Whether zombies can chew on the plant.
    #[must_use]
    pub const fn is_edible(&self) -> bool {
        self.health > 0 && self.detonation.is_none()
    }

    /// Removes health, never dropping below zero.
    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Restores health up to the maximum.
    pub fn heal(&mut self, amount: u32) {
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }

    /// Restores full health.
    pub fn repair(&mut self) {
        self.health = self.max_health;
    }

    /// Accumulates one tick of attack charge.
    pub fn charge_up(&mut self) {
        if let Some(cadence) = self.cadence {
            self.charge = (self.charge + 1.0).min(cadence.delay);
        }
    }

    /// Whether the plant is charged enough to attack.
    #[must_use]
    pub fn is_charged(&self) -> bool {
        self.cadence
            .is_some_and(|cadence| self.charge >= cadence.delay)
    }

    /// Records whether the plant sees a target this tick. Returns `true` when a
    /// fully charged plant just acquired a target after having none.
    pub fn note_target(&mut self, has_target: bool) -> bool {
        let acquired = has_target && !self.had_target && self.is_charged();
        self.had_target = has_target;
        acquired
    }

    /// Pulls the charge back by a fraction of the delay so volleys do not
    /// synchronise when a new wave appears.
    pub fn stagger(&mut self, fraction: f32) {
        if let Some(cadence) = self.cadence {
            self.charge = (cadence.delay - cadence.delay * fraction).max(0.0);
        }
    }

    /// Spends the accumulated charge on an attack.
    pub fn discharge(&mut self) {
        self.charge = 0.0;
    }

    /// Advances a sunflower's production clock. Returns `true` on harvest.
    pub fn tick_production(&mut self) -> bool {
        if self.kind != PlantKind::Sunflower {
            return false;
        }
        self.production_timer += 1;
        if self.production_timer >= SUNFLOWER_PRODUCTION_INTERVAL {
            self.production_timer = 0;
            true
        } else {
            false
        }
    }

    /// Burns one tick of a one-shot plant's fuse. Returns `true` when the
    /// plant detonates this tick.
    pub fn tick_fuse(&mut self) -> bool {
        if !self.kind.is_one_shot() || self.detonation.is_some() {
            return false;
        }
        self.fuse = self.fuse.saturating_sub(1);
        if self.fuse == 0 {
            self.ignite()
        } else {
            false
        }
    }

    /// Starts the detonation immediately. Returns `false` for plants that do
    /// not detonate or already went off.
    pub fn ignite(&mut self) -> bool {
        if !self.kind.is_one_shot() || self.detonation.is_some() {
            return false;
        }
        self.fuse = 0;
        self.detonation = Some(Detonation {
            visual_remaining: DETONATION_VISUAL_TICKS,
            damage_applied: false,
        });
        true
    }

    /// Claims the detonation's damage. Returns `true` exactly once per detonation.
    pub fn claim_detonation_damage(&mut self) -> bool {
        match self.detonation.as_mut() {
            Some(detonation) if !detonation.damage_applied => {
                detonation.damage_applied = true;
                true
            }
            _ => false,
        }
    }

    /// Advances the detonation visual. Returns `true` once it completed.
    pub fn advance_detonation(&mut self) -> bool {
        match self.detonation.as_mut() {
            Some(detonation) if detonation.damage_applied => {
                detonation.visual_remaining = detonation.visual_remaining.saturating_sub(1);
                detonation.visual_remaining == 0
            }
            _ => false,
        }
    }
}

/// Kind-specific movement state of a projectile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Straight flight along the row.
    Linear {
        /// Whether the projectile already passed through a portal.
        teleported: bool,
    },
    /// Arc between a launch and a landing column.
    Ballistic {
        /// Column the arc started from.
        from_column: f32,
        /// Column the arc lands on.
        to_column: f32,
        /// Flight progress in `[0, 1]`.
        progress: f32,
        /// Zombie the shot was aimed at.
        target: Option<ZombieId>,
        /// Ticks of explosion visual left once landed.
        explosion: Option<u32>,
    },
    /// Steered flight toward a tracked zombie.
    Homing {
        /// Zombie being tracked.
        target: Option<ZombieId>,
        /// Unit direction of travel as `(rows, columns)`.
        heading: (f32, f32),
    },
    /// Slow drift toward a zombie that ends after a fixed lifetime.
    Drift {
        /// Zombie the seed drifts toward.
        target: Option<ZombieId>,
        /// Unit direction of travel as `(rows, columns)`.
        heading: (f32, f32),
        /// Ticks left before the seed withers.
        lifetime: u32,
    },
}

/// A projectile in flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    id: ProjectileId,
    kind: ProjectileKind,
    source: PlantId,
    row: f32,
    col: f32,
    penetrating: bool,
    motion: Motion,
    hits: BTreeSet<ZombieId>,
}

impl Projectile {
    /// Creates a pea or ice shot leaving the given cell. Ice always penetrates.
    #[must_use]
    pub fn linear(
        id: ProjectileId,
        kind: ProjectileKind,
        source: PlantId,
        origin: CellCoord,
        penetrating: bool,
    ) -> Self {
        Self::from_parts(
            id,
            kind,
            source,
            origin,
            penetrating || kind == ProjectileKind::Ice,
            Motion::Linear { teleported: false },
        )
    }

    /// Creates a melon lobbed from the given cell toward a landing column.
    #[must_use]
    pub fn ballistic(
        id: ProjectileId,
        source: PlantId,
        origin: CellCoord,
        landing_column: f32,
        target: Option<ZombieId>,
    ) -> Self {
        Self::from_parts(
            id,
            ProjectileKind::Melon,
            source,
            origin,
            false,
            Motion::Ballistic {
                from_column: origin.column_f32(),
                to_column: landing_column,
                progress: 0.0,
                target,
                explosion: None,
            },
        )
    }

    /// Creates a homing spike tracking the given zombie.
    #[must_use]
    pub fn homing(
        id: ProjectileId,
        source: PlantId,
        origin: CellCoord,
        target: Option<ZombieId>,
    ) -> Self {
        Self::from_parts(
            id,
            ProjectileKind::Spike,
            source,
            origin,
            false,
            Motion::Homing {
                target,
                heading: (0.0, 1.0),
            },
        )
    }

    /// Creates a dandelion seed drifting toward the given zombie.
    #[must_use]
    pub fn seed(
        id: ProjectileId,
        source: PlantId,
        origin: CellCoord,
        target: Option<ZombieId>,
        heading: (f32, f32),
    ) -> Self {
        let lifetime = ProjectileKind::DandelionSeed.lifetime().unwrap_or_default();
        Self::from_parts(
            id,
            ProjectileKind::DandelionSeed,
            source,
            origin,
            false,
            Motion::Drift {
                target,
                heading,
                lifetime,
            },
        )
    }

    fn from_parts(
        id: ProjectileId,
        kind: ProjectileKind,
        source: PlantId,
        origin: CellCoord,
        penetrating: bool,
        motion: Motion,
    ) -> Self {
        Self {
            id,
            kind,
            source,
            row: origin.row() as f32,
            col: origin.column_f32(),
            penetrating,
            motion,
            hits: BTreeSet::new(),
        }
    }

    /// Copies position, flight state and hit-set of a saved projectile.
    pub fn overlay(&mut self, saved: &Projectile) {
        self.row = saved.row;
        self.col = saved.col;
        self.motion = saved.motion.clone();
        self.hits = saved.hits.clone();
    }

    /// Identifier of the projectile.
    #[must_use]
    pub const fn id(&self) -> ProjectileId {
        self.id
    }

    /// Kind of the projectile.
    #[must_use]
    pub const fn kind(&self) -> ProjectileKind {
        self.kind
    }

    /// Plant that fired the projectile.
    #[must_use]
    pub const fn source(&self) -> PlantId {
        self.source
    }

    /// Continuous row position.
    #[must_use]
    pub const fn row(&self) -> f32 {
        self.row
    }

    /// Continuous column position.
    #[must_use]
    pub const fn col(&self) -> f32 {
        self.col
    }

    /// Lane the projectile currently flies in, `None` above the lawn.
    #[must_use]
    pub fn lane(&self) -> Option<u32> {
        let rounded = self.row.round();
        if rounded < 0.0 {
            None
        } else {
            Some(rounded as u32)
        }
    }

    /// Whether the projectile survives hits.
    #[must_use]
    pub const fn is_penetrating(&self) -> bool {
        self.penetrating
    }

    /// Damage dealt on a direct hit.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.kind.damage()
    }

    /// Movement state.
    #[must_use]
    pub const fn motion(&self) -> &Motion {
        &self.motion
    }

    /// Mutable movement state.
    pub fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }

    /// Moves the projectile.
    pub fn set_position(&mut self, row: f32, col: f32) {
        self.row = row;
        self.col = col;
    }

    /// Whether the projectile already resolved an outcome against the zombie.
    #[must_use]
    pub fn has_hit(&self, zombie: ZombieId) -> bool {
        self.hits.contains(&zombie)
    }

    /// Records an outcome against the zombie. Returns `false` when one was
    /// already recorded.
    pub fn record_hit(&mut self, zombie: ZombieId) -> bool {
        self.hits.insert(zombie)
    }

    /// Zombies the projectile resolved outcomes against.
    pub fn hits(&self) -> impl Iterator<Item = ZombieId> + '_ {
        self.hits.iter().copied()
    }
}

/// Lifecycle of a lawn cart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CartState {
    /// Waiting at the defended edge.
    Parked,
    /// Rolling down the lane.
    Rolling,
    /// Left the lawn; unavailable for the rest of the level.
    Spent,
}

/// One-use interceptor guarding a row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    row: u32,
    col: f32,
    state: CartState,
}

impl Cart {
    /// Creates a parked cart for the row.
    #[must_use]
    pub const fn new(row: u32) -> Self {
        Self {
            row,
            col: CART_REST_COLUMN,
            state: CartState::Parked,
        }
    }

    /// Copies position and state of a saved cart.
    pub fn overlay(&mut self, saved: &Cart) {
        self.col = saved.col;
        self.state = saved.state;
    }

    /// Row the cart guards.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Continuous column of the cart.
    #[must_use]
    pub const fn col(&self) -> f32 {
        self.col
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> CartState {
        self.state
    }

    /// Whether the cart is parked and can still be triggered.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state == CartState::Parked
    }

    /// Starts rolling. Returns `false` unless the cart was parked.
    pub fn trigger(&mut self) -> bool {
        if self.state != CartState::Parked {
            return false;
        }
        self.state = CartState::Rolling;
        true
    }

    /// Rolls one tick; the cart is spent once it passes `exit_column`.
    pub fn roll(&mut self, exit_column: f32) {
        if self.state != CartState::Rolling {
            return;
        }
        self.col += CART_SPEED;
        if self.col > exit_column {
            self.state = CartState::Spent;
        }
    }
}
