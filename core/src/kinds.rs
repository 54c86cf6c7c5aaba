//! Closed catalogue of plant, zombie and projectile kinds.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ParseKindError;

/// Number of ticks a zombie spends in its dying animation.
pub const DYING_TICKS: u32 = 90;
/// How far past column zero a zombie's front edge may reach before the row is breached.
pub const LOSS_MARGIN: f32 = 0.3;
/// Duration of the slow applied by ice projectiles.
pub const FREEZE_TICKS: u32 = 300;
/// Cooldown applied after a successful hammer strike.
pub const HAMMER_COOLDOWN_TICKS: u32 = 1200;
/// Interval between two sunflower harvests.
pub const SUNFLOWER_PRODUCTION_INTERVAL: u32 = 600;
/// Sun produced per sunflower harvest.
pub const SUNFLOWER_SUN: u32 = 25;
/// Ticks between placing a one-shot plant and its detonation.
pub const DETONATION_FUSE_TICKS: u32 = 60;
/// Ticks a detonation stays on the lawn before the plant is removed.
pub const DETONATION_VISUAL_TICKS: u32 = 30;
/// Damage dealt to every zombie inside the cherry bomb's 3x3 blast.
pub const CHERRY_BOMB_DAMAGE: u32 = 1800;
/// Stun applied by the cucumber to every zombie on the field.
pub const CUCUMBER_STUN_TICKS: u32 = 300;
/// Spray applied by the cucumber to every zombie on the field.
pub const CUCUMBER_SPRAY_TICKS: u32 = 120;
/// Probability that a sprayed zombie is marked for death.
pub const CUCUMBER_DEATH_CHANCE: f32 = 0.5;
/// Health restored to each plant per healing pulse after a cucumber detonation.
pub const CUCUMBER_HEAL_AMOUNT: u32 = 50;
/// Ticks between two healing pulses.
pub const CUCUMBER_HEAL_INTERVAL: u32 = 20;
/// Column distance within which a landed melon hits its primary target.
pub const MELON_IMPACT_RANGE: f32 = 0.75;
/// Column distance covered by melon splash in the impact row and its neighbours.
pub const MELON_SPLASH_RANGE: f32 = 1.0;
/// Damage dealt by melon splash.
pub const MELON_SPLASH_DAMAGE: u32 = 40;
/// Ticks the melon explosion lingers after impact.
pub const MELON_EXPLOSION_TICKS: u32 = 20;
/// Damage dealt by a lightning bolt and each of its jumps.
pub const LIGHTNING_DAMAGE: u32 = 40;
/// Probability that a lightning bolt jumps to another zombie.
pub const LIGHTNING_CHAIN_CHANCE: f32 = 0.6;
/// Maximum number of jumps after the first strike.
pub const LIGHTNING_CHAIN_JUMPS: u32 = 3;
/// Maximum distance covered by a single jump.
pub const LIGHTNING_CHAIN_RADIUS: f32 = 2.5;
/// Seeds released by one dandelion volley.
pub const DANDELION_VOLLEY: u32 = 5;
/// Distance a rolling cart covers per tick.
pub const CART_SPEED: f32 = 0.08;
/// Column distance at which a rolling cart flattens a zombie.
pub const CART_COLLISION_RANGE: f32 = 0.3;

/// Cadence of a plant's attack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackProfile {
    /// Ticks between two attacks at normal speed.
    pub base_delay: f32,
    /// Fraction by which each plant's delay may deviate from the base.
    pub variation: f32,
}

/// Plant kinds available to the player.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PlantKind {
    /// Produces sun.
    Sunflower,
    /// Fires peas along its row.
    PeaShooter,
    /// Blocks zombies with a large health pool.
    WallNut,
    /// Detonates once, blasting a 3x3 area.
    CherryBomb,
    /// Detonates once, stunning and spraying every zombie.
    Cucumber,
    /// Lobs melons that splash on impact.
    MelonPult,
    /// Fires homing spikes at any zombie.
    Cattail,
    /// Releases seeds that drift toward random zombies.
    Dandelion,
    /// Fires chaining lightning bolts along its row.
    LightningFlower,
    /// Fires penetrating, freezing ice.
    IceCactus,
}

impl PlantKind {
    /// Every plant kind in catalogue order.
    pub const ALL: [PlantKind; 10] = [
        PlantKind::Sunflower,
        PlantKind::PeaShooter,
        PlantKind::WallNut,
        PlantKind::CherryBomb,
        PlantKind::Cucumber,
        PlantKind::MelonPult,
        PlantKind::Cattail,
        PlantKind::Dandelion,
        PlantKind::LightningFlower,
        PlantKind::IceCactus,
    ];

    /// Sun required to place the plant.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            PlantKind::Sunflower | PlantKind::WallNut => 50,
            PlantKind::PeaShooter => 75,
            PlantKind::CherryBomb => 150,
            PlantKind::Cucumber | PlantKind::Dandelion => 175,
            PlantKind::IceCactus => 200,
            PlantKind::Cattail => 225,
            PlantKind::MelonPult | PlantKind::LightningFlower => 300,
        }
    }

    /// Ticks the card stays unavailable after placement when card cooldowns are on.
    #[must_use]
    pub const fn card_cooldown(self) -> u32 {
        match self {
            PlantKind::Sunflower | PlantKind::PeaShooter => 120,
            PlantKind::MelonPult => 480,
            PlantKind::Dandelion | PlantKind::LightningFlower | PlantKind::IceCactus => 600,
            PlantKind::Cattail
            | PlantKind::WallNut
            | PlantKind::CherryBomb
            | PlantKind::Cucumber => 1200,
        }
    }

    /// Health of a freshly placed plant.
    #[must_use]
    pub const fn max_health(self) -> u32 {
        match self {
            PlantKind::WallNut => 1500,
            _ => 100,
        }
    }

    /// Attack cadence for plants that fire, `None` for the rest.
    #[must_use]
    pub const fn attack(self) -> Option<AttackProfile> {
        let (base_delay, variation) = match self {
            PlantKind::PeaShooter => (60.0, 0.10),
            PlantKind::MelonPult => (150.0, 0.08),
            PlantKind::Cattail => (45.0, 0.05),
            PlantKind::Dandelion => (240.0, 0.08),
            PlantKind::LightningFlower => (120.0, 0.08),
            PlantKind::IceCactus => (75.0, 0.08),
            PlantKind::Sunflower
            | PlantKind::WallNut
            | PlantKind::CherryBomb
            | PlantKind::Cucumber => return None,
        };
        Some(AttackProfile {
            base_delay,
            variation,
        })
    }

    /// Whether the plant detonates once and then leaves the lawn.
    #[must_use]
    pub const fn is_one_shot(self) -> bool {
        matches!(self, PlantKind::CherryBomb | PlantKind::Cucumber)
    }

    /// Projectile fired by the plant, if it fires one.
    #[must_use]
    pub const fn projectile(self) -> Option<ProjectileKind> {
        match self {
            PlantKind::PeaShooter => Some(ProjectileKind::Pea),
            PlantKind::IceCactus => Some(ProjectileKind::Ice),
            PlantKind::MelonPult => Some(ProjectileKind::Melon),
            PlantKind::Cattail => Some(ProjectileKind::Spike),
            PlantKind::Dandelion => Some(ProjectileKind::DandelionSeed),
            _ => None,
        }
    }

    /// Stable snake_case name used by configuration files and the CLI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PlantKind::Sunflower => "sunflower",
            PlantKind::PeaShooter => "pea_shooter",
            PlantKind::WallNut => "wall_nut",
            PlantKind::CherryBomb => "cherry_bomb",
            PlantKind::Cucumber => "cucumber",
            PlantKind::MelonPult => "melon_pult",
            PlantKind::Cattail => "cattail",
            PlantKind::Dandelion => "dandelion",
            PlantKind::LightningFlower => "lightning_flower",
            PlantKind::IceCactus => "ice_cactus",
        }
    }
}

impl fmt::Display for PlantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlantKind {
    type Err = ParseKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        PlantKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseKindError::UnknownPlant(value.to_owned()))
    }
}

/// Zombie archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZombieKind {
    /// Regular walker that chews on plants every tick.
    Normal,
    /// Slow, large zombie that smashes plants periodically.
    Giant,
}

impl ZombieKind {
    /// Health before level scaling.
    #[must_use]
    pub const fn base_health(self) -> u32 {
        match self {
            ZombieKind::Normal => 150,
            ZombieKind::Giant => 600,
        }
    }

    /// Columns travelled per tick before the fast multiplier.
    #[must_use]
    pub const fn base_speed(self) -> f32 {
        match self {
            ZombieKind::Normal => 0.004,
            ZombieKind::Giant => 0.003,
        }
    }

    /// Width of the zombie's footprint in columns.
    #[must_use]
    pub const fn size(self) -> f32 {
        match self {
            ZombieKind::Normal => 1.0,
            ZombieKind::Giant => 1.5,
        }
    }

    /// Armor pool granted when the zombie is rolled as armored.
    #[must_use]
    pub const fn armor(self, fast_wave_zombie: bool) -> u32 {
        if fast_wave_zombie {
            300
        } else {
            200
        }
    }

    /// Damage dealt to a contacted plant on every tick of contact.
    #[must_use]
    pub const fn melee_damage(self) -> u32 {
        match self {
            ZombieKind::Normal => 1,
            ZombieKind::Giant => 0,
        }
    }

    /// Damage of a smash and the ticks between smashes, for kinds that smash.
    #[must_use]
    pub const fn smash(self) -> Option<(u32, u32)> {
        match self {
            ZombieKind::Normal => None,
            ZombieKind::Giant => Some((300, 90)),
        }
    }
}

/// Projectile kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileKind {
    /// Straight shot along a row.
    Pea,
    /// Straight, penetrating shot that freezes.
    Ice,
    /// Ballistic lob that splashes on landing.
    Melon,
    /// Homing spike that can reach any row.
    Spike,
    /// Drifting seed with a limited lifetime.
    DandelionSeed,
}

impl ProjectileKind {
    /// Damage dealt on a direct hit.
    #[must_use]
    pub const fn damage(self) -> u32 {
        match self {
            ProjectileKind::Pea => 25,
            ProjectileKind::Ice => 20,
            ProjectileKind::Melon => 80,
            ProjectileKind::Spike | ProjectileKind::DandelionSeed => 30,
        }
    }

    /// Distance covered per tick.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            ProjectileKind::Pea | ProjectileKind::Ice => 0.09,
            ProjectileKind::Melon | ProjectileKind::DandelionSeed => 0.06,
            ProjectileKind::Spike => 0.12,
        }
    }

    /// Distance below which a candidate counts as hit.
    #[must_use]
    pub const fn hit_radius(self) -> f32 {
        match self {
            ProjectileKind::Melon => MELON_IMPACT_RANGE,
            _ => 0.5,
        }
    }

    /// Whether hit candidates come from the projectile's row only.
    #[must_use]
    pub const fn row_restricted(self) -> bool {
        matches!(
            self,
            ProjectileKind::Pea | ProjectileKind::Ice | ProjectileKind::Melon
        )
    }

    /// Lifetime in ticks for kinds that expire on their own.
    #[must_use]
    pub const fn lifetime(self) -> Option<u32> {
        match self {
            ProjectileKind::DandelionSeed => Some(300),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_parses_from_its_name() {
        for kind in PlantKind::ALL {
            assert_eq!(kind.as_str().parse::<PlantKind>(), Ok(kind));
        }
    }

    #[test]
    fn parsing_accepts_dashes_and_case() {
        assert_eq!("Pea-Shooter".parse::<PlantKind>(), Ok(PlantKind::PeaShooter));
    }

    #[test]
    fn parsing_rejects_unknown_names() {
        assert!("triffid".parse::<PlantKind>().is_err());
    }

    #[test]
    fn only_blasting_plants_are_one_shot() {
        let one_shot: Vec<_> = PlantKind::ALL
            .into_iter()
            .filter(|kind| kind.is_one_shot())
            .collect();
        assert_eq!(one_shot, vec![PlantKind::CherryBomb, PlantKind::Cucumber]);
    }

    #[test]
    fn shooters_have_attack_profiles() {
        for kind in PlantKind::ALL {
            let fires = kind.projectile().is_some() || kind == PlantKind::LightningFlower;
            assert_eq!(kind.attack().is_some(), fires, "{kind} attack profile mismatch");
        }
    }

    #[test]
    fn fast_wave_zombies_carry_heavier_armor() {
        assert_eq!(ZombieKind::Normal.armor(false), 200);
        assert_eq!(ZombieKind::Normal.armor(true), 300);
    }

    #[test]
    fn spikes_and_seeds_are_omnidirectional() {
        assert!(!ProjectileKind::Spike.row_restricted());
        assert!(!ProjectileKind::DandelionSeed.row_restricted());
        assert!(ProjectileKind::Pea.row_restricted());
    }
}
