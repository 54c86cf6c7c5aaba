use lane_defence_core::{Zombie, ZombieBlueprint, ZombieId, ZombieKind, ZombieTuning};
use proptest::prelude::*;

fn armored_zombie(armor_scale: bool) -> Zombie {
    Zombie::spawn(
        ZombieId::new(1),
        ZombieBlueprint {
            kind: ZombieKind::Normal,
            armored: true,
            fast: armor_scale,
            wave: armor_scale,
        },
        0,
        9.0,
        ZombieTuning::default(),
    )
}

proptest! {
    #[test]
    fn armor_absorbs_before_health(heavy in any::<bool>(), damage in 0u32..2_000) {
        let mut zombie = armored_zombie(heavy);
        let armor = zombie.armor_health();
        let health = zombie.health();

        let report = zombie.apply_damage(damage);

        if damage <= armor {
            prop_assert_eq!(zombie.health(), health);
            prop_assert_eq!(zombie.armor_health(), armor - damage);
        } else {
            prop_assert_eq!(zombie.armor_health(), 0);
            prop_assert_eq!(zombie.health(), health.saturating_sub(damage - armor));
        }
        prop_assert_eq!(report.armor_absorbed + report.health_lost, damage.min(armor + health));
    }

    #[test]
    fn split_hits_match_single_hit(first in 0u32..600, second in 0u32..600) {
        let mut split = armored_zombie(false);
        let _ = split.apply_damage(first);
        let _ = split.apply_damage(second);

        let mut single = armored_zombie(false);
        let _ = single.apply_damage(first + second);

        prop_assert_eq!(split.armor_health(), single.armor_health());
        prop_assert_eq!(split.health(), single.health());
    }

    #[test]
    fn health_never_rises_once_armor_is_gone(hits in proptest::collection::vec(1u32..120, 1..30)) {
        let mut zombie = armored_zombie(false);
        let mut previous = zombie.health();
        for damage in hits {
            let _ = zombie.apply_damage(damage);
            if zombie.armor_health() == 0 {
                prop_assert!(zombie.health() <= previous);
            }
            previous = zombie.health();
        }
    }
}
