//! Instant effects: lightning chains, detonations and cart collisions.

use lane_defence_core::{
    Cart, CartState, CellCoord, DamageSource, Event, FireIntent, PlantId, PlantKind,
    CART_COLLISION_RANGE, CHERRY_BOMB_DAMAGE, CUCUMBER_DEATH_CHANCE, CUCUMBER_SPRAY_TICKS,
    CUCUMBER_STUN_TICKS, LIGHTNING_CHAIN_CHANCE, LIGHTNING_CHAIN_JUMPS, LIGHTNING_CHAIN_RADIUS,
    LIGHTNING_DAMAGE,
};
use rand::Rng;
use tracing::debug;

use crate::{strike, CombatScene};

/// Columns past the last lawn column at which a rolling cart is retired.
const CART_EXIT_MARGIN: f32 = 2.0;

pub(crate) fn strike_lightning<R: Rng + ?Sized>(
    intent: &FireIntent,
    scene: &mut CombatScene<'_>,
    rng: &mut R,
    out: &mut Vec<Event>,
) {
    let Some(first) = intent
        .target
        .and_then(|id| scene.position_of(id))
        .filter(|position| scene.targetable(*position))
    else {
        return;
    };

    let mut struck = vec![first];
    let _ = strike(
        &mut scene.zombies[first],
        LIGHTNING_DAMAGE,
        DamageSource::Lightning,
        rng,
        out,
    );

    let mut current = first;
    for _ in 0..LIGHTNING_CHAIN_JUMPS {
        if rng.gen::<f32>() >= LIGHTNING_CHAIN_CHANCE {
            break;
        }
        let Some(next) = next_link(scene, current, &struck) else {
            break;
        };
        let _ = strike(
            &mut scene.zombies[next],
            LIGHTNING_DAMAGE,
            DamageSource::Lightning,
            rng,
            out,
        );
        struck.push(next);
        current = next;
    }

    out.push(Event::LightningStruck {
        plant: intent.plant,
        struck: struck.len() as u32,
    });
}

fn next_link(scene: &CombatScene<'_>, from: usize, struck: &[usize]) -> Option<usize> {
    let origin = &scene.zombies[from];
    let mut best: Option<(f32, usize)> = None;
    for (position, zombie) in scene.zombies.iter().enumerate() {
        if struck.contains(&position) || !zombie.is_targetable() {
            continue;
        }
        let gap = (zombie.row() as f32 - origin.row() as f32).hypot(zombie.col() - origin.col());
        if gap <= LIGHTNING_CHAIN_RADIUS && best.map_or(true, |(closest, _)| gap < closest) {
            best = Some((gap, position));
        }
    }
    best.map(|(_, position)| position)
}

pub(crate) fn detonate_area(
    plant: PlantId,
    center: CellCoord,
    scene: &mut CombatScene<'_>,
    out: &mut Vec<Event>,
) -> u32 {
    let mut affected = 0;
    for zombie in scene.zombies.iter_mut() {
        if !zombie.is_targetable() {
            continue;
        }
        let row_gap = zombie.row().abs_diff(center.row());
        let column_gap = (zombie.col().round() - center.column_f32()).abs();
        if row_gap > 1 || column_gap > 1.0 {
            continue;
        }
        let report = zombie.apply_damage(CHERRY_BOMB_DAMAGE);
        out.push(Event::ZombieHit {
            zombie: zombie.id(),
            source: DamageSource::Blast,
            damage: CHERRY_BOMB_DAMAGE,
            armor_hit: report.armor_absorbed > 0,
        });
        affected += 1;
    }

    debug!(plant = plant.get(), affected, "area detonation");
    out.push(Event::Detonated {
        plant,
        kind: PlantKind::CherryBomb,
        affected,
    });
    affected
}

pub(crate) fn detonate_full_field<R: Rng + ?Sized>(
    plant: PlantId,
    scene: &mut CombatScene<'_>,
    rng: &mut R,
    out: &mut Vec<Event>,
) -> u32 {
    let mut affected = 0;
    for zombie in scene.zombies.iter_mut() {
        if !zombie.is_targetable() {
            continue;
        }
        let id = zombie.id();
        scene.status.set_stun(id, CUCUMBER_STUN_TICKS);
        scene.status.set_spray(id, CUCUMBER_SPRAY_TICKS);
        if rng.gen::<f32>() < CUCUMBER_DEATH_CHANCE {
            scene.status.mark_for_death(id);
        }
        zombie.set_status(scene.status.flags(id));
        zombie.disengage();
        affected += 1;
    }

    debug!(plant = plant.get(), affected, "full-field detonation");
    out.push(Event::Detonated {
        plant,
        kind: PlantKind::Cucumber,
        affected,
    });
    affected
}

pub(crate) fn roll_carts(carts: &mut [Cart], scene: &mut CombatScene<'_>, out: &mut Vec<Event>) {
    let exit = scene.field.columns as f32 + CART_EXIT_MARGIN;
    for cart in carts.iter_mut() {
        if cart.state() != CartState::Rolling {
            continue;
        }
        cart.roll(exit);
        if cart.state() != CartState::Rolling {
            debug!(row = cart.row(), "cart left the lawn");
            continue;
        }
        for &position in scene.index.zombies_in_row(cart.row()) {
            let Some(zombie) = scene.zombies.get_mut(position) else {
                continue;
            };
            if zombie.row() != cart.row()
                || !zombie.is_targetable()
                || (zombie.col() - cart.col()).abs() >= CART_COLLISION_RANGE
            {
                continue;
            }
            zombie.defeat();
            out.push(Event::CartHit {
                row: cart.row(),
                zombie: zombie.id(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{zombie, Arena};
    use lane_defence_core::{ZombieId, DYING_TICKS};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn area_blast_covers_three_by_three_cells() {
        let mut arena = Arena::new(vec![
            zombie(0, 2, 4.4),
            zombie(1, 1, 3.0),
            zombie(2, 3, 5.2),
            zombie(3, 2, 5.6),
            zombie(4, 0, 4.0),
        ]);
        let mut events = Vec::new();
        let affected = detonate_area(
            PlantId::new(7),
            CellCoord::new(2, 4),
            &mut arena.scene(),
            &mut events,
        );

        assert_eq!(affected, 3);
        let defeated: Vec<bool> = arena.zombies.iter().map(|zombie| zombie.is_defeated()).collect();
        assert_eq!(defeated, vec![true, true, true, false, false]);
        assert!(events.contains(&Event::Detonated {
            plant: PlantId::new(7),
            kind: PlantKind::CherryBomb,
            affected: 3,
        }));
    }

    #[test]
    fn full_field_stuns_and_sprays_every_live_zombie() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut dying = zombie(2, 4, 1.0);
        dying.defeat();
        let _ = dying.begin_dying();
        let mut arena = Arena::new(vec![zombie(0, 0, 8.0), zombie(1, 3, 2.0), dying]);
        let mut events = Vec::new();

        let affected =
            detonate_full_field(PlantId::new(1), &mut arena.scene(), &mut rng, &mut events);

        assert_eq!(affected, 2);
        for id in [ZombieId::new(0), ZombieId::new(1)] {
            assert!(arena.status.is_stunned(id));
            assert!(arena.status.is_spraying(id));
        }
        assert!(arena.zombies[0].status().stunned);
        assert!(!arena.status.is_stunned(ZombieId::new(2)));
        assert_eq!(arena.zombies[2].dying_ticks_remaining(), Some(DYING_TICKS));
    }

    #[test]
    fn lightning_chains_only_within_radius() {
        let mut arena = Arena::new(vec![zombie(0, 2, 4.0), zombie(1, 4, 8.0)]);
        let mut events = Vec::new();
        let intent = FireIntent {
            plant: PlantId::new(3),
            kind: PlantKind::LightningFlower,
            origin: CellCoord::new(2, 0),
            target: Some(ZombieId::new(0)),
            landing_column: 4.0,
            penetrating: false,
        };
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            strike_lightning(&intent, &mut arena.scene(), &mut rng, &mut events);
        }

        assert_eq!(arena.zombies[1].health(), 150, "second zombie is out of chain range");
        assert_eq!(arena.zombies[0].health(), 0, "eight bolts of forty finish a fresh zombie");
    }

    #[test]
    fn rolling_cart_flattens_zombies_in_its_row() {
        let mut arena = Arena::new(vec![zombie(0, 1, 0.5), zombie(1, 2, 0.5)]);
        let mut carts = vec![Cart::new(1), Cart::new(2)];
        assert!(carts[0].trigger());
        let mut events = Vec::new();
        for _ in 0..30 {
            roll_carts(&mut carts, &mut arena.scene(), &mut events);
        }
        assert!(arena.zombies[0].is_defeated());
        assert!(!arena.zombies[1].is_defeated(), "parked carts do nothing");
        assert_eq!(
            events,
            vec![Event::CartHit {
                row: 1,
                zombie: ZombieId::new(0),
            }]
        );
    }
}
