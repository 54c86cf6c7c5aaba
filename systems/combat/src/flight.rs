//! Per-kind projectile kinematics and hit tests.
//!
//! Each `advance_*` function moves one projectile a single tick, resolves the
//! hits it scores and returns `true` once the projectile should be retired.

use lane_defence_core::{
    DamageSource, Event, Motion, Projectile, ProjectileKind, ZombieId, FREEZE_TICKS,
    MELON_EXPLOSION_TICKS, MELON_IMPACT_RANGE, MELON_SPLASH_DAMAGE, MELON_SPLASH_RANGE,
};
use rand::Rng;
use tracing::trace;

use crate::{strike_with, CombatScene, HitOutcome};

/// Margin past the last column before a straight shot leaves the lawn.
const LINEAR_EXIT_MARGIN: f32 = 0.5;
/// Margin around the lawn that free-flying shots may roam before retiring.
const FREE_FLIGHT_MARGIN: f32 = 1.0;
/// Column distance at which a lobbed shot counts as landing on a portal.
const PORTAL_LANDING_RANGE: f32 = 0.5;

/// Unit vector from `from` to `to` as `(rows, columns)`, or `fallback` when
/// both points coincide.
pub(crate) fn heading_between(
    from: (f32, f32),
    to: (f32, f32),
    fallback: (f32, f32),
) -> (f32, f32) {
    let delta = (to.0 - from.0, to.1 - from.1);
    let length = delta.0.hypot(delta.1);
    if length <= f32::EPSILON {
        fallback
    } else {
        (delta.0 / length, delta.1 / length)
    }
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

fn source_of(kind: ProjectileKind) -> DamageSource {
    DamageSource::Projectile(kind)
}

/// Pea and ice flight: straight along the row, relayed once through a
/// crossed portal.
pub(crate) fn advance_linear<R: Rng + ?Sized>(
    projectile: &mut Projectile,
    scene: &mut CombatScene<'_>,
    rng: &mut R,
    out: &mut Vec<Event>,
) -> bool {
    let from = projectile.col();
    let to = from + projectile.kind().speed();
    let may_relay = matches!(projectile.motion(), Motion::Linear { teleported: false });
    projectile.set_position(projectile.row(), to);

    if let (true, Some(portals), Some(lane)) = (may_relay, scene.portals, projectile.lane()) {
        if let Some(entry) = portals.crossed(lane, from, to) {
            if let Some(exit) = portals.exit_for(entry.id()) {
                projectile.set_position(exit.row() as f32, exit.column());
                *projectile.motion_mut() = Motion::Linear { teleported: true };
                trace!(
                    projectile = projectile.id().get(),
                    from = entry.id().get(),
                    to = exit.id().get(),
                    "shot relayed through portal"
                );
            }
        }
    }

    if let Some(position) = nearest_in_lane(projectile, scene, projectile.kind().hit_radius()) {
        let kind = projectile.kind();
        let damage = projectile.damage();
        let zombie = &mut scene.zombies[position];
        let outcome = strike_with(projectile, zombie, damage, source_of(kind), rng, out);
        if kind == ProjectileKind::Ice && outcome == HitOutcome::Hit {
            let id = zombie.id();
            scene.status.set_freeze(id, FREEZE_TICKS);
            zombie.set_status(scene.status.flags(id));
            out.push(Event::ZombieFrozen { zombie: id });
        }
        if outcome != HitOutcome::Missed && !projectile.is_penetrating() {
            return true;
        }
    }

    projectile.col() > scene.field.columns as f32 + LINEAR_EXIT_MARGIN
}

fn nearest_in_lane(projectile: &Projectile, scene: &CombatScene<'_>, radius: f32) -> Option<usize> {
    let lane = projectile.lane()?;
    let mut best: Option<(f32, usize)> = None;
    for &position in scene.index.zombies_in_row(lane) {
        let Some(zombie) = scene.zombies.get(position) else {
            continue;
        };
        if zombie.row() != lane || !zombie.is_targetable() || projectile.has_hit(zombie.id()) {
            continue;
        }
        let gap = (zombie.col() - projectile.col()).abs();
        if gap >= radius {
            continue;
        }
        if best.map_or(true, |(closest, _)| gap < closest) {
            best = Some((gap, position));
        }
    }
    best.map(|(_, position)| position)
}

/// Melon flight: interpolates between the launch and landing columns, then
/// hits, splashes and lingers for the explosion visual.
pub(crate) fn advance_ballistic<R: Rng + ?Sized>(
    projectile: &mut Projectile,
    scene: &mut CombatScene<'_>,
    rng: &mut R,
    out: &mut Vec<Event>,
) -> bool {
    let Motion::Ballistic {
        from_column,
        to_column,
        progress,
        target,
        explosion,
    } = projectile.motion().clone()
    else {
        return true;
    };

    if let Some(remaining) = explosion {
        let remaining = remaining.saturating_sub(1);
        set_explosion(projectile, remaining);
        return remaining == 0;
    }

    let span = (to_column - from_column).abs();
    let progress = if span <= f32::EPSILON {
        1.0
    } else {
        (progress + ProjectileKind::Melon.speed() / span).min(1.0)
    };
    let column = from_column + (to_column - from_column) * progress;
    projectile.set_position(projectile.row(), column);
    if let Motion::Ballistic { progress: stored, .. } = projectile.motion_mut() {
        *stored = progress;
    }
    if progress < 1.0 {
        return false;
    }

    let impact = landing_point(projectile, scene, target);
    projectile.set_position(impact.0 as f32, impact.1);
    splash(projectile, scene, impact, rng, out);
    set_explosion(projectile, MELON_EXPLOSION_TICKS);
    false
}

fn set_explosion(projectile: &mut Projectile, ticks: u32) {
    if let Motion::Ballistic { explosion, .. } = projectile.motion_mut() {
        *explosion = Some(ticks);
    }
}

/// Where a landed melon bursts. A melon landing on an active portal bursts at
/// the zombie it was aimed at, which the portal put out of direct reach.
fn landing_point(
    projectile: &Projectile,
    scene: &CombatScene<'_>,
    target: Option<ZombieId>,
) -> (u32, f32) {
    let lane = projectile.lane().unwrap_or_default();
    let here = (lane, projectile.col());
    let Some(portals) = scene.portals else {
        return here;
    };
    let on_portal = portals.active().any(|portal| {
        portal.row() == lane && (portal.column() - projectile.col()).abs() < PORTAL_LANDING_RANGE
    });
    if !on_portal {
        return here;
    }
    target
        .and_then(|id| scene.position_of(id))
        .filter(|position| scene.targetable(*position))
        .map_or(here, |position| {
            let zombie = &scene.zombies[position];
            (zombie.row(), zombie.col())
        })
}

fn splash<R: Rng + ?Sized>(
    projectile: &mut Projectile,
    scene: &mut CombatScene<'_>,
    (row, column): (u32, f32),
    rng: &mut R,
    out: &mut Vec<Event>,
) {
    let mut primary: Option<(f32, usize)> = None;
    for &position in scene.index.zombies_in_row(row) {
        let zombie = &scene.zombies[position];
        if zombie.row() != row || !zombie.is_targetable() {
            continue;
        }
        let gap = (zombie.col() - column).abs();
        if gap < MELON_IMPACT_RANGE && primary.map_or(true, |(closest, _)| gap < closest) {
            primary = Some((gap, position));
        }
    }
    if let Some((_, position)) = primary {
        let damage = projectile.damage();
        let _ = strike_with(
            projectile,
            &mut scene.zombies[position],
            damage,
            source_of(ProjectileKind::Melon),
            rng,
            out,
        );
    }

    let rows = row.saturating_sub(1)..=row.saturating_add(1);
    let mut caught = Vec::new();
    for lane in rows {
        for &position in scene.index.zombies_in_row(lane) {
            let zombie = &scene.zombies[position];
            if zombie.row() == lane && (zombie.col() - column).abs() <= MELON_SPLASH_RANGE {
                caught.push(position);
            }
        }
    }
    for position in caught {
        let _ = strike_with(
            projectile,
            &mut scene.zombies[position],
            MELON_SPLASH_DAMAGE,
            DamageSource::Splash,
            rng,
            out,
        );
    }
}

/// Spike and seed flight: free movement in both axes toward a tracked zombie.
pub(crate) fn advance_tracking<R: Rng + ?Sized>(
    projectile: &mut Projectile,
    scene: &mut CombatScene<'_>,
    rng: &mut R,
    out: &mut Vec<Event>,
) -> bool {
    let here = (projectile.row(), projectile.col());
    let view: &CombatScene<'_> = scene;
    let live_target = |target: Option<ZombieId>| {
        target
            .and_then(|id| view.position_of(id))
            .filter(|position| view.targetable(*position))
    };

    let (target, heading) = match projectile.motion().clone() {
        Motion::Homing { target, heading } => {
            let tracked = live_target(target).or_else(|| nearest_anywhere(view, here));
            (tracked, heading)
        }
        Motion::Drift {
            target,
            heading,
            lifetime,
        } => {
            let lifetime = lifetime.saturating_sub(1);
            if let Motion::Drift { lifetime: stored, .. } = projectile.motion_mut() {
                *stored = lifetime;
            }
            if lifetime == 0 {
                return true;
            }
            (live_target(target), heading)
        }
        Motion::Linear { .. } | Motion::Ballistic { .. } => return true,
    };

    let heading = target.map_or(heading, |position| {
        let zombie = &scene.zombies[position];
        heading_between(here, (zombie.row() as f32, zombie.col()), heading)
    });
    let tracked_id = target.map(|position| scene.zombies[position].id());
    match projectile.motion_mut() {
        Motion::Homing {
            target: stored,
            heading: stored_heading,
        } => {
            *stored = tracked_id;
            *stored_heading = heading;
        }
        Motion::Drift {
            heading: stored_heading,
            ..
        } => *stored_heading = heading,
        Motion::Linear { .. } | Motion::Ballistic { .. } => {}
    }

    let speed = projectile.kind().speed();
    let next = (here.0 + heading.0 * speed, here.1 + heading.1 * speed);
    projectile.set_position(next.0, next.1);

    let radius = projectile.kind().hit_radius();
    let mut struck: Option<(f32, usize)> = None;
    for (position, zombie) in scene.zombies.iter().enumerate() {
        if !zombie.is_targetable() || projectile.has_hit(zombie.id()) {
            continue;
        }
        let gap = distance(next, (zombie.row() as f32, zombie.col()));
        if gap < radius && struck.map_or(true, |(closest, _)| gap < closest) {
            struck = Some((gap, position));
        }
    }
    if let Some((_, position)) = struck {
        let kind = projectile.kind();
        let damage = projectile.damage();
        let outcome = strike_with(
            projectile,
            &mut scene.zombies[position],
            damage,
            source_of(kind),
            rng,
            out,
        );
        if outcome != HitOutcome::Missed {
            return true;
        }
    }

    let rows = scene.field.rows as f32;
    let columns = scene.field.columns as f32;
    next.1 < -FREE_FLIGHT_MARGIN
        || next.1 > columns + FREE_FLIGHT_MARGIN
        || next.0 < -FREE_FLIGHT_MARGIN
        || next.0 > rows
}

fn nearest_anywhere(scene: &CombatScene<'_>, from: (f32, f32)) -> Option<usize> {
    let mut best: Option<(f32, usize)> = None;
    for (position, zombie) in scene.zombies.iter().enumerate() {
        if !zombie.is_targetable() {
            continue;
        }
        let gap = distance(from, (zombie.row() as f32, zombie.col()));
        if best.map_or(true, |(closest, _)| gap < closest) {
            best = Some((gap, position));
        }
    }
    best.map(|(_, position)| position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{zombie, Arena};
    use lane_defence_core::{CellCoord, PlantId, ProjectileId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn heading_is_normalised_or_falls_back() {
        let heading = heading_between((0.0, 0.0), (3.0, 4.0), (0.0, 1.0));
        assert!((heading.0 - 0.6).abs() < 1e-6);
        assert!((heading.1 - 0.8).abs() < 1e-6);
        assert_eq!(heading_between((1.0, 1.0), (1.0, 1.0), (0.0, 1.0)), (0.0, 1.0));
    }

    #[test]
    fn melon_lands_hits_primary_and_splashes_neighbours() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut arena = Arena::new(vec![
            zombie(0, 2, 4.0),
            zombie(1, 2, 4.6),
            zombie(2, 1, 4.2),
            zombie(3, 4, 4.0),
        ]);
        let mut melon = Projectile::ballistic(
            ProjectileId::new(0),
            PlantId::new(0),
            CellCoord::new(2, 1),
            4.0,
            Some(ZombieId::new(0)),
        );
        let mut events = Vec::new();
        let mut landed = false;
        for _ in 0..200 {
            let mut scene = arena.scene();
            let _ = advance_ballistic(&mut melon, &mut scene, &mut rng, &mut events);
            if let Motion::Ballistic {
                explosion: Some(_), ..
            } = melon.motion()
            {
                landed = true;
                break;
            }
        }
        assert!(landed);

        let health: Vec<u32> = arena.zombies.iter().map(|zombie| zombie.health()).collect();
        assert_eq!(health, vec![70, 110, 110, 150], "primary takes the impact only once");
    }

    #[test]
    fn melon_is_retired_after_explosion_visual() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut arena = Arena::new(Vec::new());
        let mut melon = Projectile::ballistic(
            ProjectileId::new(0),
            PlantId::new(0),
            CellCoord::new(0, 3),
            3.0,
            None,
        );
        let mut events = Vec::new();
        let mut scene = arena.scene();
        assert!(!advance_ballistic(&mut melon, &mut scene, &mut rng, &mut events));
        for _ in 1..MELON_EXPLOSION_TICKS {
            assert!(!advance_ballistic(&mut melon, &mut scene, &mut rng, &mut events));
        }
        assert!(advance_ballistic(&mut melon, &mut scene, &mut rng, &mut events));
    }

    #[test]
    fn spike_retargets_after_its_target_dies() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut arena = Arena::new(vec![zombie(0, 0, 3.0), zombie(1, 3, 3.0)]);
        arena.zombies[0].defeat();
        let mut spike = Projectile::homing(
            ProjectileId::new(0),
            PlantId::new(0),
            CellCoord::new(3, 0),
            Some(ZombieId::new(0)),
        );
        let mut events = Vec::new();
        let mut retired = false;
        for _ in 0..100 {
            let mut scene = arena.scene();
            if advance_tracking(&mut spike, &mut scene, &mut rng, &mut events) {
                retired = true;
                break;
            }
        }
        assert!(retired);
        assert_eq!(arena.zombies[1].health(), 120);
    }

    #[test]
    fn seed_withers_after_its_lifetime() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut arena = Arena::new(Vec::new());
        let mut seed = Projectile::seed(
            ProjectileId::new(0),
            PlantId::new(0),
            CellCoord::new(2, 4),
            None,
            (1.0, 0.0),
        );
        let mut events = Vec::new();
        let mut scene = arena.scene();
        let mut ticks = 0;
        while !advance_tracking(&mut seed, &mut scene, &mut rng, &mut events) {
            ticks += 1;
            assert!(ticks < 400, "seed never retired");
        }
        assert!(ticks < 300);
    }
}
