use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use lane_defence_core::{CellCoord, Command, Event, LevelConfig, PlantKind, PortalConfig};
use lane_defence_world::{apply, query, World, WorldSnapshot};

fn busy_level(seed: u64) -> LevelConfig {
    let mut config = LevelConfig {
        seed,
        initial_sun: 2000,
        max_sun: 5000,
        giant_chance: 0.2,
        zombie_immunity_chance: 0.05,
        random_penetration_chance: 0.3,
        portals: Some(PortalConfig::default()),
        ..LevelConfig::default()
    };
    config.spawning.trickle_interval = 40;
    config
}

fn plant_defences(world: &mut World) {
    let layout = [
        (PlantKind::PeaShooter, 0, 0),
        (PlantKind::IceCactus, 1, 0),
        (PlantKind::MelonPult, 2, 0),
        (PlantKind::Cattail, 3, 0),
        (PlantKind::LightningFlower, 4, 0),
        (PlantKind::Dandelion, 0, 1),
        (PlantKind::WallNut, 2, 2),
    ];
    let mut events = Vec::new();
    for (kind, row, column) in layout {
        apply(
            world,
            Command::PlacePlant {
                kind,
                cell: CellCoord::new(row, column),
            },
            &mut events,
        );
    }
}

fn run(world: &mut World, ticks: u32) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        apply(world, Command::Tick, &mut events);
    }
    events
}

fn fingerprint(events: &[Event]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for event in events {
        format!("{event:?}").hash(&mut hasher);
    }
    hasher.finish()
}

#[test]
fn deterministic_replay_produces_identical_events() {
    let replay = |seed| {
        let mut world = World::new(busy_level(seed));
        plant_defences(&mut world);
        fingerprint(&run(&mut world, 3000))
    };

    assert_eq!(replay(0xdec0de), replay(0xdec0de), "replay diverged between runs");
}

#[test]
fn restored_world_continues_exactly_like_the_original() {
    let mut original = World::new(busy_level(0xbeef));
    plant_defences(&mut original);
    let _ = run(&mut original, 1500);

    let bytes = bincode::serialize(&original.snapshot()).expect("serialize snapshot");
    let snapshot: WorldSnapshot = bincode::deserialize(&bytes).expect("deserialize snapshot");
    assert_eq!(snapshot.tick_index(), 1500);
    let mut restored = World::restore(snapshot).expect("restore snapshot");

    assert_eq!(query::zombies(&restored), query::zombies(&original));
    assert_eq!(query::portals(&restored), query::portals(&original));

    let expected = run(&mut original, 1500);
    let actual = run(&mut restored, 1500);
    assert_eq!(actual, expected, "restored world diverged");
    assert_eq!(restored.snapshot(), original.snapshot());
}

#[test]
fn restored_portal_field_is_not_placed_again() {
    let mut world = World::new(busy_level(7));
    let _ = run(&mut world, 5);

    let mut restored = World::restore(world.snapshot()).expect("restore snapshot");
    let events = run(&mut restored, 1);

    assert!(
        !events
            .iter()
            .any(|event| matches!(event, Event::PortalSpawned { .. })),
        "portals were re-initialized: {events:?}"
    );
}
