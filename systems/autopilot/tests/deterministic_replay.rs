use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use endless_assault_core::{
    Command, EnemyKind, Event, InputIntents, TerrainKind, Tuning, UniformTerrain, Vec2, WeaponKind,
};
use endless_assault_system_autopilot::{Autopilot, PilotState, Threat};
use endless_assault_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(16);

fn pilot_state(world: &World) -> PilotState {
    let player = query::player(world);
    let score = query::score(world);
    let tuning = query::tuning(world);
    PilotState {
        position: player.position,
        weapon: player.weapon,
        magazine: player.magazine,
        reloading: player.reloading,
        special_ready: player.special_charge >= tuning.player.special_charge_cap
            && player.special_cooldown <= 0.0,
        best_unlocked: score
            .unlocked_weapons
            .last()
            .copied()
            .unwrap_or(WeaponKind::Pistol),
    }
}

fn threats(world: &World) -> Vec<Threat> {
    query::enemy_view(world)
        .iter()
        .map(|enemy| Threat {
            id: enemy.id,
            position: enemy.position,
            boss: enemy.boss_name.is_some(),
        })
        .collect()
}

fn drive(world: &mut World, autopilot: &mut Autopilot, ticks: u32) -> Vec<Event> {
    let iso_scale = query::tuning(world).frame.iso_scale;
    let mut input = InputIntents::default();
    let mut log = Vec::new();
    for _ in 0..ticks {
        autopilot.handle(&pilot_state(world), &threats(world), iso_scale, &mut input);
        world::apply(
            world,
            Command::Tick {
                dt: FRAME,
                input: input.clone(),
            },
            &mut log,
        );
    }
    log
}

fn fingerprint(events: &[Event]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for event in events {
        format!("{event:?}").hash(&mut hasher);
    }
    hasher.finish()
}

fn replay(seed: u64) -> (u64, usize, World) {
    let mut world = World::from_config(Tuning::default(), seed, UniformTerrain(TerrainKind::Grass))
        .expect("default tuning is valid");
    let mut autopilot = Autopilot::new();
    let log = drive(&mut world, &mut autopilot, 2_500);
    (fingerprint(&log), log.len(), world)
}

#[test]
fn autopilot_runs_replay_identically() {
    let (first, first_len, first_world) = replay(2024);
    let (second, second_len, second_world) = replay(2024);

    assert_eq!(first_len, second_len);
    assert_eq!(first, second, "fingerprint mismatch: {first:#x} vs {second:#x}");
    assert_eq!(query::player(&first_world), query::player(&second_world));
    assert_eq!(query::score(&first_world), query::score(&second_world));
    assert!(query::wave(&first_world).wave >= 1);
}

#[test]
fn autopilot_hunts_down_a_lone_enemy() {
    let mut tuning = Tuning::default();
    tuning.waves.first_wave_delay = 1.0e6;
    let mut world = World::from_config(tuning, 8, UniformTerrain(TerrainKind::Grass))
        .expect("valid tuning");
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Militia,
            position: Vec2::new(300.0, 120.0),
        },
        &mut events,
    );
    let mut autopilot = Autopilot::new();

    let log = drive(&mut world, &mut autopilot, 900);

    assert!(log
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { .. })));
    assert!(query::enemy_view(&world).is_empty());
    assert_eq!(query::score(&world).kills, 1);
}
