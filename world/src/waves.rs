//! Wave pacing, weighted spawn selection and score-gated boss fights.

use endless_assault_core::{boss_name, EnemyKind, Event, SoundCue, Vec2, WaveTuning, WeaponKind};
use tracing::info;

use crate::{
    effects::{notify, shake, sound},
    enemies,
    geometry::unit,
    rng::SimRng,
    World,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct WaveState {
    pub(crate) wave: u32,
    /// Seconds left in the cooldown before the next wave starts.
    pub(crate) timer: f32,
    pub(crate) active: bool,
    pub(crate) quota: u32,
    pub(crate) spawned: u32,
}

impl WaveState {
    pub(crate) fn new(tuning: &WaveTuning) -> Self {
        Self {
            wave: 0,
            timer: tuning.first_wave_delay,
            active: false,
            quota: 0,
            spawned: 0,
        }
    }
}

/// Runs the wave cycle and the combo timer for one tick.
pub(crate) fn update(world: &mut World, dt: f32, out: &mut Vec<Event>) {
    if !world.waves.active {
        world.waves.timer -= dt;
        if world.waves.timer <= 0.0 {
            start_wave(world, out);
        }
    }

    let state = world.waves;
    let room = world.enemies.len() < world.tuning.capacity.max_enemies;
    if state.active && state.spawned < state.quota && room {
        let config = &world.tuning.waves;
        let rate = config.spawn_rate_base + config.spawn_rate_per_wave * state.wave as f32;
        let distance = config.view_range + config.spawn_margin;
        if world.rng.chance(rate * dt * 10.0) {
            let picked = pick_kind(&mut world.rng, state.wave, config);
            if let Some(kind) = picked {
                let position = ring_point(&mut world.rng, world.player.position, distance);
                let _ = enemies::spawn_enemy(world, kind, position, out);
                world.waves.spawned += 1;
            }
        }
    }

    let state = world.waves;
    if state.active && state.spawned >= state.quota && world.enemies.is_empty() {
        world.waves.active = false;
        world.waves.timer = world.tuning.waves.cooldown;
        out.push(Event::WaveCleared { wave: state.wave });
        info!(wave = state.wave, kills = world.score.kills, "wave cleared");
    }

    if let Some(combo) = world.score.tick_combo(dt) {
        out.push(Event::ComboExpired { combo });
    }
}

fn start_wave(world: &mut World, out: &mut Vec<Event>) {
    let config = &world.tuning.waves;
    let wave = world.waves.wave + 1;
    let planned = config.base_quota + wave * 2 + wave / 2;
    let free = world
        .tuning
        .capacity
        .max_enemies
        .saturating_sub(world.enemies.len());
    let quota = planned.min(u32::try_from(free).unwrap_or(u32::MAX));

    if config.emphasis_every > 0 && wave % config.emphasis_every == 0 {
        notify(out, format!("WAVE {wave} - MASSIVE ASSAULT!"), 2.5);
    } else {
        notify(out, format!("Wave {wave}"), 1.2);
    }
    world.waves = WaveState {
        wave,
        timer: 0.0,
        active: true,
        quota,
        spawned: 0,
    };
    out.push(Event::WaveStarted { wave, quota });
    info!(wave, quota, "wave started");
}

/// Weighted pick among kinds already introduced; kinds introduced within the
/// recency window are favoured.
fn pick_kind(rng: &mut SimRng, wave: u32, config: &WaveTuning) -> Option<EnemyKind> {
    let candidates: Vec<EnemyKind> = EnemyKind::ALL
        .into_iter()
        .filter(|kind| kind.spec().min_wave <= wave)
        .collect();
    let weights: Vec<u32> = candidates
        .iter()
        .map(|kind| {
            if wave - kind.spec().min_wave < config.recency_window {
                config.recency_weight
            } else {
                1
            }
        })
        .collect();
    rng.weighted(&weights)
        .and_then(|index| candidates.get(index).copied())
}

fn ring_point(rng: &mut SimRng, center: Vec2, distance: f32) -> Vec2 {
    center + unit(rng.angle()) * distance
}

/// Starts a boss fight when the score has reached the next weapon threshold.
pub(crate) fn check_weapon_unlocks(world: &mut World, out: &mut Vec<Event>) {
    if let Some(reward) = world.score.next_unlock() {
        world.score.boss_target = Some(reward);
        spawn_boss(world, reward, out);
    }
}

fn spawn_boss(world: &mut World, reward: WeaponKind, out: &mut Vec<Event>) {
    let config = &world.tuning.waves;
    let tier = reward.index();
    let kind = EnemyKind::from_index_saturating((tier as f32 * config.boss_kind_step).floor() as usize);
    let hp = config.boss_base_hp + config.boss_hp_per_tier * tier as f32;
    let distance = config.view_range + config.boss_margin;
    let name = boss_name(reward);

    let position = ring_point(&mut world.rng, world.player.position, distance);
    let enemy = enemies::spawn_boss(world, kind, name, hp, position, out);

    notify(out, format!("BOSS: {name}!"), 3.0);
    sound(out, SoundCue::BossSpawn, 1.0);
    shake(out, 10.0);
    out.push(Event::BossSpawned {
        enemy,
        name,
        reward,
    });
    info!(boss = name, ?kind, hp, reward = reward.spec().name, "boss spawned");
}
