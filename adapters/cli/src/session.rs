use std::{fmt, time::Duration};

use anyhow::{Context, Result};
use endless_assault_core::{Command, Event, InputIntents, Tuning, WeaponKind};
use endless_assault_system_autopilot::{Autopilot, PilotState, Threat};
use endless_assault_system_terrain::{ChunkCoord, NoiseTerrain, ObstacleScatter, Placement};
use endless_assault_world::{self as world, query, World};
use tracing::{debug, info, trace, warn};

/// Parameters of a headless run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SessionOptions {
    pub(crate) seed: u64,
    pub(crate) ticks: u64,
    pub(crate) frame: Duration,
    /// Chunks scattered in every direction around the origin.
    pub(crate) scatter_radius: i32,
}

/// Outcome of a headless run.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RunSummary {
    pub(crate) ticks: u64,
    pub(crate) game_time: f32,
    pub(crate) wave: u32,
    pub(crate) score: u64,
    pub(crate) kills: u32,
    pub(crate) best_combo: u32,
    pub(crate) unlocked: Vec<WeaponKind>,
    pub(crate) bosses_defeated: u32,
    pub(crate) second_winds: u32,
    pub(crate) shots_fired: u64,
    pub(crate) obstacles: usize,
    pub(crate) discarded_damage: u64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unlocked = self
            .unlocked
            .iter()
            .map(|weapon| weapon.spec().name)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            f,
            "survived {:.1}s over {} ticks, reached wave {}",
            self.game_time, self.ticks, self.wave
        )?;
        writeln!(
            f,
            "score {} from {} kills, best combo {}",
            self.score, self.kills, self.best_combo
        )?;
        writeln!(
            f,
            "bosses defeated {}, second winds {}, shots fired {}",
            self.bosses_defeated, self.second_winds, self.shots_fired
        )?;
        writeln!(f, "weapons: {unlocked}")?;
        write!(
            f,
            "obstacles placed {}, discarded damage entries {}",
            self.obstacles, self.discarded_damage
        )
    }
}

#[derive(Debug, Default)]
struct Tally {
    bosses_defeated: u32,
    second_winds: u32,
    shots_fired: u64,
}

/// Builds a world over noise terrain and lets the autopilot play it.
pub(crate) fn run(tuning: Tuning, options: &SessionOptions) -> Result<RunSummary> {
    let tile_size = tuning.frame.tile_size;
    let iso_scale = tuning.frame.iso_scale;
    let terrain = NoiseTerrain::new(options.seed);
    let placements = scatter(&terrain, tile_size, options.scatter_radius);

    let mut world = World::from_config(tuning, options.seed, terrain)
        .context("failed to build the simulation world")?;
    let mut events = Vec::new();
    for placement in placements {
        world::apply(
            &mut world,
            Command::PlaceObstacle {
                kind: placement.kind,
                position: placement.position,
            },
            &mut events,
        );
    }
    let obstacles = query::obstacles(&world).len();
    info!(seed = options.seed, obstacles, "world ready");

    let mut autopilot = Autopilot::new();
    let mut input = InputIntents::default();
    let mut threats = Vec::new();
    let mut tally = Tally::default();

    for _ in 0..options.ticks {
        collect_threats(&world, &mut threats);
        autopilot.handle(&pilot_state(&world), &threats, iso_scale, &mut input);

        events.clear();
        world::apply(
            &mut world,
            Command::Tick {
                dt: options.frame,
                input: input.clone(),
            },
            &mut events,
        );
        for event in &events {
            log_event(event, &mut tally);
        }
    }

    let score = query::score(&world);
    Ok(RunSummary {
        ticks: query::tick_index(&world),
        game_time: query::game_time(&world),
        wave: query::wave(&world).wave,
        score: score.score,
        kills: score.kills,
        best_combo: score.best_combo,
        unlocked: score.unlocked_weapons,
        bosses_defeated: tally.bosses_defeated,
        second_winds: tally.second_winds,
        shots_fired: tally.shots_fired,
        obstacles,
        discarded_damage: query::discarded_damage_total(&world),
    })
}

fn scatter(terrain: &NoiseTerrain, tile_size: f32, radius: i32) -> Vec<Placement> {
    let mut system = ObstacleScatter::new();
    let mut chunk = Vec::new();
    let mut placements = Vec::new();
    for x in -radius..radius {
        for y in -radius..radius {
            system.handle(terrain, ChunkCoord::new(x, y), tile_size, &mut chunk);
            placements.extend_from_slice(&chunk);
        }
    }
    placements
}

fn collect_threats(world: &World, out: &mut Vec<Threat>) {
    out.clear();
    out.extend(query::enemy_view(world).iter().map(|enemy| Threat {
        id: enemy.id,
        position: enemy.position,
        boss: enemy.boss_name.is_some(),
    }));
}

fn pilot_state(world: &World) -> PilotState {
    let player = query::player(world);
    let cap = query::tuning(world).player.special_charge_cap;
    let best_unlocked = query::score(world)
        .unlocked_weapons
        .last()
        .copied()
        .unwrap_or(WeaponKind::Pistol);
    PilotState {
        position: player.position,
        weapon: player.weapon,
        magazine: player.magazine,
        reloading: player.reloading,
        special_ready: player.special_charge >= cap && player.special_cooldown <= 0.0,
        best_unlocked,
    }
}

fn log_event(event: &Event, tally: &mut Tally) {
    match event {
        Event::WaveStarted { wave, quota } => info!(wave, quota, "wave started"),
        Event::WaveCleared { wave } => info!(wave, "wave cleared"),
        Event::BossSpawned { name, reward, .. } => {
            info!(boss = name, reward = reward.spec().name, "boss arrived");
        }
        Event::EnemyKilled {
            kind,
            boss,
            points,
            combo,
            ..
        } => {
            if *boss {
                tally.bosses_defeated += 1;
                info!(?kind, points, "boss defeated");
            } else {
                debug!(?kind, points, combo, "enemy killed");
            }
        }
        Event::WeaponUnlocked { weapon } => info!(weapon = weapon.spec().name, "weapon unlocked"),
        Event::SecondWind => {
            tally.second_winds += 1;
            info!("second wind");
        }
        Event::WeaponFired { weapon, bullets } => {
            tally.shots_fired += 1;
            trace!(?weapon, bullets, "weapon fired");
        }
        Event::PendingDamageDiscarded { entries } => warn!(entries, "deferred damage discarded"),
        Event::TimeAdvanced { .. } | Event::Effect(_) => trace!(?event, "frame output"),
        other => debug!(event = ?other, "gameplay event"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(seed: u64, ticks: u64) -> SessionOptions {
        SessionOptions {
            seed,
            ticks,
            frame: Duration::from_millis(16),
            scatter_radius: 2,
        }
    }

    #[test]
    fn run_reports_the_ticks_it_simulated() {
        let summary = run(Tuning::default(), &options(3, 240)).expect("valid run");

        assert_eq!(summary.ticks, 240);
        assert!((summary.game_time - 240.0 * 0.016).abs() < 1e-3);
        assert!(summary.obstacles > 0);
        assert_eq!(summary.unlocked.first(), Some(&WeaponKind::Pistol));
    }

    #[test]
    fn same_seed_produces_the_same_summary() {
        let first = run(Tuning::default(), &options(77, 600)).expect("valid run");
        let second = run(Tuning::default(), &options(77, 600)).expect("valid run");

        assert_eq!(first, second);
    }

    #[test]
    fn invalid_tuning_fails_the_run() {
        let mut tuning = Tuning::default();
        tuning.capacity.max_bullets = 0;

        assert!(run(tuning, &options(1, 10)).is_err());
    }

    #[test]
    fn summary_lists_weapon_names() {
        let summary = RunSummary {
            ticks: 10,
            game_time: 0.16,
            wave: 0,
            score: 0,
            kills: 0,
            best_combo: 0,
            unlocked: vec![WeaponKind::Pistol, WeaponKind::Uzi],
            bosses_defeated: 0,
            second_winds: 0,
            shots_fired: 0,
            obstacles: 4,
            discarded_damage: 0,
        };

        let rendered = summary.to_string();
        assert!(rendered.contains(WeaponKind::Pistol.spec().name));
        assert!(rendered.contains(WeaponKind::Uzi.spec().name));
        assert!(rendered.contains("obstacles placed 4"));
    }
}
