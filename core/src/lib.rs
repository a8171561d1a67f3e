#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Endless Assault engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! happened. Presentation side effects (sounds, particles, screen shake,
//! notifications) travel as [`Effect`] values wrapped in [`Event::Effect`], so
//! the simulation never depends on a renderer or an audio backend.

use std::{fmt, time::Duration};

pub use glam::Vec2;

mod catalog;
mod tuning;

pub use catalog::{
    boss_name, Behavior, BulletTraits, Capabilities, ChainSpec, EnemyKind, EnemySpec, Trigger,
    WeaponKind, WeaponSpec, BOSS_NAMES,
};
pub use tuning::{
    CapacityTuning, CombatTuning, EnemyTuning, FrameTuning, PlayerTuning, Tuning, TuningError,
    WaveTuning,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Endless Assault. Hold the line.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one frame using the polled input intents.
    Tick {
        /// Wall-clock time that elapsed since the previous frame. The world
        /// clamps it to the configured maximum frame step.
        dt: Duration,
        /// Input intents polled by the adapter for this frame.
        input: InputIntents,
    },
    /// Requests that a regular enemy of the provided kind enter the world.
    SpawnEnemy {
        /// Kind of enemy to create.
        kind: EnemyKind,
        /// World position the enemy appears at.
        position: Vec2,
    },
    /// Adds a static obstacle to the environmental collision index.
    PlaceObstacle {
        /// Kind of obstacle to place.
        kind: ObstacleKind,
        /// World position of the obstacle centre.
        position: Vec2,
    },
    /// Routes externally sourced damage to an enemy through the regular damage path.
    InflictDamage {
        /// Handle of the enemy receiving the damage.
        enemy: EnemyId,
        /// Amount of damage to apply.
        amount: f32,
        /// Direction of travel of the damage source, in radians.
        angle: f32,
    },
    /// Restores a fresh run while keeping tuning, terrain and obstacles.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Clamped simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the world.
    EnemySpawned {
        /// Handle assigned to the enemy.
        enemy: EnemyId,
        /// Kind of the spawned enemy.
        kind: EnemyKind,
        /// Position the enemy spawned at.
        position: Vec2,
    },
    /// Reports that an enemy spawn request was rejected.
    EnemySpawnRejected {
        /// Kind of enemy requested.
        kind: EnemyKind,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Reports damage that reached an enemy.
    EnemyDamaged {
        /// Handle of the damaged enemy.
        enemy: EnemyId,
        /// Damage taken by hit points.
        hp_damage: f32,
        /// Damage absorbed by the enemy shield.
        shield_damage: f32,
    },
    /// Announces that an enemy shield was depleted.
    ShieldBroken {
        /// Handle of the enemy whose shield broke.
        enemy: EnemyId,
    },
    /// Confirms that an enemy died and was scored.
    EnemyKilled {
        /// Handle of the enemy that died.
        enemy: EnemyId,
        /// Kind of the enemy that died.
        kind: EnemyKind,
        /// Whether the enemy was a boss.
        boss: bool,
        /// Points awarded for the kill after multipliers.
        points: u32,
        /// Combo count after the kill was registered.
        combo: u32,
    },
    /// Reports damage applied to the player.
    PlayerDamaged {
        /// Damage that reached hit points.
        hp_damage: f32,
        /// Damage absorbed by the shield.
        shield_damage: f32,
    },
    /// Announces that the player survived lethal damage through the second wind.
    SecondWind,
    /// Confirms that the player fired the current weapon.
    WeaponFired {
        /// Weapon that fired.
        weapon: WeaponKind,
        /// Number of bullets that entered the world.
        bullets: u32,
    },
    /// Confirms that the player equipped a different weapon.
    WeaponSwitched {
        /// Newly equipped weapon.
        weapon: WeaponKind,
    },
    /// Announces that the current weapon began reloading.
    ReloadStarted {
        /// Weapon being reloaded.
        weapon: WeaponKind,
    },
    /// Announces that the current weapon finished reloading.
    ReloadFinished {
        /// Weapon that was reloaded.
        weapon: WeaponKind,
    },
    /// Announces that the player started a dodge roll.
    DodgeStarted {
        /// Direction of the roll in radians.
        angle: f32,
    },
    /// Announces that the player released the shockwave special ability.
    ShockwaveReleased {
        /// Number of enemies caught inside the radius.
        enemies_hit: u32,
    },
    /// Reports that a bullet could not be created because the store is full.
    BulletRejected,
    /// Announces that a destructible barrel exploded.
    BarrelExploded {
        /// Position of the barrel.
        position: Vec2,
    },
    /// Announces that the player collected a pickup.
    PickupCollected {
        /// Kind of pickup collected.
        kind: PickupKind,
        /// Amount restored before clamping.
        amount: f32,
    },
    /// Announces that a new wave began.
    WaveStarted {
        /// Number of the wave that started.
        wave: u32,
        /// Number of enemies the wave will spawn.
        quota: u32,
    },
    /// Announces that every enemy of the active wave was spawned and defeated.
    WaveCleared {
        /// Number of the wave that was cleared.
        wave: u32,
    },
    /// Announces that a boss entered the world.
    BossSpawned {
        /// Handle of the boss enemy.
        enemy: EnemyId,
        /// Display name of the boss.
        name: &'static str,
        /// Weapon unlocked once the boss dies.
        reward: WeaponKind,
    },
    /// Announces that a weapon tier became available.
    WeaponUnlocked {
        /// Weapon that was unlocked.
        weapon: WeaponKind,
    },
    /// Announces that the combo timed out.
    ComboExpired {
        /// Combo count that was lost.
        combo: u32,
    },
    /// Reports deferred damage entries discarded by the drain round cap.
    PendingDamageDiscarded {
        /// Number of entries that were dropped.
        entries: u32,
    },
    /// Fire-and-forget presentation request.
    Effect(Effect),
}

/// Presentation side effects requested by the simulation.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Plays a sound cue.
    Sound {
        /// Cue to play.
        cue: SoundCue,
        /// Playback volume in the range 0.0..=1.0.
        volume: f32,
    },
    /// Emits a burst of generic particles.
    Particles {
        /// Visual family of the particles.
        kind: ParticleKind,
        /// Emission origin.
        position: Vec2,
        /// Number of particles requested.
        count: u32,
    },
    /// Spawns an explosion visual.
    Explosion {
        /// Centre of the explosion.
        position: Vec2,
        /// Radius of the explosion.
        radius: f32,
    },
    /// Sprays blood away from an impact.
    BloodSpray {
        /// Impact position.
        position: Vec2,
        /// Spray direction in radians.
        angle: f32,
        /// Relative spray intensity.
        intensity: f32,
    },
    /// Flashes the muzzle of a firing weapon.
    MuzzleFlash {
        /// Muzzle position.
        position: Vec2,
        /// Firing direction in radians.
        angle: f32,
    },
    /// Ejects a spent shell casing.
    ShellCasing {
        /// Ejection position.
        position: Vec2,
        /// Firing direction in radians.
        angle: f32,
        /// Relative casing size.
        size: f32,
    },
    /// Draws a lightning arc between two chained targets.
    Lightning {
        /// Start of the arc.
        from: Vec2,
        /// End of the arc.
        to: Vec2,
    },
    /// Dissolves a target killed by a disintegrating bullet.
    Disintegration {
        /// Position of the target.
        position: Vec2,
    },
    /// Expanding ring of the player shockwave.
    Shockwave {
        /// Centre of the shockwave.
        position: Vec2,
    },
    /// Healing glow over a healed enemy.
    HealPulse {
        /// Position of the healed enemy.
        position: Vec2,
    },
    /// Adds camera shake.
    Shake {
        /// Shake magnitude in screen units.
        magnitude: f32,
    },
    /// Shows a transient notification banner.
    Notification {
        /// Banner text.
        text: String,
        /// Display time in seconds.
        duration: f32,
    },
}

/// Sound cues the simulation may request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Pistol shot.
    Pistol,
    /// Submachine gun shot.
    Smg,
    /// Shotgun blast.
    Shotgun,
    /// Assault rifle shot.
    Rifle,
    /// Minigun burst.
    Minigun,
    /// Rocket launch.
    Rocket,
    /// Plasma bolt.
    Plasma,
    /// Tesla arc.
    Tesla,
    /// Railgun discharge.
    Railgun,
    /// BFG discharge.
    Bfg,
    /// Disintegrator beam.
    Disintegrator,
    /// Bullet hitting flesh.
    Hit,
    /// Bullet absorbed by a shield.
    ShieldHit,
    /// Shield depleted.
    ShieldBreak,
    /// Regular enemy death.
    Death,
    /// Boss death.
    BossDeath,
    /// Boss arrival.
    BossSpawn,
    /// Weapon unlocked.
    Unlock,
    /// Pickup collected.
    Pickup,
    /// Player shockwave.
    Shockwave,
}

/// Visual families used by [`Effect::Particles`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    /// Water splash under a moving entity.
    Splash,
    /// Smoke puff left by a dodge roll.
    Smoke,
    /// Bullet trail.
    Trail,
    /// Bright beam trail.
    Beam,
    /// Shards of a broken shield.
    ShieldShards,
}

/// Unique handle assigned to an enemy.
///
/// Handles carry a generation so a handle to a removed enemy never aliases a
/// newer enemy that reuses the same slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId {
    index: u32,
    generation: u32,
}

impl EnemyId {
    /// Creates a handle from a slot index and its generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index referenced by the handle.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Relative weapon cycling direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponCycle {
    /// Select the previous unlocked weapon, wrapping around.
    Previous,
    /// Select the next unlocked weapon, wrapping around.
    Next,
}

/// Input snapshot polled by adapters before each tick.
///
/// `*_pressed` fields are edges: the first system that acts on an edge
/// consumes it through the matching `take_*` method.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputIntents {
    /// Screen-space movement axes, x to the right and y downwards, each in -1.0..=1.0.
    pub movement: Vec2,
    /// Whether the sprint modifier is held.
    pub sprint: bool,
    /// Aim target expressed in world units.
    pub aim_target: Vec2,
    /// Whether the primary trigger is held.
    pub fire_held: bool,
    /// Whether the primary trigger was pressed this frame.
    pub fire_pressed: bool,
    /// Whether the special ability trigger was pressed this frame.
    pub alt_fire_pressed: bool,
    /// Whether the reload key was pressed this frame.
    pub reload_pressed: bool,
    /// Whether the dodge key was pressed this frame.
    pub dodge_pressed: bool,
    /// Weapon requested through a direct selection key.
    pub select_weapon: Option<WeaponKind>,
    /// Relative weapon cycling request.
    pub cycle_weapon: Option<WeaponCycle>,
}

impl InputIntents {
    /// Consumes the primary trigger edge.
    pub fn take_fire_press(&mut self) -> bool {
        std::mem::take(&mut self.fire_pressed)
    }

    /// Consumes the special ability edge.
    pub fn take_alt_fire_press(&mut self) -> bool {
        std::mem::take(&mut self.alt_fire_pressed)
    }

    /// Consumes the reload edge.
    pub fn take_reload_press(&mut self) -> bool {
        std::mem::take(&mut self.reload_pressed)
    }

    /// Consumes the dodge edge.
    pub fn take_dodge_press(&mut self) -> bool {
        std::mem::take(&mut self.dodge_pressed)
    }

    /// Consumes the direct weapon selection request.
    pub fn take_weapon_selection(&mut self) -> Option<WeaponKind> {
        self.select_weapon.take()
    }

    /// Consumes the relative weapon cycling request.
    pub fn take_weapon_cycle(&mut self) -> Option<WeaponCycle> {
        self.cycle_weapon.take()
    }
}

/// Reasons an enemy spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnError {
    /// The live enemy store reached its configured capacity.
    AtCapacity,
}

/// Kinds of static obstacles in the environmental collision index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    /// Broadleaf tree.
    Tree,
    /// Pine tree.
    Pine,
    /// Small rock.
    Rock,
    /// Large boulder.
    Boulder,
    /// Explosive barrel that can be shot.
    Barrel,
}

impl ObstacleKind {
    /// Radius used to push entities out of the obstacle, if it is solid.
    #[must_use]
    pub const fn collision_radius(self) -> Option<f32> {
        match self {
            Self::Tree => Some(8.0),
            Self::Pine => Some(7.0),
            Self::Rock => Some(6.0),
            Self::Boulder => Some(14.0),
            Self::Barrel => None,
        }
    }
}

/// Kinds of pickups dropped by enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PickupKind {
    /// Restores player hit points.
    Health,
    /// Restores player shield.
    Shield,
}

/// Terrain classification of a world position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerrainKind {
    /// Open grassland.
    Grass,
    /// Light forest floor.
    Dirt,
    /// Beach next to water.
    Sand,
    /// Dense forest floor.
    Dark,
    /// River water; slows movement.
    Water,
    /// Elevated ground.
    Hill,
}

/// Answers which terrain occupies a world position.
///
/// Implementations must be pure: the same position always yields the same
/// terrain for the lifetime of the implementation.
pub trait TerrainQuery: fmt::Debug {
    /// Returns the terrain kind at the provided world position.
    fn terrain_at(&self, position: Vec2) -> TerrainKind;
}

/// Terrain that reports the same kind everywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformTerrain(pub TerrainKind);

impl TerrainQuery for UniformTerrain {
    fn terrain_at(&self, _position: Vec2) -> TerrainKind {
        self.0
    }
}

/// Adapts a plain function into a [`TerrainQuery`].
#[derive(Clone, Copy)]
pub struct TerrainFn<F>(pub F);

impl<F> fmt::Debug for TerrainFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TerrainFn")
    }
}

impl<F> TerrainQuery for TerrainFn<F>
where
    F: Fn(Vec2) -> TerrainKind,
{
    fn terrain_at(&self, position: Vec2) -> TerrainKind {
        (self.0)(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_edges_are_consumed_once() {
        let mut input = InputIntents {
            fire_pressed: true,
            dodge_pressed: true,
            select_weapon: Some(WeaponKind::Uzi),
            ..InputIntents::default()
        };

        assert!(input.take_fire_press());
        assert!(!input.take_fire_press());
        assert!(input.take_dodge_press());
        assert!(!input.take_dodge_press());
        assert_eq!(input.take_weapon_selection(), Some(WeaponKind::Uzi));
        assert_eq!(input.take_weapon_selection(), None);
    }

    #[test]
    fn barrels_are_not_solid() {
        assert_eq!(ObstacleKind::Barrel.collision_radius(), None);
        assert_eq!(ObstacleKind::Boulder.collision_radius(), Some(14.0));
    }

    #[test]
    fn terrain_fn_delegates_to_closure() {
        let terrain = TerrainFn(|position: Vec2| {
            if position.x < 0.0 {
                TerrainKind::Water
            } else {
                TerrainKind::Grass
            }
        });

        assert_eq!(terrain.terrain_at(Vec2::new(-5.0, 0.0)), TerrainKind::Water);
        assert_eq!(terrain.terrain_at(Vec2::new(5.0, 0.0)), TerrainKind::Grass);
        assert_eq!(
            UniformTerrain(TerrainKind::Hill).terrain_at(Vec2::ZERO),
            TerrainKind::Hill
        );
    }

    #[test]
    fn enemy_ids_order_by_slot_then_generation() {
        let mut ids = vec![EnemyId::new(2, 0), EnemyId::new(1, 3), EnemyId::new(1, 1)];
        ids.sort();
        assert_eq!(
            ids,
            vec![EnemyId::new(1, 1), EnemyId::new(1, 3), EnemyId::new(2, 0)]
        );
    }
}
