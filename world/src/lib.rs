#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Endless Assault.
//!
//! The world owns every live entity. Adapters mutate it only through
//! [`apply`] and observe it only through the [`query`] module and the events
//! each command produces.

mod arena;
mod bullets;
mod damage;
mod decals;
mod effects;
mod enemies;
mod geometry;
mod obstacles;
mod pickups;
mod player;
mod rng;
mod scoring;
mod waves;

use std::time::Duration;

use endless_assault_core::{
    Command, Event, InputIntents, TerrainKind, TerrainQuery, Tuning, TuningError, UniformTerrain,
    WELCOME_BANNER,
};

use arena::Arena;
use bullets::Bullet;
use damage::DamageQueue;
use decals::Decals;
use enemies::Enemy;
use obstacles::Obstacles;
use pickups::Pickup;
use player::Player;
use rng::SimRng;
use scoring::ScoreState;
use waves::WaveState;

pub use bullets::BulletOwner;
pub use damage::DrainReport;

/// Seed used by [`World::new`].
pub const DEFAULT_SEED: u64 = 0x5eed_a55a_017c_0de0;
const FALLBACK_MAX_STEP: Duration = Duration::from_millis(50);

/// Complete simulation state of one run.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    tuning: Tuning,
    seed: u64,
    max_step: Duration,
    rng: SimRng,
    terrain: Box<dyn TerrainQuery>,
    obstacles: Obstacles,
    player: Player,
    enemies: Arena<Enemy>,
    bullets: Vec<Bullet>,
    pickups: Vec<Pickup>,
    decals: Decals,
    damage: DamageQueue,
    waves: WaveState,
    score: ScoreState,
    tick_index: u64,
    game_time: f32,
    discarded_damage: u64,
    last_drain: DrainReport,
}

impl World {
    /// Creates a world with default tuning on uniform grass.
    #[must_use]
    pub fn new() -> Self {
        Self::build(
            Tuning::default(),
            DEFAULT_SEED,
            Box::new(UniformTerrain(TerrainKind::Grass)),
        )
    }

    /// Creates a world from validated tuning, a random seed and a terrain source.
    ///
    /// Two worlds built from the same inputs and fed the same commands produce
    /// identical event streams.
    pub fn from_config<T>(tuning: Tuning, seed: u64, terrain: T) -> Result<Self, TuningError>
    where
        T: TerrainQuery + 'static,
    {
        tuning.validate()?;
        Ok(Self::build(tuning, seed, Box::new(terrain)))
    }

    fn build(tuning: Tuning, seed: u64, terrain: Box<dyn TerrainQuery>) -> Self {
        let max_step =
            Duration::try_from_secs_f32(tuning.frame.max_dt).unwrap_or(FALLBACK_MAX_STEP);
        Self {
            banner: WELCOME_BANNER,
            seed,
            max_step,
            rng: SimRng::from_seed(seed),
            terrain,
            obstacles: Obstacles::default(),
            player: Player::new(&tuning.player),
            enemies: Arena::new(),
            bullets: Vec::new(),
            pickups: Vec::new(),
            decals: Decals::default(),
            damage: DamageQueue::default(),
            waves: WaveState::new(&tuning.waves),
            score: ScoreState::new(),
            tick_index: 0,
            game_time: 0.0,
            discarded_damage: 0,
            last_drain: DrainReport::default(),
            tuning,
        }
    }

    fn tick(&mut self, dt: Duration, mut input: InputIntents, out_events: &mut Vec<Event>) {
        let step = dt.min(self.max_step);
        let dt = step.as_secs_f32();
        self.tick_index = self.tick_index.saturating_add(1);
        self.game_time += dt;
        out_events.push(Event::TimeAdvanced { dt: step });

        player::update(self, &mut input, dt, out_events);
        let _ = damage::drain(self, out_events);
        enemies::update(self, dt, out_events);
        bullets::update(self, dt, out_events);
        let _ = damage::drain(self, out_events);
        waves::update(self, dt, out_events);
        pickups::update(self, dt, out_events);

        let frame = &self.tuning.frame;
        self.decals.update(
            dt,
            self.game_time,
            frame.floating_text_rise,
            frame.body_fade_end,
        );
    }

    /// Starts a new run. Tuning, terrain, obstacles and the random stream carry over.
    fn reset(&mut self) {
        self.player = Player::new(&self.tuning.player);
        self.enemies.clear();
        self.bullets.clear();
        self.pickups.clear();
        self.decals.clear();
        let _ = self.damage.discard();
        self.waves = WaveState::new(&self.tuning.waves);
        self.score = ScoreState::new();
        self.obstacles.restore_barrels(self.tuning.combat.barrel_hp);
        self.tick_index = 0;
        self.game_time = 0.0;
        self.discarded_damage = 0;
        self.last_drain = DrainReport::default();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt, input } => world.tick(dt, input, out_events),
        Command::SpawnEnemy { kind, position } => {
            let _ = enemies::spawn_enemy(world, kind, position, out_events);
        }
        Command::PlaceObstacle { kind, position } => {
            world
                .obstacles
                .place(kind, position, world.tuning.combat.barrel_hp);
        }
        Command::InflictDamage {
            enemy,
            amount,
            angle,
        } => {
            damage::damage_enemy(world, enemy, amount, angle, out_events);
            let _ = damage::drain(world, out_events);
        }
        Command::Reset => world.reset(),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use endless_assault_core::{
        BulletTraits, EnemyId, EnemyKind, ObstacleKind, PickupKind, TerrainKind, Tuning, Vec2,
        WeaponKind,
    };

    use super::{BulletOwner, DrainReport, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Tuning the world was built with.
    #[must_use]
    pub fn tuning(world: &World) -> &Tuning {
        &world.tuning
    }

    /// Seed of the world's random stream.
    #[must_use]
    pub fn seed(world: &World) -> u64 {
        world.seed
    }

    /// Number of ticks applied since the run started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Simulated seconds since the run started.
    #[must_use]
    pub fn game_time(world: &World) -> f32 {
        world.game_time
    }

    /// Terrain reported by the terrain source at `position`.
    #[must_use]
    pub fn terrain_at(world: &World, position: Vec2) -> TerrainKind {
        world.terrain.terrain_at(position)
    }

    /// Captures the player's state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        let player = &world.player;
        PlayerSnapshot {
            position: player.position,
            velocity: player.velocity,
            aim_angle: player.aim_angle,
            hp: player.hp,
            max_hp: player.max_hp,
            shield: player.shield,
            max_shield: player.max_shield,
            weapon: player.weapon,
            magazine: player.magazine,
            reloading: player.is_reloading(),
            fire_cooldown: player.fire_timer,
            spin_up: player.spin_up,
            dodging: player.is_dodging(),
            dodge_cooldown: player.dodge_cooldown,
            invincible: player.invincible,
            hit_flash: player.hit_flash,
            since_damage: player.since_damage,
            special_charge: player.special_charge,
            special_cooldown: player.special_cooldown,
            walking: player.walking,
            damage_numbers: player
                .damage_numbers
                .iter()
                .map(|number| DamageNumberSnapshot {
                    amount: number.amount,
                    position: number.position,
                    life: number.life,
                })
                .collect(),
        }
    }

    /// Captures every live enemy, ordered by identifier.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let mut snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|(id, enemy)| EnemySnapshot {
                id,
                kind: enemy.kind,
                position: enemy.position,
                facing: enemy.facing,
                hp: enemy.hp,
                max_hp: enemy.max_hp,
                shield: enemy.shield,
                max_shield: enemy.max_shield,
                size: enemy.size,
                stunned: enemy.stun > 0.0,
                hit_flash: enemy.hit_flash,
                walking: enemy.walking,
                boss_name: enemy.boss,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        EnemyView { snapshots }
    }

    /// Captures every bullet in flight, in firing order.
    #[must_use]
    pub fn bullets(world: &World) -> Vec<BulletSnapshot> {
        world
            .bullets
            .iter()
            .map(|bullet| BulletSnapshot {
                position: bullet.position,
                velocity: bullet.velocity,
                owner: bullet.owner,
                traits: bullet.traits,
                remaining_life: bullet.life,
            })
            .collect()
    }

    /// Captures every pickup on the ground.
    #[must_use]
    pub fn pickups(world: &World) -> Vec<PickupSnapshot> {
        world
            .pickups
            .iter()
            .map(|pickup| PickupSnapshot {
                kind: pickup.kind,
                position: pickup.position,
                amount: pickup.amount,
                remaining_life: pickup.life,
            })
            .collect()
    }

    /// Captures score, combo and weapon progression.
    #[must_use]
    pub fn score(world: &World) -> ScoreSnapshot {
        let score = &world.score;
        ScoreSnapshot {
            score: score.score,
            kills: score.kills,
            combo: score.combo,
            combo_remaining: score.combo_timer,
            best_combo: score.best_combo,
            unlocked_weapons: WeaponKind::ALL
                .into_iter()
                .take(score.unlocked_weapons)
                .collect(),
            boss_reward: score.boss_target,
        }
    }

    /// Captures the wave cycle.
    #[must_use]
    pub fn wave(world: &World) -> WaveSnapshot {
        let waves = &world.waves;
        WaveSnapshot {
            wave: waves.wave,
            active: waves.active,
            quota: waves.quota,
            spawned: waves.spawned,
            cooldown_remaining: if waves.active { 0.0 } else { waves.timer.max(0.0) },
        }
    }

    /// Captures the bodies left on the field, oldest first.
    #[must_use]
    pub fn bodies(world: &World) -> Vec<BodySnapshot> {
        world
            .decals
            .bodies
            .iter()
            .map(|body| BodySnapshot {
                kind: body.kind,
                position: body.position,
                angle: body.angle,
                size: body.size,
                age: world.game_time - body.created_at,
            })
            .collect()
    }

    /// Captures the blood pools, oldest first.
    #[must_use]
    pub fn blood_pools(world: &World) -> Vec<BloodPoolSnapshot> {
        world
            .decals
            .blood_pools
            .iter()
            .map(|pool| BloodPoolSnapshot {
                position: pool.position,
                max_radius: pool.max_radius,
                age: world.game_time - pool.created_at,
            })
            .collect()
    }

    /// Captures the floating score texts, oldest first.
    #[must_use]
    pub fn floating_texts(world: &World) -> Vec<FloatingTextSnapshot> {
        world
            .decals
            .floating_texts
            .iter()
            .map(|text| FloatingTextSnapshot {
                text: text.text.clone(),
                position: text.position,
                remaining_life: text.life,
                emphasized: text.emphasized,
            })
            .collect()
    }

    /// Captures the obstacles in placement order.
    #[must_use]
    pub fn obstacles(world: &World) -> Vec<ObstacleSnapshot> {
        world
            .obstacles
            .iter()
            .map(|obstacle| ObstacleSnapshot {
                kind: obstacle.kind,
                position: obstacle.position,
                hp: obstacle.hp,
                exploded: obstacle.exploded,
            })
            .collect()
    }

    /// Number of deferred damage entries waiting for the next drain phase.
    #[must_use]
    pub fn pending_damage(world: &World) -> usize {
        world.damage.len()
    }

    /// Deferred damage entries discarded at the round cap since the run started.
    #[must_use]
    pub fn discarded_damage_total(world: &World) -> u64 {
        world.discarded_damage
    }

    /// Outcome of the most recent drain phase.
    #[must_use]
    pub fn last_drain(world: &World) -> DrainReport {
        world.last_drain
    }

    /// Read-only snapshot of the live enemies.
    #[derive(Clone, Debug)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Iterator over the captured enemy snapshots in deterministic order.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Snapshot of the enemy with the given identifier, if it is alive.
        #[must_use]
        pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
            self.snapshots.iter().find(|snapshot| snapshot.id == id)
        }

        /// Number of live enemies.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no enemy is alive.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single enemy.
    #[derive(Clone, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Handle of the enemy.
        pub id: EnemyId,
        /// Catalog entry the enemy was spawned from.
        pub kind: EnemyKind,
        /// World position.
        pub position: Vec2,
        /// Angle towards the player.
        pub facing: f32,
        /// Current hit points.
        pub hp: f32,
        /// Hit points at spawn.
        pub max_hp: f32,
        /// Current shield.
        pub shield: f32,
        /// Shield at spawn.
        pub max_shield: f32,
        /// Size multiplier applied to sprites and hit radius.
        pub size: f32,
        /// Reports whether the enemy is reeling from a hit.
        pub stunned: bool,
        /// Remaining hit flash in seconds.
        pub hit_flash: f32,
        /// Reports whether the enemy moved this tick.
        pub walking: bool,
        /// Title of the enemy when it is a boss.
        pub boss_name: Option<&'static str>,
    }

    /// Immutable representation of the player.
    #[derive(Clone, Debug, PartialEq)]
    pub struct PlayerSnapshot {
        /// World position.
        pub position: Vec2,
        /// Velocity applied during the last tick.
        pub velocity: Vec2,
        /// Aim angle in radians.
        pub aim_angle: f32,
        /// Current hit points.
        pub hp: f32,
        /// Hit point ceiling.
        pub max_hp: f32,
        /// Current shield.
        pub shield: f32,
        /// Shield ceiling.
        pub max_shield: f32,
        /// Equipped weapon.
        pub weapon: WeaponKind,
        /// Rounds left in the magazine.
        pub magazine: u32,
        /// Reports whether a reload is in progress.
        pub reloading: bool,
        /// Seconds until the weapon may fire again.
        pub fire_cooldown: f32,
        /// Wind-up level of spin-up weapons in `0.0..=1.0`.
        pub spin_up: f32,
        /// Reports whether a dodge roll is in progress.
        pub dodging: bool,
        /// Seconds until another dodge may start.
        pub dodge_cooldown: f32,
        /// Remaining invincibility in seconds.
        pub invincible: f32,
        /// Remaining hit flash in seconds.
        pub hit_flash: f32,
        /// Seconds since the player last took damage.
        pub since_damage: f32,
        /// Kills banked towards the shockwave.
        pub special_charge: u32,
        /// Seconds until the shockwave may be released again.
        pub special_cooldown: f32,
        /// Reports whether the player walked this tick.
        pub walking: bool,
        /// Recent damage taken, oldest first.
        pub damage_numbers: Vec<DamageNumberSnapshot>,
    }

    /// Damage figure shown above the player.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct DamageNumberSnapshot {
        /// Damage taken.
        pub amount: f32,
        /// Where the player stood when hit.
        pub position: Vec2,
        /// Seconds until the number disappears.
        pub life: f32,
    }

    /// Immutable representation of a bullet in flight.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct BulletSnapshot {
        /// World position.
        pub position: Vec2,
        /// Velocity in units per second.
        pub velocity: Vec2,
        /// Side that fired the bullet.
        pub owner: BulletOwner,
        /// Visual and behavioral traits.
        pub traits: BulletTraits,
        /// Seconds before the bullet expires.
        pub remaining_life: f32,
    }

    /// Immutable representation of a pickup.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PickupSnapshot {
        /// Resource restored on collection.
        pub kind: PickupKind,
        /// World position.
        pub position: Vec2,
        /// Amount restored.
        pub amount: f32,
        /// Seconds before the pickup vanishes.
        pub remaining_life: f32,
    }

    /// Score, combo and weapon progression.
    #[derive(Clone, Debug, PartialEq)]
    pub struct ScoreSnapshot {
        /// Total score.
        pub score: u64,
        /// Enemies killed.
        pub kills: u32,
        /// Current combo.
        pub combo: u32,
        /// Seconds before the combo lapses.
        pub combo_remaining: f32,
        /// Longest combo of the run.
        pub best_combo: u32,
        /// Weapons available to the player, in catalog order.
        pub unlocked_weapons: Vec<WeaponKind>,
        /// Weapon awarded by the boss currently alive.
        pub boss_reward: Option<WeaponKind>,
    }

    /// Wave cycle state.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct WaveSnapshot {
        /// Current wave number; zero before the first wave.
        pub wave: u32,
        /// Reports whether the wave is spawning or being fought.
        pub active: bool,
        /// Enemies the wave spawns in total.
        pub quota: u32,
        /// Enemies spawned so far.
        pub spawned: u32,
        /// Seconds before the next wave starts; zero while active.
        pub cooldown_remaining: f32,
    }

    /// Body left by a regular or boss kill.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct BodySnapshot {
        /// Kind of the fallen enemy.
        pub kind: EnemyKind,
        /// World position.
        pub position: Vec2,
        /// Angle the body lies at.
        pub angle: f32,
        /// Sprite scale.
        pub size: f32,
        /// Seconds since the kill.
        pub age: f32,
    }

    /// Blood pool left by a kill.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct BloodPoolSnapshot {
        /// World position.
        pub position: Vec2,
        /// Radius the pool grows to.
        pub max_radius: f32,
        /// Seconds since the pool appeared.
        pub age: f32,
    }

    /// Rising score text.
    #[derive(Clone, Debug, PartialEq)]
    pub struct FloatingTextSnapshot {
        /// Text to draw.
        pub text: String,
        /// World position.
        pub position: Vec2,
        /// Seconds before the text disappears.
        pub remaining_life: f32,
        /// Reports whether the text should be drawn larger.
        pub emphasized: bool,
    }

    /// Static obstacle or barrel.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ObstacleSnapshot {
        /// Obstacle kind.
        pub kind: ObstacleKind,
        /// World position.
        pub position: Vec2,
        /// Remaining hit points; meaningful for barrels only.
        pub hp: f32,
        /// Reports whether a barrel has already exploded.
        pub exploded: bool,
    }
}

#[cfg(test)]
mod tests {
    use endless_assault_core::{EnemyId, EnemyKind, ObstacleKind, Vec2};

    use super::*;

    fn tick(world: &mut World, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::Tick {
                dt,
                input: InputIntents::default(),
            },
            &mut events,
        );
        events
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut world = World::new();

        let events = tick(&mut world, Duration::from_secs(1));

        assert_eq!(
            events.first(),
            Some(&Event::TimeAdvanced {
                dt: Duration::from_millis(50),
            })
        );
        assert_eq!(query::tick_index(&world), 1);
        assert!((query::game_time(&world) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn invalid_tuning_is_rejected() {
        let mut tuning = Tuning::default();
        tuning.frame.max_dt = 0.0;

        let built = World::from_config(tuning, 3, UniformTerrain(TerrainKind::Sand));

        assert!(matches!(
            built,
            Err(TuningError::NotPositive { field: "frame.max_dt", .. })
        ));
    }

    #[test]
    fn damage_to_unknown_enemy_is_ignored() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::InflictDamage {
                enemy: EnemyId::new(7, 0),
                amount: 50.0,
                angle: 0.0,
            },
            &mut events,
        );

        assert!(events.is_empty());
    }

    #[test]
    fn reset_starts_a_fresh_run_on_the_same_field() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceObstacle {
                kind: ObstacleKind::Barrel,
                position: Vec2::new(200.0, 0.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Militia,
                position: Vec2::new(300.0, 0.0),
            },
            &mut events,
        );
        world.score.score = 120;
        if let Some(barrel) = world.obstacles.get_mut(0) {
            barrel.exploded = true;
        }
        let _ = tick(&mut world, Duration::from_millis(16));

        apply(&mut world, Command::Reset, &mut events);

        assert!(query::enemy_view(&world).is_empty());
        assert_eq!(query::score(&world).score, 0);
        assert_eq!(query::tick_index(&world), 0);
        assert_eq!(query::wave(&world).wave, 0);
        let obstacles = query::obstacles(&world);
        assert_eq!(obstacles.len(), 1);
        assert!(!obstacles[0].exploded);
        assert_eq!(query::player(&world).hp, 800.0);
    }

    #[test]
    fn query_exposes_configuration() {
        let world = World::from_config(Tuning::default(), 11, UniformTerrain(TerrainKind::Dirt))
            .expect("default tuning is valid");

        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(query::seed(&world), 11);
        assert_eq!(query::terrain_at(&world, Vec2::ZERO), TerrainKind::Dirt);
        assert_eq!(query::tuning(&world).capacity.max_enemies, 80);
        assert_eq!(query::pending_damage(&world), 0);
        assert_eq!(query::discarded_damage_total(&world), 0);
        assert_eq!(query::last_drain(&world), DrainReport::default());
        assert_eq!(
            query::score(&world).unlocked_weapons,
            vec![endless_assault_core::WeaponKind::Pistol]
        );
    }
}
