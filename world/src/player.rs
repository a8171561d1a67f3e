//! Per-tick player controller: movement, dodge, weapons and the shockwave.

use std::collections::VecDeque;

use endless_assault_core::{
    Effect, Event, InputIntents, ParticleKind, PlayerTuning, SoundCue, TerrainKind, Trigger,
    Tuning, Vec2, WeaponCycle, WeaponKind,
};

use crate::{
    bullets::{self, Bullet},
    effects::{emit, shake, sound},
    geometry::{falloff, heading, terrain_under, unit},
    rng::SimRng,
    World,
};

/// Spin-up level a wind-up weapon needs before it fires.
const SPIN_UP_THRESHOLD: f32 = 0.5;
const SPIN_UP_RATE: f32 = 2.0;
const SPIN_DOWN_RATE: f32 = 3.0;
const DODGE_SMOKE_CHANCE: f32 = 0.3;
const SHOT_VOLUME: f32 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ReloadState {
    Ready,
    Reloading { remaining: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum DodgeState {
    Idle,
    Dodging { angle: f32, remaining: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DamageNumber {
    pub(crate) amount: f32,
    pub(crate) position: Vec2,
    pub(crate) life: f32,
}

#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) aim_angle: f32,
    pub(crate) hp: f32,
    pub(crate) max_hp: f32,
    pub(crate) shield: f32,
    pub(crate) max_shield: f32,
    pub(crate) weapon: WeaponKind,
    pub(crate) magazine: u32,
    pub(crate) reload: ReloadState,
    pub(crate) fire_timer: f32,
    pub(crate) spin_up: f32,
    pub(crate) dodge: DodgeState,
    pub(crate) dodge_cooldown: f32,
    pub(crate) invincible: f32,
    pub(crate) hit_flash: f32,
    /// Seconds since the player last took damage; gates shield regeneration.
    pub(crate) since_damage: f32,
    pub(crate) special_charge: u32,
    pub(crate) special_cooldown: f32,
    pub(crate) walking: bool,
    pub(crate) damage_numbers: VecDeque<DamageNumber>,
}

impl Player {
    pub(crate) fn new(tuning: &PlayerTuning) -> Self {
        let weapon = WeaponKind::Pistol;
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            aim_angle: 0.0,
            hp: tuning.max_hp,
            max_hp: tuning.max_hp,
            shield: tuning.max_shield,
            max_shield: tuning.max_shield,
            weapon,
            magazine: weapon.spec().magazine,
            reload: ReloadState::Ready,
            fire_timer: 0.0,
            spin_up: 0.0,
            dodge: DodgeState::Idle,
            dodge_cooldown: 0.0,
            invincible: 0.0,
            hit_flash: 0.0,
            since_damage: 0.0,
            special_charge: 0,
            special_cooldown: 0.0,
            walking: false,
            damage_numbers: VecDeque::new(),
        }
    }

    pub(crate) fn is_dodging(&self) -> bool {
        matches!(self.dodge, DodgeState::Dodging { .. })
    }

    pub(crate) fn is_reloading(&self) -> bool {
        matches!(self.reload, ReloadState::Reloading { .. })
    }

    /// Equips `weapon` with a full magazine; reload, spin-up and fire cooldown
    /// are cleared in the same step.
    fn equip(&mut self, weapon: WeaponKind, out: &mut Vec<Event>) {
        self.weapon = weapon;
        self.magazine = weapon.spec().magazine;
        self.reload = ReloadState::Ready;
        self.spin_up = 0.0;
        self.fire_timer = 0.0;
        out.push(Event::WeaponSwitched { weapon });
    }

    fn start_reload(&mut self, out: &mut Vec<Event>) {
        self.reload = ReloadState::Reloading {
            remaining: self.weapon.spec().reload_time,
        };
        out.push(Event::ReloadStarted {
            weapon: self.weapon,
        });
    }

    pub(crate) fn record_damage(&mut self, amount: f32, lifetime: f32, capacity: usize) {
        if self.damage_numbers.len() >= capacity {
            let _ = self.damage_numbers.pop_front();
        }
        self.damage_numbers.push_back(DamageNumber {
            amount,
            position: self.position,
            life: lifetime,
        });
    }

    fn age_damage_numbers(&mut self, dt: f32) {
        for number in &mut self.damage_numbers {
            number.life -= dt;
        }
        self.damage_numbers.retain(|number| number.life > 0.0);
    }
}

fn countdown(timer: &mut f32, dt: f32) {
    if *timer > 0.0 {
        *timer = (*timer - dt).max(0.0);
    }
}

/// Advances the player by `dt`, consuming the input edges it acts on.
pub(crate) fn update(world: &mut World, input: &mut InputIntents, dt: f32, out: &mut Vec<Event>) {
    let World {
        tuning,
        player,
        rng,
        terrain,
        obstacles,
        enemies,
        bullets,
        damage,
        score,
        ..
    } = world;
    let config = &tuning.player;

    player.hp = (player.hp + config.hp_regen * dt).min(player.max_hp);
    player.since_damage += dt;
    if player.since_damage >= config.shield_regen_delay && player.shield < player.max_shield {
        player.shield = (player.shield + config.shield_regen * dt).min(player.max_shield);
    }

    countdown(&mut player.invincible, dt);
    countdown(&mut player.hit_flash, dt);
    countdown(&mut player.special_cooldown, dt);
    countdown(&mut player.dodge_cooldown, dt);

    if let DodgeState::Dodging { angle, remaining } = player.dodge {
        let remaining = remaining - dt;
        if remaining <= 0.0 {
            player.dodge = DodgeState::Idle;
            player.invincible = config.dodge_invincibility;
        } else {
            player.dodge = DodgeState::Dodging { angle, remaining };
            player.velocity = unit(angle) * config.dodge_speed;
            player.position += player.velocity * dt;
            if rng.chance(DODGE_SMOKE_CHANCE) {
                emit(
                    out,
                    Effect::Particles {
                        kind: ParticleKind::Smoke,
                        position: player.position,
                        count: 1,
                    },
                );
            }
            player.age_damage_numbers(dt);
            return;
        }
    }

    let axes = input.movement.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
    let moving = axes.length_squared() > 0.0;
    if moving {
        let screen = axes.normalize_or_zero();
        let iso = tuning.frame.iso_scale;
        let direction = Vec2::new(
            screen.x * 0.5 + screen.y * 0.5 / iso,
            -screen.x * 0.5 + screen.y * 0.5 / iso,
        )
        .normalize_or_zero();
        let speed = if input.sprint {
            config.speed * config.sprint_multiplier
        } else {
            config.speed
        };
        player.velocity = direction * speed;
        player.walking = true;
    } else {
        player.velocity = Vec2::ZERO;
        player.walking = false;
    }

    if terrain_under(terrain.as_ref(), tuning.frame.tile_size, player.position) == TerrainKind::Water {
        player.velocity *= config.water_speed_factor;
        if player.walking && rng.chance(config.water_splash_chance) {
            emit(
                out,
                Effect::Particles {
                    kind: ParticleKind::Splash,
                    position: player.position,
                    count: 1,
                },
            );
        }
    }

    player.position += player.velocity * dt;
    player.position = obstacles.push_out(player.position, config.collision_radius);

    let to_target = input.aim_target - player.position;
    if to_target.length_squared() > 0.0 {
        player.aim_angle = heading(to_target);
    }

    if let Some(weapon) = input.take_weapon_selection() {
        if score.is_unlocked(weapon) && weapon != player.weapon {
            player.equip(weapon, out);
        }
    }
    if let Some(cycle) = input.take_weapon_cycle() {
        let unlocked = score.unlocked_weapons.max(1);
        let current = player.weapon.index() % unlocked;
        let next = match cycle {
            WeaponCycle::Previous => (current + unlocked - 1) % unlocked,
            WeaponCycle::Next => (current + 1) % unlocked,
        };
        if let Some(weapon) = WeaponKind::from_index(next) {
            if weapon != player.weapon {
                player.equip(weapon, out);
            }
        }
    }

    let spec = player.weapon.spec();
    if let ReloadState::Reloading { remaining } = player.reload {
        let remaining = remaining - dt;
        if remaining <= 0.0 {
            player.reload = ReloadState::Ready;
            player.magazine = spec.magazine;
            out.push(Event::ReloadFinished {
                weapon: player.weapon,
            });
        } else {
            player.reload = ReloadState::Reloading { remaining };
        }
    }
    if input.take_reload_press() && !player.is_reloading() && player.magazine < spec.magazine {
        player.start_reload(out);
    }

    if !player.is_dodging() && player.dodge_cooldown <= 0.0 && input.take_dodge_press() {
        let angle = if moving && player.velocity.length_squared() > 0.0 {
            heading(player.velocity)
        } else {
            player.aim_angle
        };
        player.dodge = DodgeState::Dodging {
            angle,
            remaining: config.dodge_duration,
        };
        player.dodge_cooldown = config.dodge_cooldown;
        out.push(Event::DodgeStarted { angle });
    }

    if input.take_alt_fire_press()
        && player.special_charge >= config.special_charge_cap
        && player.special_cooldown <= 0.0
    {
        player.special_charge = 0;
        player.special_cooldown = config.special_cooldown;
        emit(
            out,
            Effect::Shockwave {
                position: player.position,
            },
        );
        sound(out, SoundCue::Shockwave, 0.9);
        shake(out, config.special_shake);

        let mut enemies_hit = 0;
        for (id, enemy) in enemies.iter_mut() {
            if enemy.dead {
                continue;
            }
            let offset = enemy.position - player.position;
            let distance = offset.length();
            if distance >= config.special_radius {
                continue;
            }
            enemy.stun = config.special_stun;
            if distance > 0.0 {
                enemy.knockback =
                    offset / distance * (config.special_knockback / enemy.kind.spec().size);
            }
            damage.enqueue(
                id,
                config.special_damage * falloff(distance, config.special_radius),
                heading(offset),
            );
            enemies_hit += 1;
        }
        out.push(Event::ShockwaveReleased { enemies_hit });
    }

    countdown(&mut player.fire_timer, dt);
    if spec.spin_up && input.fire_held && !player.is_reloading() {
        player.spin_up = (player.spin_up + dt * SPIN_UP_RATE).min(1.0);
    } else {
        player.spin_up = (player.spin_up - dt * SPIN_DOWN_RATE).max(0.0);
    }

    let trigger = match spec.trigger {
        Trigger::Automatic => input.fire_held,
        Trigger::SemiAutomatic => input.fire_pressed,
    };
    let wound_up = !spec.spin_up || player.spin_up > SPIN_UP_THRESHOLD;
    if trigger
        && !player.is_reloading()
        && !player.is_dodging()
        && player.fire_timer <= 0.0
        && player.magazine > 0
        && wound_up
    {
        let _ = input.take_fire_press();
        fire(player, tuning, rng, bullets, out);
    }

    if player.magazine == 0 && !player.is_reloading() {
        player.start_reload(out);
    }

    player.age_damage_numbers(dt);
}

fn fire(
    player: &mut Player,
    tuning: &Tuning,
    rng: &mut SimRng,
    in_flight: &mut Vec<Bullet>,
    out: &mut Vec<Event>,
) {
    let spec = player.weapon.spec();
    player.fire_timer = if spec.spin_up {
        spec.fire_interval * (2.0 - player.spin_up)
    } else {
        spec.fire_interval
    };
    player.magazine = player.magazine.saturating_sub(1);
    if player.magazine == 0 {
        player.start_reload(out);
    }

    let aim = player.aim_angle;
    let muzzle = player.position + unit(aim) * tuning.player.muzzle_offset;
    let mut spawned = 0;
    for pellet in 0..spec.pellets {
        let angle = if spec.pellets > 1 {
            let fan = pellet as f32 / (spec.pellets - 1) as f32 - 0.5;
            aim + fan * spec.spread * 2.0 + rng.range(-spec.spread * 0.3, spec.spread * 0.3)
        } else {
            aim + rng.range(-spec.spread, spec.spread)
        };
        let bullet = Bullet::from_weapon(spec, muzzle, angle, tuning.combat.bullet_lifetime);
        if bullets::push(in_flight, bullet, tuning.capacity.max_bullets) {
            spawned += 1;
        } else {
            out.push(Event::BulletRejected);
        }
    }

    emit(
        out,
        Effect::MuzzleFlash {
            position: muzzle,
            angle: aim,
        },
    );
    if spec.shell_size > 0.0 {
        emit(
            out,
            Effect::ShellCasing {
                position: player.position,
                angle: aim,
                size: spec.shell_size,
            },
        );
    }
    sound(out, spec.sound, SHOT_VOLUME);

    player.position -= unit(aim) * spec.kickback * tuning.player.recoil_factor;
    shake(out, spec.kickback * tuning.player.shake_factor);
    out.push(Event::WeaponFired {
        weapon: player.weapon,
        bullets: spawned,
    });
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use endless_assault_core::{Command, EnemyKind, UniformTerrain};

    use super::*;
    use crate::apply;

    fn tick(world: &mut World, input: InputIntents) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::Tick {
                dt: Duration::from_millis(50),
                input,
            },
            &mut events,
        );
        events
    }

    fn fire_press() -> InputIntents {
        InputIntents {
            aim_target: Vec2::new(100.0, 0.0),
            fire_pressed: true,
            ..InputIntents::default()
        }
    }

    fn select(weapon: WeaponKind) -> InputIntents {
        InputIntents {
            select_weapon: Some(weapon),
            ..InputIntents::default()
        }
    }

    #[test]
    fn firing_with_empty_magazine_spawns_nothing_and_forces_reload() {
        let mut world = World::new();
        world.player.magazine = 0;
        world.player.reload = ReloadState::Ready;

        let events = tick(&mut world, fire_press());

        assert!(world.bullets.is_empty());
        assert!(world.player.is_reloading());
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ReloadStarted { .. })));
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::WeaponFired { .. })));
    }

    #[test]
    fn semi_automatic_fire_consumes_one_magazine_round() {
        let mut world = World::new();

        let events = tick(&mut world, fire_press());

        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.player.magazine, WeaponKind::Pistol.spec().magazine - 1);
        assert!(events.contains(&Event::WeaponFired {
            weapon: WeaponKind::Pistol,
            bullets: 1,
        }));
    }

    #[test]
    fn switching_away_and_back_restores_a_full_magazine() {
        let mut world = World::new();
        world.score.unlocked_weapons = 2;

        let _ = tick(&mut world, select(WeaponKind::Uzi));
        for _ in 0..6 {
            let _ = tick(
                &mut world,
                InputIntents {
                    aim_target: Vec2::new(100.0, 0.0),
                    fire_held: true,
                    ..InputIntents::default()
                },
            );
        }
        assert!(world.player.magazine < WeaponKind::Uzi.spec().magazine);

        let _ = tick(&mut world, select(WeaponKind::Pistol));
        let events = tick(&mut world, select(WeaponKind::Uzi));

        assert!(events.contains(&Event::WeaponSwitched {
            weapon: WeaponKind::Uzi,
        }));
        assert_eq!(world.player.magazine, WeaponKind::Uzi.spec().magazine);
        assert_eq!(world.player.reload, ReloadState::Ready);
        assert_eq!(world.player.spin_up, 0.0);
        assert_eq!(world.player.fire_timer, 0.0);
    }

    fn hold_fire() -> InputIntents {
        InputIntents {
            aim_target: Vec2::new(100.0, 0.0),
            fire_held: true,
            ..InputIntents::default()
        }
    }

    fn fired(events: &[Event]) -> bool {
        events
            .iter()
            .any(|event| matches!(event, Event::WeaponFired { .. }))
    }

    fn minigun_world() -> World {
        let mut world = World::new();
        world.score.unlocked_weapons = WeaponKind::Minigun.index() + 1;
        let _ = tick(&mut world, select(WeaponKind::Minigun));
        assert_eq!(world.player.weapon, WeaponKind::Minigun);
        world
    }

    #[test]
    fn minigun_stays_silent_until_spun_up() {
        let mut world = minigun_world();

        let events = tick(&mut world, hold_fire());
        assert!(!fired(&events));
        assert!(world.bullets.is_empty());
        assert!(world.player.spin_up > 0.0);

        let mut first_shot = None;
        for held in 2..=10 {
            if fired(&tick(&mut world, hold_fire())) {
                first_shot = Some(held);
                break;
            }
        }

        let held = first_shot.expect("minigun fires once spun up");
        assert!(held as f32 * 0.05 * SPIN_UP_RATE > SPIN_UP_THRESHOLD - 1e-3);
        assert!(!world.bullets.is_empty());
    }

    #[test]
    fn spinning_faster_shortens_the_fire_interval() {
        let interval = WeaponKind::Minigun.spec().fire_interval;

        let mut warming = minigun_world();
        warming.player.spin_up = 0.6;
        assert!(fired(&tick(&mut warming, hold_fire())));

        let mut spun = minigun_world();
        spun.player.spin_up = 1.0;
        assert!(fired(&tick(&mut spun, hold_fire())));

        assert!((spun.player.fire_timer - interval).abs() < 1e-5);
        assert!((warming.player.fire_timer - interval * 1.3).abs() < 1e-4);
    }

    #[test]
    fn shotgun_fans_its_pellets_around_the_aim() {
        let mut world = World::new();
        world.score.unlocked_weapons = WeaponKind::Shotgun.index() + 1;
        let _ = tick(&mut world, select(WeaponKind::Shotgun));
        let spec = WeaponKind::Shotgun.spec();

        let events = tick(&mut world, fire_press());

        assert!(events.contains(&Event::WeaponFired {
            weapon: WeaponKind::Shotgun,
            bullets: spec.pellets,
        }));
        assert_eq!(world.bullets.len(), 7);
        let angles: Vec<f32> = world.bullets.iter().map(|bullet| heading(bullet.velocity)).collect();
        let jitter = spec.spread * 0.3 + 1e-4;
        let lowest = angles.iter().copied().fold(f32::INFINITY, f32::min);
        let highest = angles.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert!((lowest + spec.spread).abs() <= jitter, "{angles:?}");
        assert!((highest - spec.spread).abs() <= jitter, "{angles:?}");
        let mean = angles.iter().sum::<f32>() / angles.len() as f32;
        assert!(mean.abs() <= jitter, "{angles:?}");
    }

    #[test]
    fn sprinting_speeds_up_movement() {
        let mut world = World::new();

        let _ = tick(
            &mut world,
            InputIntents {
                movement: Vec2::new(1.0, 0.0),
                sprint: true,
                ..InputIntents::default()
            },
        );

        let config = &world.tuning.player;
        let expected = config.speed * config.sprint_multiplier * 0.05;
        assert!((world.player.position.length() - expected).abs() < 1e-3);
    }

    #[test]
    fn locked_weapons_cannot_be_selected() {
        let mut world = World::new();

        let events = tick(&mut world, select(WeaponKind::Railgun));

        assert_eq!(world.player.weapon, WeaponKind::Pistol);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::WeaponSwitched { .. })));
    }

    #[test]
    fn cycling_wraps_over_unlocked_weapons() {
        let mut world = World::new();
        world.score.unlocked_weapons = 3;

        let _ = tick(
            &mut world,
            InputIntents {
                cycle_weapon: Some(WeaponCycle::Previous),
                ..InputIntents::default()
            },
        );
        assert_eq!(world.player.weapon, WeaponKind::Shotgun);

        let _ = tick(
            &mut world,
            InputIntents {
                cycle_weapon: Some(WeaponCycle::Next),
                ..InputIntents::default()
            },
        );
        assert_eq!(world.player.weapon, WeaponKind::Pistol);
    }

    #[test]
    fn screen_up_moves_along_the_isometric_diagonal() {
        let mut world = World::new();

        let _ = tick(
            &mut world,
            InputIntents {
                movement: Vec2::new(0.0, -1.0),
                ..InputIntents::default()
            },
        );

        let position = world.player.position;
        assert!(position.x < 0.0 && position.y < 0.0);
        assert!((position.x - position.y).abs() < 1e-4);
        assert!((position.length() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn water_slows_the_player() {
        let mut world = World::from_config(
            Tuning::default(),
            1,
            UniformTerrain(TerrainKind::Water),
        )
        .expect("default tuning is valid");

        let _ = tick(
            &mut world,
            InputIntents {
                movement: Vec2::new(1.0, 0.0),
                ..InputIntents::default()
            },
        );

        assert!((world.player.position.length() - 5.5).abs() < 1e-3);
    }

    #[test]
    fn completed_dodge_grants_brief_invincibility() {
        let mut world = World::new();

        let events = tick(
            &mut world,
            InputIntents {
                dodge_pressed: true,
                ..InputIntents::default()
            },
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::DodgeStarted { .. })));

        let mut ticks = 0;
        while world.player.is_dodging() && ticks < 10 {
            let _ = tick(&mut world, InputIntents::default());
            ticks += 1;
        }

        assert!(!world.player.is_dodging());
        assert!(ticks <= 6);
        assert!(world.player.invincible > 0.0);
        assert!(world.player.dodge_cooldown > 0.0);
    }

    #[test]
    fn charged_shockwave_enqueues_and_resolves_damage_in_the_same_tick() {
        let mut world = World::new();
        world.player.special_charge = world.tuning.player.special_charge_cap;
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Heavy,
                position: Vec2::new(110.0, 0.0),
            },
            &mut events,
        );

        let events = tick(
            &mut world,
            InputIntents {
                alt_fire_pressed: true,
                ..InputIntents::default()
            },
        );

        assert!(events.contains(&Event::ShockwaveReleased { enemies_hit: 1 }));
        assert_eq!(world.player.special_charge, 0);
        assert_eq!(world.damage.len(), 0);
        let (_, heavy) = world.enemies.iter().next().expect("heavy survives");
        assert!((heavy.hp - (180.0 - 75.0)).abs() < 1e-3);
        assert!(heavy.knockback.x > 0.0);
    }

    #[test]
    fn damage_numbers_expire_and_are_bounded() {
        let mut player = Player::new(&PlayerTuning::default());
        for _ in 0..4 {
            player.record_damage(5.0, 0.8, 3);
        }
        assert_eq!(player.damage_numbers.len(), 3);

        player.age_damage_numbers(1.0);
        assert!(player.damage_numbers.is_empty());
    }
}
