//! Enemy spawning and per-tick behavior.

use endless_assault_core::{
    Behavior, Capabilities, Effect, EnemyId, EnemyKind, Event, ParticleKind, SpawnError,
    TerrainKind, Tuning, Vec2,
};
use tracing::debug;

use crate::{
    bullets::{self, Bullet},
    damage,
    effects::emit,
    geometry::{heading, nearest, terrain_under, unit},
    rng::SimRng,
    World,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Enemy {
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) facing: f32,
    pub(crate) hp: f32,
    pub(crate) max_hp: f32,
    pub(crate) shield: f32,
    pub(crate) max_shield: f32,
    pub(crate) speed: f32,
    pub(crate) damage: f32,
    pub(crate) range: f32,
    pub(crate) size: f32,
    pub(crate) behavior: Behavior,
    pub(crate) capabilities: Capabilities,
    pub(crate) attack_timer: f32,
    pub(crate) hit_flash: f32,
    pub(crate) stun: f32,
    pub(crate) knockback: Vec2,
    pub(crate) walking: bool,
    /// Latched when the death is being resolved; removal follows in the same call.
    pub(crate) dead: bool,
    pub(crate) boss: Option<&'static str>,
}

impl Enemy {
    fn regular(kind: EnemyKind, position: Vec2, wave: u32, tuning: &Tuning, rng: &mut SimRng) -> Self {
        let spec = kind.spec();
        let scale = 1.0 + wave as f32 * tuning.enemies.hp_growth_per_wave;
        let shield = if spec.capabilities.contains(Capabilities::HAS_SHIELD) {
            spec.shield_hp * scale
        } else {
            0.0
        };
        Self {
            kind,
            position,
            velocity: Vec2::ZERO,
            facing: 0.0,
            hp: spec.hp * scale,
            max_hp: spec.hp * scale,
            shield,
            max_shield: shield,
            speed: spec.speed * rng.range(0.9, 1.1),
            damage: spec.damage,
            range: spec.range,
            size: spec.size,
            behavior: spec.behavior,
            capabilities: spec.capabilities,
            attack_timer: rng.range(0.0, 2.0),
            hit_flash: 0.0,
            stun: 0.0,
            knockback: Vec2::ZERO,
            walking: false,
            dead: false,
            boss: None,
        }
    }

    fn boss(
        kind: EnemyKind,
        name: &'static str,
        hp: f32,
        position: Vec2,
        tuning: &Tuning,
        rng: &mut SimRng,
    ) -> Self {
        let spec = kind.spec();
        let waves = &tuning.waves;
        let mut enemy = Self::regular(kind, position, 0, tuning, rng);
        enemy.boss = Some(name);
        enemy.hp = hp;
        enemy.max_hp = hp;
        enemy.size = spec.size * waves.boss_size_multiplier;
        enemy.speed = (spec.speed * waves.boss_speed_multiplier).max(waves.boss_min_speed);
        enemy.damage = spec.damage * waves.boss_damage_multiplier;
        if spec.capabilities.contains(Capabilities::HAS_SHIELD) {
            enemy.shield = hp * waves.boss_shield_fraction;
            enemy.max_shield = enemy.shield;
        }
        enemy
    }
}

/// Spawns a regular enemy scaled to the current wave.
pub(crate) fn spawn_enemy(
    world: &mut World,
    kind: EnemyKind,
    position: Vec2,
    out: &mut Vec<Event>,
) -> Result<EnemyId, SpawnError> {
    if world.enemies.len() >= world.tuning.capacity.max_enemies {
        debug!(?kind, live = world.enemies.len(), "enemy spawn rejected at capacity");
        out.push(Event::EnemySpawnRejected {
            kind,
            reason: SpawnError::AtCapacity,
        });
        return Err(SpawnError::AtCapacity);
    }

    let enemy = Enemy::regular(kind, position, world.waves.wave, &world.tuning, &mut world.rng);
    let id = world.enemies.insert(enemy);
    out.push(Event::EnemySpawned {
        enemy: id,
        kind,
        position,
    });
    Ok(id)
}

/// Spawns a boss. Bosses are never refused for capacity.
pub(crate) fn spawn_boss(
    world: &mut World,
    kind: EnemyKind,
    name: &'static str,
    hp: f32,
    position: Vec2,
    out: &mut Vec<Event>,
) -> EnemyId {
    let enemy = Enemy::boss(kind, name, hp, position, &world.tuning, &mut world.rng);
    let id = world.enemies.insert(enemy);
    out.push(Event::EnemySpawned {
        enemy: id,
        kind,
        position,
    });
    id
}

/// Advances every live enemy by `dt`.
///
/// Each enemy is copied out, stepped, and written back, so helpers that need
/// the whole world (damage to the player, heals on allies) can run in between.
pub(crate) fn update(world: &mut World, dt: f32, out: &mut Vec<Event>) {
    for id in world.enemies.ids() {
        let Some(mut enemy) = world.enemies.get(id).copied() else {
            continue;
        };
        if enemy.dead {
            continue;
        }
        let strike = step(world, id, &mut enemy, dt, out);
        if let Some(slot) = world.enemies.get_mut(id) {
            *slot = enemy;
        }
        if let Some(amount) = strike {
            damage::damage_player(world, amount, out);
        }
    }
}

/// Steps one enemy; returns melee damage owed to the player this tick.
fn step(world: &mut World, id: EnemyId, enemy: &mut Enemy, dt: f32, out: &mut Vec<Event>) -> Option<f32> {
    let config = &world.tuning.enemies;
    if enemy.hit_flash > 0.0 {
        enemy.hit_flash = (enemy.hit_flash - dt).max(0.0);
    }

    if enemy.stun > 0.0 {
        enemy.stun -= dt;
        enemy.position += enemy.knockback * dt;
        enemy.knockback *= config.knockback_friction;
        return None;
    }

    let to_player = world.player.position - enemy.position;
    let distance = to_player.length();
    let toward = if distance > 0.0 {
        to_player / distance
    } else {
        Vec2::ZERO
    };
    enemy.facing = heading(to_player);
    enemy.velocity = Vec2::ZERO;
    let mut strike = None;

    match enemy.behavior {
        Behavior::Healer { heal_interval } => {
            enemy.attack_timer -= dt;
            if enemy.attack_timer <= 0.0 {
                let wounded = nearest(
                    world
                        .enemies
                        .iter()
                        .filter(|(other, ally)| *other != id && !ally.dead && ally.hp < ally.max_hp)
                        .map(|(other, ally)| (other, ally.position.distance(enemy.position)))
                        .filter(|(_, reach)| *reach < config.heal_radius),
                );
                if let Some((ally_id, _)) = wounded {
                    if let Some(ally) = world.enemies.get_mut(ally_id) {
                        ally.hp = (ally.hp + config.heal_amount).min(ally.max_hp);
                        emit(
                            out,
                            Effect::HealPulse {
                                position: ally.position,
                            },
                        );
                    }
                    enemy.attack_timer = heal_interval;
                }
            }
            enemy.velocity = if distance > config.healer_standoff {
                toward * enemy.speed
            } else {
                -toward * enemy.speed * config.healer_retreat_factor
            };
        }
        Behavior::Ranged {
            fire_interval,
            bullet_speed,
        } => {
            if distance > enemy.range * config.ranged_advance_band {
                enemy.velocity = toward * enemy.speed;
            } else if distance < enemy.range * config.ranged_retreat_band {
                enemy.velocity = -toward * enemy.speed * config.ranged_retreat_factor;
            }
            enemy.attack_timer -= dt;
            if enemy.attack_timer <= 0.0 && distance < enemy.range {
                enemy.attack_timer = fire_interval * world.rng.range(0.8, 1.2);
                let angle = enemy.facing + world.rng.range(-config.aim_jitter, config.aim_jitter);
                let muzzle = enemy.position + unit(angle) * config.muzzle_offset;
                let blast = enemy
                    .capabilities
                    .contains(Capabilities::EXPLOSIVE_SHOTS)
                    .then_some(config.shot_explosion_radius);
                let damage = enemy.damage
                    * (1.0 + world.waves.wave as f32 * config.damage_growth_per_wave);
                let bullet = Bullet::from_enemy(
                    muzzle,
                    angle,
                    bullet_speed,
                    damage,
                    blast,
                    world.tuning.combat.bullet_lifetime,
                );
                if bullets::push(&mut world.bullets, bullet, world.tuning.capacity.max_bullets) {
                    emit(
                        out,
                        Effect::MuzzleFlash {
                            position: muzzle,
                            angle,
                        },
                    );
                } else {
                    out.push(Event::BulletRejected);
                }
            }
        }
        Behavior::Melee => {
            if distance > enemy.range {
                enemy.velocity = toward * enemy.speed;
            } else {
                enemy.attack_timer -= dt;
                if enemy.attack_timer <= 0.0 {
                    enemy.attack_timer = config.melee_interval;
                    strike = Some(enemy.damage);
                }
            }
        }
    }

    let personal_space = config.separation_radius * enemy.size;
    for (other, neighbour) in world.enemies.iter() {
        if other == id || neighbour.dead {
            continue;
        }
        let away = enemy.position - neighbour.position;
        let gap = away.length();
        if gap > 0.0 && gap < personal_space {
            enemy.velocity += away / gap * config.separation_force;
        }
    }

    enemy.walking = enemy.velocity.length_squared() > 0.0;
    if terrain_under(world.terrain.as_ref(), world.tuning.frame.tile_size, enemy.position)
        == TerrainKind::Water
    {
        enemy.velocity *= config.water_speed_factor;
        if enemy.walking && world.rng.chance(config.water_splash_chance) {
            emit(
                out,
                Effect::Particles {
                    kind: ParticleKind::Splash,
                    position: enemy.position,
                    count: 1,
                },
            );
        }
    }

    enemy.position += enemy.velocity * dt;
    enemy.position = world
        .obstacles
        .push_out(enemy.position, config.collision_radius * enemy.size);
    strike
}
