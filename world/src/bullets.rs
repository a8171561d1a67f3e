//! Bullet flight and collision resolution.

use endless_assault_core::{
    BulletTraits, ChainSpec, Effect, EnemyId, Event, ParticleKind, Vec2, WeaponSpec,
};

use crate::{
    damage,
    effects::{emit, explosion},
    geometry::{heading, nearest, unit},
    World,
};

const TRAIL_CHANCE: f32 = 0.5;
const BEAM_CHANCE: f32 = 0.8;

/// Side that fired a bullet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BulletOwner {
    /// Fired by the player; strikes enemies.
    Player,
    /// Fired by an enemy; strikes the player.
    Enemy,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Bullet {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) life: f32,
    pub(crate) damage: f32,
    pub(crate) owner: BulletOwner,
    pub(crate) traits: BulletTraits,
    pub(crate) explosion_radius: f32,
    pub(crate) chain: Option<ChainSpec>,
}

impl Bullet {
    pub(crate) fn from_weapon(spec: &WeaponSpec, position: Vec2, angle: f32, life: f32) -> Self {
        Self {
            position,
            velocity: unit(angle) * spec.bullet_speed,
            life,
            damage: spec.damage,
            owner: BulletOwner::Player,
            traits: spec.traits,
            explosion_radius: spec.explosion_radius,
            chain: spec.chain,
        }
    }

    pub(crate) fn from_enemy(
        position: Vec2,
        angle: f32,
        speed: f32,
        damage: f32,
        blast_radius: Option<f32>,
        life: f32,
    ) -> Self {
        let (traits, explosion_radius) = match blast_radius {
            Some(radius) => (BulletTraits::EXPLOSIVE, radius),
            None => (BulletTraits::empty(), 0.0),
        };
        Self {
            position,
            velocity: unit(angle) * speed,
            life,
            damage,
            owner: BulletOwner::Enemy,
            traits,
            explosion_radius,
            chain: None,
        }
    }

    fn is(&self, traits: BulletTraits) -> bool {
        self.traits.intersects(traits)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fate {
    Keep,
    Destroy,
}

/// Returns `false` when the bullet store is full and `bullet` was dropped.
pub(crate) fn push(bullets: &mut Vec<Bullet>, bullet: Bullet, capacity: usize) -> bool {
    if bullets.len() >= capacity {
        return false;
    }
    bullets.push(bullet);
    true
}

/// Moves every bullet and resolves what it strikes.
pub(crate) fn update(world: &mut World, dt: f32, out: &mut Vec<Event>) {
    let in_flight = std::mem::take(&mut world.bullets);
    let mut survivors = Vec::with_capacity(in_flight.len());
    for mut bullet in in_flight {
        if advance(world, &mut bullet, dt, out) == Fate::Keep {
            survivors.push(bullet);
        }
    }
    world.bullets = survivors;
}

fn advance(world: &mut World, bullet: &mut Bullet, dt: f32, out: &mut Vec<Event>) -> Fate {
    bullet.life -= dt;
    if bullet.life <= 0.0 {
        return Fate::Destroy;
    }
    bullet.position += bullet.velocity * dt;
    if bullet.position.distance(world.player.position) > world.tuning.combat.bullet_despawn_distance {
        return Fate::Destroy;
    }

    if bullet.is(BulletTraits::TRAIL) && world.rng.chance(TRAIL_CHANCE) {
        particle(out, ParticleKind::Trail, bullet.position);
    }
    if bullet.is(BulletTraits::BEAM) && world.rng.chance(BEAM_CHANCE) {
        particle(out, ParticleKind::Beam, bullet.position);
    }

    if strike_barrels(world, bullet, out) == Fate::Destroy {
        return Fate::Destroy;
    }
    match bullet.owner {
        BulletOwner::Player => strike_enemies(world, bullet, out),
        BulletOwner::Enemy => strike_player(world, bullet, out),
    }
}

fn particle(out: &mut Vec<Event>, kind: ParticleKind, position: Vec2) {
    emit(
        out,
        Effect::Particles {
            kind,
            position,
            count: 1,
        },
    );
}

fn strike_barrels(world: &mut World, bullet: &Bullet, out: &mut Vec<Event>) -> Fate {
    let reach = world.tuning.combat.barrel_hit_radius;
    for index in 0..world.obstacles.len() {
        let Some(barrel) = world.obstacles.get_mut(index) else {
            continue;
        };
        if !barrel.is_intact_barrel() || barrel.position.distance(bullet.position) >= reach {
            continue;
        }
        barrel.hp -= bullet.damage;
        let position = barrel.position;
        if barrel.hp <= 0.0 {
            barrel.exploded = true;
            explode_barrel(world, position, out);
        }
        if !bullet.is(BulletTraits::PIERCE | BulletTraits::EXPLOSIVE) {
            return Fate::Destroy;
        }
    }
    Fate::Keep
}

fn explode_barrel(world: &mut World, position: Vec2, out: &mut Vec<Event>) {
    let combat = &world.tuning.combat;
    let (radius, enemy_damage, player_damage, bonus) = (
        combat.barrel_explosion_radius,
        combat.barrel_enemy_damage,
        combat.barrel_player_damage,
        combat.barrel_score,
    );
    explosion(out, position, radius);
    damage::enqueue_blast(world, position, radius, enemy_damage, None);
    damage::blast_player(world, position, radius, player_damage, out);
    world.score.add_bonus(bonus);
    out.push(Event::BarrelExploded { position });
}

fn strike_enemies(world: &mut World, bullet: &Bullet, out: &mut Vec<Event>) -> Fate {
    let reach = world.tuning.combat.enemy_hit_radius;
    let angle = heading(bullet.velocity);

    for id in world.enemies.ids() {
        let Some(enemy) = world.enemies.get(id).copied() else {
            continue;
        };
        if enemy.dead || enemy.position.distance(bullet.position) >= reach * enemy.size {
            continue;
        }

        if let Some(chain) = bullet.chain {
            resolve_chain(world, id, enemy.position, bullet.damage, angle, chain, out);
            return Fate::Destroy;
        }

        if bullet.is(BulletTraits::DISINTEGRATE) && enemy.hp + enemy.shield - bullet.damage <= 0.0 {
            emit(
                out,
                Effect::Disintegration {
                    position: enemy.position,
                },
            );
        }
        damage::damage_enemy(world, id, bullet.damage, angle, out);

        if bullet.is(BulletTraits::EXPLOSIVE) {
            explosion(out, bullet.position, bullet.explosion_radius);
            let splash = bullet.damage * world.tuning.combat.splash_factor;
            damage::enqueue_blast(world, bullet.position, bullet.explosion_radius, splash, Some(id));
        }
        if !bullet.is(BulletTraits::PIERCE) {
            return Fate::Destroy;
        }
    }
    Fate::Keep
}

/// Strikes `first` at full damage, then arcs to the nearest enemy not yet in
/// the chain, up to `chain.links` times, at reduced damage.
fn resolve_chain(
    world: &mut World,
    first: EnemyId,
    first_position: Vec2,
    amount: f32,
    angle: f32,
    chain: ChainSpec,
    out: &mut Vec<Event>,
) {
    damage::damage_enemy(world, first, amount, angle, out);
    let arc_damage = amount * world.tuning.combat.chain_factor;
    let mut chained = vec![first];
    let mut from = first_position;

    for _ in 0..chain.links {
        let next = nearest(
            world
                .enemies
                .iter()
                .filter(|(id, enemy)| !enemy.dead && !chained.contains(id))
                .map(|(id, enemy)| ((id, enemy.position), enemy.position.distance(from)))
                .filter(|(_, distance)| *distance < chain.range),
        );
        let Some(((id, position), _)) = next else {
            break;
        };
        chained.push(id);
        emit(out, Effect::Lightning { from, to: position });
        damage::damage_enemy(world, id, arc_damage, heading(position - from), out);
        from = position;
    }
}

fn strike_player(world: &mut World, bullet: &Bullet, out: &mut Vec<Event>) -> Fate {
    if bullet.position.distance(world.player.position) >= world.tuning.player.hit_radius {
        return Fate::Keep;
    }
    damage::damage_player(world, bullet.damage, out);
    if bullet.is(BulletTraits::EXPLOSIVE) {
        explosion(out, bullet.position, bullet.explosion_radius);
    }
    Fate::Destroy
}
