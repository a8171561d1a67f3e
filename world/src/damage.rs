//! Damage resolution for enemies and the player.
//!
//! Area effects never damage enemies directly. They enqueue into a
//! [`DamageQueue`] that is drained between update phases for a bounded number
//! of rounds, which keeps explosion cascades (a bomber death blast killing
//! another bomber) from recursing. Entries still queued after the last round
//! are discarded and counted.

use endless_assault_core::{
    Capabilities, Effect, EnemyId, Event, ParticleKind, PickupKind, SoundCue, Vec2,
};
use tracing::{debug, info, warn};

use crate::{
    decals::{BloodPool, Body, FloatingText},
    effects::{emit, explosion, notify, shake, sound},
    geometry::{falloff, heading, unit},
    pickups::{self, Pickup},
    scoring::streak_announcement,
    waves, World,
};

const BLOOD_POOL_SPREAD: Vec2 = Vec2::new(18.0, 12.0);
const SHIELD_DROP_SPREAD: Vec2 = Vec2::new(15.0, 10.0);
const SECOND_WIND_BLAST: f32 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PendingDamage {
    target: EnemyId,
    amount: f32,
    angle: f32,
}

/// Work list of enemy damage deferred to the next drain phase.
#[derive(Clone, Debug, Default)]
pub(crate) struct DamageQueue {
    entries: Vec<PendingDamage>,
}

impl DamageQueue {
    pub(crate) fn enqueue(&mut self, target: EnemyId, amount: f32, angle: f32) {
        self.entries.push(PendingDamage {
            target,
            amount,
            angle,
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn take_batch(&mut self) -> Vec<PendingDamage> {
        std::mem::take(&mut self.entries)
    }

    /// Drops every queued entry and reports how many were lost.
    pub(crate) fn discard(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }
}

/// Outcome of one drain phase of the deferred damage queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Rounds run before the queue emptied or the cap was reached.
    pub rounds: u32,
    /// Entries applied to a live enemy.
    pub applied: u32,
    /// Entries dropped because the round cap was reached.
    pub discarded: u32,
}

/// Applies queued damage for at most `drain_rounds` rounds.
///
/// Damage applied in one round may enqueue more (death blasts); that lands in
/// the next round. Entries aimed at removed or dying enemies are skipped.
pub(crate) fn drain(world: &mut World, out: &mut Vec<Event>) -> DrainReport {
    let max_rounds = world.tuning.combat.drain_rounds;
    let mut report = DrainReport::default();

    while !world.damage.is_empty() && report.rounds < max_rounds {
        report.rounds += 1;
        for entry in world.damage.take_batch() {
            let alive = world
                .enemies
                .get(entry.target)
                .is_some_and(|enemy| !enemy.dead);
            if alive {
                report.applied += 1;
                damage_enemy(world, entry.target, entry.amount, entry.angle, out);
            }
        }
    }

    let dropped = world.damage.discard();
    if dropped > 0 {
        report.discarded = u32::try_from(dropped).unwrap_or(u32::MAX);
        world.discarded_damage = world
            .discarded_damage
            .saturating_add(u64::try_from(dropped).unwrap_or(u64::MAX));
        warn!(
            entries = dropped,
            rounds = report.rounds,
            "deferred damage left after the final drain round was discarded"
        );
        out.push(Event::PendingDamageDiscarded {
            entries: report.discarded,
        });
    }

    world.last_drain = report;
    report
}

/// Queues `peak` damage with linear falloff for every live enemy within
/// `radius` of `center`, except `exclude`.
pub(crate) fn enqueue_blast(
    world: &mut World,
    center: Vec2,
    radius: f32,
    peak: f32,
    exclude: Option<EnemyId>,
) {
    for (id, enemy) in world.enemies.iter() {
        if enemy.dead || Some(id) == exclude {
            continue;
        }
        let offset = enemy.position - center;
        let distance = offset.length();
        if distance < radius {
            world
                .damage
                .enqueue(id, peak * falloff(distance, radius), heading(offset));
        }
    }
}

/// Damages the player at `center` when inside `radius`, scaled by falloff.
pub(crate) fn blast_player(
    world: &mut World,
    center: Vec2,
    radius: f32,
    peak: f32,
    out: &mut Vec<Event>,
) {
    let distance = world.player.position.distance(center);
    if distance < radius {
        damage_player(world, peak * falloff(distance, radius), out);
    }
}

/// Applies one hit to an enemy; shields absorb first and overflow reaches hit
/// points only when the shield breaks.
pub(crate) fn damage_enemy(
    world: &mut World,
    id: EnemyId,
    amount: f32,
    angle: f32,
    out: &mut Vec<Event>,
) {
    let combat = &world.tuning.combat;
    let Some(enemy) = world.enemies.get_mut(id) else {
        return;
    };
    if enemy.dead {
        return;
    }
    let position = enemy.position;

    if enemy.capabilities.contains(Capabilities::HAS_SHIELD) && enemy.shield > 0.0 {
        let absorbed = amount.min(enemy.shield);
        enemy.shield -= amount;
        enemy.hit_flash = combat.shield_hit_flash;
        let broken = enemy.shield <= 0.0;
        let overflow = if broken { -enemy.shield } else { 0.0 };
        if broken {
            enemy.shield = 0.0;
            enemy.hp -= overflow;
        }
        let lethal = overflow > 0.0 && enemy.hp <= 0.0;

        sound(out, SoundCue::ShieldHit, 0.25);
        out.push(Event::EnemyDamaged {
            enemy: id,
            hp_damage: overflow,
            shield_damage: absorbed,
        });
        if broken {
            sound(out, SoundCue::ShieldBreak, 0.4);
            emit(
                out,
                Effect::Particles {
                    kind: ParticleKind::ShieldShards,
                    position,
                    count: 15,
                },
            );
            out.push(Event::ShieldBroken { enemy: id });
        }
        if lethal {
            kill_enemy(world, id, out);
        }
        return;
    }

    enemy.hp -= amount;
    enemy.hit_flash = combat.hit_flash;
    enemy.stun = combat.hit_stun;
    enemy.knockback = unit(angle) * (combat.hit_knockback / enemy.kind.spec().size);
    let lethal = enemy.hp <= 0.0;

    emit(
        out,
        Effect::BloodSpray {
            position,
            angle,
            intensity: 0.8,
        },
    );
    sound(out, SoundCue::Hit, 0.3);
    out.push(Event::EnemyDamaged {
        enemy: id,
        hp_damage: amount,
        shield_damage: 0.0,
    });
    if lethal {
        kill_enemy(world, id, out);
    }
}

/// Resolves an enemy death exactly once.
///
/// The dying flag is latched before any side effect so cascades that reach
/// the same enemy again see it as gone.
pub(crate) fn kill_enemy(world: &mut World, id: EnemyId, out: &mut Vec<Event>) {
    let Some(enemy) = world.enemies.get_mut(id) else {
        return;
    };
    if enemy.dead {
        return;
    }
    enemy.dead = true;
    let enemy = *enemy;
    let spec = enemy.kind.spec();
    let boss = enemy.boss.is_some();

    let points = world
        .score
        .register_kill(spec.score, boss, &world.tuning.combat);
    let combo = world.score.combo;
    if let Some((text, duration)) = streak_announcement(combo) {
        notify(out, text, duration);
    }

    let charge_cap = world.tuning.player.special_charge_cap;
    world.player.special_charge = (world.player.special_charge + 1).min(charge_cap);

    world.decals.add_text(
        FloatingText {
            position: enemy.position,
            text: format!("+{points}"),
            life: world.tuning.frame.floating_text_lifetime,
            emphasized: boss || combo > 5,
        },
        world.tuning.capacity.max_floating_texts,
    );

    if enemy.capabilities.contains(Capabilities::EXPLODES_ON_DEATH) {
        let radius = spec.explosion_radius;
        let combat = &world.tuning.combat;
        let (enemy_blast, player_blast) =
            (combat.death_blast_enemy_damage, combat.death_blast_player_damage);
        explosion(out, enemy.position, radius);
        enqueue_blast(world, enemy.position, radius, enemy_blast, Some(id));
        blast_player(world, enemy.position, radius, player_blast, out);
    } else {
        spill_blood(world, enemy.position, out);
    }

    world.decals.add_body(
        Body {
            kind: enemy.kind,
            position: enemy.position,
            angle: enemy.facing + std::f32::consts::PI,
            size: if boss { spec.size * 2.0 } else { spec.size },
            created_at: world.game_time,
        },
        world.tuning.capacity.max_bodies,
    );

    drop_pickups(world, enemy.position, boss);

    if boss {
        sound(out, SoundCue::BossDeath, 0.8);
    } else {
        sound(out, SoundCue::Death, 0.4);
    }
    let _ = world.enemies.remove(id);
    out.push(Event::EnemyKilled {
        enemy: id,
        kind: enemy.kind,
        boss,
        points,
        combo,
    });

    let reward = if boss {
        world.score.complete_unlock()
    } else {
        None
    };
    match reward {
        Some(weapon) => {
            let name = weapon.spec().name;
            out.push(Event::WeaponUnlocked { weapon });
            notify(
                out,
                format!("BOSS DEFEATED! NEW WEAPON: {}!", name.to_uppercase()),
                3.5,
            );
            sound(out, SoundCue::Unlock, 0.8);
            explosion(
                out,
                enemy.position,
                world.tuning.combat.boss_death_explosion_radius,
            );
            info!(weapon = name, score = world.score.score, "weapon unlocked");
        }
        None => waves::check_weapon_unlocks(world, out),
    }
}

fn spill_blood(world: &mut World, position: Vec2, out: &mut Vec<Event>) {
    for intensity in [2.0, 1.2] {
        let angle = world.rng.angle();
        emit(
            out,
            Effect::BloodSpray {
                position,
                angle,
                intensity,
            },
        );
    }

    let capacity = world.tuning.capacity.max_blood_pools;
    for _ in 0..world.tuning.combat.blood_pools_per_death {
        let offset = Vec2::new(
            world.rng.range(-BLOOD_POOL_SPREAD.x, BLOOD_POOL_SPREAD.x),
            world.rng.range(-BLOOD_POOL_SPREAD.y, BLOOD_POOL_SPREAD.y),
        );
        let pool = BloodPool {
            position: position + offset,
            max_radius: world.rng.range(14.0, 30.0),
            created_at: world.game_time,
        };
        if !world.decals.add_blood_pool(pool, capacity) {
            break;
        }
    }
}

fn drop_pickups(world: &mut World, position: Vec2, boss: bool) {
    let combat = &world.tuning.combat;
    let wave = world.waves.wave as f32;
    let capacity = world.tuning.capacity.max_pickups;
    let health_chance = if boss {
        combat.boss_health_drop_chance
    } else {
        combat.health_drop_chance
    };

    if world.rng.chance(health_chance) {
        let _ = pickups::drop_pickup(
            &mut world.pickups,
            Pickup {
                kind: PickupKind::Health,
                position,
                amount: combat.health_pickup_base + combat.health_pickup_per_wave * wave,
                life: combat.pickup_lifetime,
            },
            capacity,
        );
    }
    if world.rng.chance(combat.shield_drop_chance) {
        let offset = Vec2::new(
            world.rng.range(-SHIELD_DROP_SPREAD.x, SHIELD_DROP_SPREAD.x),
            world.rng.range(-SHIELD_DROP_SPREAD.y, SHIELD_DROP_SPREAD.y),
        );
        let _ = pickups::drop_pickup(
            &mut world.pickups,
            Pickup {
                kind: PickupKind::Shield,
                position: position + offset,
                amount: combat.shield_pickup_base + combat.shield_pickup_per_wave * wave,
                life: combat.pickup_lifetime,
            },
            capacity,
        );
    }
}

/// Applies one hit to the player. Ignored while invincible or dodging.
///
/// A lethal hit triggers a second wind instead of ending the run.
pub(crate) fn damage_player(world: &mut World, amount: f32, out: &mut Vec<Event>) {
    let config = &world.tuning.player;
    let player = &mut world.player;
    if player.invincible > 0.0 || player.is_dodging() {
        return;
    }
    player.since_damage = 0.0;

    let mut hp_damage = amount;
    let mut shield_damage = 0.0;
    if player.shield > 0.0 {
        shield_damage = amount.min(player.shield);
        hp_damage = 0.0;
        player.shield -= amount;
        sound(out, SoundCue::ShieldHit, 0.3);
        if player.shield < 0.0 {
            hp_damage = -player.shield;
            player.shield = 0.0;
            player.hp -= hp_damage;
            sound(out, SoundCue::ShieldBreak, 0.5);
        }
    } else {
        player.hp -= amount;
    }

    player.hit_flash = config.hit_flash;
    shake(out, config.hit_shake);
    player.record_damage(
        amount,
        config.damage_number_lifetime,
        world.tuning.capacity.max_damage_numbers,
    );
    out.push(Event::PlayerDamaged {
        hp_damage,
        shield_damage,
    });

    if player.hp <= 0.0 {
        player.hp = player.max_hp * config.second_wind_hp;
        player.shield = player.max_shield * config.second_wind_shield;
        player.invincible = config.second_wind_invincibility;
        explosion(out, player.position, SECOND_WIND_BLAST);
        notify(out, "SECOND WIND!", 1.5);
        out.push(Event::SecondWind);
        debug!(hp = player.hp, "second wind");
    }
}

#[cfg(test)]
mod tests {
    use endless_assault_core::{EnemyKind, SpawnError};

    use super::*;
    use crate::enemies::spawn_enemy;

    fn spawn(world: &mut World, kind: EnemyKind, position: Vec2) -> EnemyId {
        let mut events = Vec::new();
        let spawned: Result<EnemyId, SpawnError> = spawn_enemy(world, kind, position, &mut events);
        spawned.expect("arena has room")
    }

    #[test]
    fn unshielded_player_loses_hit_points_and_flashes() {
        let mut world = World::new();
        world.player.shield = 0.0;
        let mut events = Vec::new();

        damage_player(&mut world, 50.0, &mut events);

        assert_eq!(world.player.hp, 750.0);
        assert_eq!(world.player.shield, 0.0);
        assert_eq!(world.player.hit_flash, 0.15);
        assert!(events.contains(&Event::PlayerDamaged {
            hp_damage: 50.0,
            shield_damage: 0.0,
        }));
    }

    #[test]
    fn player_shield_absorbs_then_overflows() {
        let mut world = World::new();
        world.player.shield = 30.0;
        let mut events = Vec::new();

        damage_player(&mut world, 50.0, &mut events);

        assert_eq!(world.player.shield, 0.0);
        assert_eq!(world.player.hp, 780.0);
        assert!(events.contains(&Event::PlayerDamaged {
            hp_damage: 20.0,
            shield_damage: 30.0,
        }));
    }

    #[test]
    fn invincible_or_dodging_player_ignores_damage() {
        let mut world = World::new();
        world.player.invincible = 1.0;
        let mut events = Vec::new();

        damage_player(&mut world, 500.0, &mut events);

        assert_eq!(world.player.hp, 800.0);
        assert!(events.is_empty());
    }

    #[test]
    fn lethal_hit_triggers_second_wind() {
        let mut world = World::new();
        world.player.shield = 0.0;
        world.player.hp = 10.0;
        let mut events = Vec::new();

        damage_player(&mut world, 50.0, &mut events);

        assert!((world.player.hp - 240.0).abs() < 1e-3);
        assert!((world.player.shield - 60.0).abs() < 1e-3);
        assert_eq!(world.player.invincible, 2.0);
        assert!(events.contains(&Event::SecondWind));
    }

    #[test]
    fn shield_overflow_reaches_hit_points() {
        let mut world = World::new();
        let id = spawn(&mut world, EnemyKind::Shielded, Vec2::new(300.0, 0.0));
        let mut events = Vec::new();

        damage_enemy(&mut world, id, 100.0, 0.0, &mut events);

        let enemy = world.enemies.get(id).expect("enemy survives");
        assert_eq!(enemy.shield, 0.0);
        assert_eq!(enemy.hp, 80.0);
        assert!(events.contains(&Event::ShieldBroken { enemy: id }));
        assert!(events.contains(&Event::EnemyDamaged {
            enemy: id,
            hp_damage: 20.0,
            shield_damage: 80.0,
        }));
    }

    #[test]
    fn kill_is_resolved_once() {
        let mut world = World::new();
        let id = spawn(&mut world, EnemyKind::Militia, Vec2::new(300.0, 0.0));
        let mut events = Vec::new();

        kill_enemy(&mut world, id, &mut events);
        kill_enemy(&mut world, id, &mut events);
        damage_enemy(&mut world, id, 100.0, 0.0, &mut events);

        let kills = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyKilled { .. }))
            .count();
        assert_eq!(kills, 1);
        assert_eq!(world.score.kills, 1);
        assert_eq!(world.score.score, 10);
        assert_eq!(world.decals.bodies.len(), 1);
        assert_eq!(world.player.special_charge, 1);
        assert!(world.enemies.get(id).is_none());
    }

    #[test]
    fn queued_damage_for_removed_targets_is_skipped() {
        let mut world = World::new();
        let id = spawn(&mut world, EnemyKind::Militia, Vec2::new(300.0, 0.0));
        world.damage.enqueue(id, 100.0, 0.0);
        world.damage.enqueue(id, 100.0, 0.0);
        let mut events = Vec::new();

        let report = drain(&mut world, &mut events);

        assert_eq!(
            report,
            DrainReport {
                rounds: 1,
                applied: 1,
                discarded: 0,
            }
        );
        assert_eq!(world.score.kills, 1);
    }

    #[test]
    fn bomber_death_blast_lands_in_the_next_round() {
        let mut world = World::new();
        let bomber = spawn(&mut world, EnemyKind::Bomber, Vec2::new(500.0, 0.0));
        let heavy = spawn(&mut world, EnemyKind::Heavy, Vec2::new(550.0, 0.0));
        world.damage.enqueue(bomber, 100.0, 0.0);
        let mut events = Vec::new();

        let report = drain(&mut world, &mut events);

        assert_eq!(report.rounds, 2);
        assert_eq!(report.applied, 2);
        let survivor = world.enemies.get(heavy).expect("heavy survives the blast");
        assert!((survivor.hp - 140.0).abs() < 1e-3);
        assert_eq!(world.player.hp, 800.0);
    }

    #[test]
    fn leftover_entries_past_the_round_cap_are_counted() {
        let mut world = World::new();
        world.tuning.combat.drain_rounds = 1;
        let first = spawn(&mut world, EnemyKind::Bomber, Vec2::new(500.0, 0.0));
        let _second = spawn(&mut world, EnemyKind::Bomber, Vec2::new(540.0, 0.0));
        world.damage.enqueue(first, 100.0, 0.0);
        let mut events = Vec::new();

        let report = drain(&mut world, &mut events);

        assert_eq!(report.discarded, 1);
        assert_eq!(world.discarded_damage, 1);
        assert!(world.damage.is_empty());
        assert!(events.contains(&Event::PendingDamageDiscarded { entries: 1 }));
    }
}
