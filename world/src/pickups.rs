use endless_assault_core::{Event, PickupKind, SoundCue, Vec2};

use crate::{effects::sound, World};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Pickup {
    pub(crate) kind: PickupKind,
    pub(crate) position: Vec2,
    pub(crate) amount: f32,
    pub(crate) life: f32,
}

/// Returns `false` when the store is full and the pickup was dropped.
pub(crate) fn drop_pickup(pickups: &mut Vec<Pickup>, pickup: Pickup, capacity: usize) -> bool {
    if pickups.len() >= capacity {
        return false;
    }
    pickups.push(pickup);
    true
}

/// Expires old pickups and collects those within reach of the player.
pub(crate) fn update(world: &mut World, dt: f32, out: &mut Vec<Event>) {
    let World {
        pickups,
        player,
        tuning,
        ..
    } = world;
    let reach = tuning.combat.pickup_radius;

    pickups.retain_mut(|pickup| {
        pickup.life -= dt;
        if pickup.life <= 0.0 {
            return false;
        }
        if pickup.position.distance(player.position) >= reach {
            return true;
        }
        match pickup.kind {
            PickupKind::Health => player.hp = (player.hp + pickup.amount).min(player.max_hp),
            PickupKind::Shield => {
                player.shield = (player.shield + pickup.amount).min(player.max_shield);
            }
        }
        sound(out, SoundCue::Pickup, 0.5);
        out.push(Event::PickupCollected {
            kind: pickup.kind,
            amount: pickup.amount,
        });
        false
    });
}
