use std::collections::VecDeque;

use endless_assault_core::{EnemyKind, Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Body {
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    pub(crate) angle: f32,
    pub(crate) size: f32,
    pub(crate) created_at: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BloodPool {
    pub(crate) position: Vec2,
    pub(crate) max_radius: f32,
    pub(crate) created_at: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FloatingText {
    pub(crate) position: Vec2,
    pub(crate) text: String,
    pub(crate) life: f32,
    pub(crate) emphasized: bool,
}

/// Bounded stores of cosmetic leftovers.
///
/// Bodies and floating texts evict their oldest entry at capacity; blood
/// pools reject new entries instead. Bodies and pools both fade out after
/// `body_fade_end` seconds.
#[derive(Clone, Debug, Default)]
pub(crate) struct Decals {
    pub(crate) bodies: VecDeque<Body>,
    pub(crate) blood_pools: Vec<BloodPool>,
    pub(crate) floating_texts: VecDeque<FloatingText>,
}

impl Decals {
    pub(crate) fn add_body(&mut self, body: Body, capacity: usize) {
        if self.bodies.len() >= capacity {
            let _ = self.bodies.pop_front();
        }
        self.bodies.push_back(body);
    }

    /// Returns `false` when the store is full and the pool was dropped.
    pub(crate) fn add_blood_pool(&mut self, pool: BloodPool, capacity: usize) -> bool {
        if self.blood_pools.len() >= capacity {
            return false;
        }
        self.blood_pools.push(pool);
        true
    }

    pub(crate) fn add_text(&mut self, text: FloatingText, capacity: usize) {
        if self.floating_texts.len() >= capacity {
            let _ = self.floating_texts.pop_front();
        }
        self.floating_texts.push_back(text);
    }

    /// Ages texts and removes bodies and pools older than `body_fade_end`.
    pub(crate) fn update(&mut self, dt: f32, game_time: f32, rise: f32, body_fade_end: f32) {
        for text in &mut self.floating_texts {
            text.life -= dt;
            text.position.y -= rise * dt;
        }
        self.floating_texts.retain(|text| text.life > 0.0);
        self.bodies
            .retain(|body| game_time - body.created_at <= body_fade_end);
        self.blood_pools
            .retain(|pool| game_time - pool.created_at <= body_fade_end);
    }

    pub(crate) fn clear(&mut self) {
        self.bodies.clear();
        self.blood_pools.clear();
        self.floating_texts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(created_at: f32) -> Body {
        Body {
            kind: EnemyKind::Militia,
            position: Vec2::ZERO,
            angle: 0.0,
            size: 1.0,
            created_at,
        }
    }

    fn pool(created_at: f32) -> BloodPool {
        BloodPool {
            position: Vec2::ZERO,
            max_radius: 20.0,
            created_at,
        }
    }

    fn text(label: &str, life: f32) -> FloatingText {
        FloatingText {
            position: Vec2::ZERO,
            text: label.to_owned(),
            life,
            emphasized: false,
        }
    }

    #[test]
    fn bodies_evict_oldest_at_capacity() {
        let mut decals = Decals::default();
        for created_at in [1.0, 2.0, 3.0] {
            decals.add_body(body(created_at), 2);
        }

        let ages: Vec<f32> = decals.bodies.iter().map(|body| body.created_at).collect();
        assert_eq!(ages, vec![2.0, 3.0]);
    }

    #[test]
    fn blood_pools_reject_at_capacity() {
        let mut decals = Decals::default();
        let pool = pool(0.0);

        assert!(decals.add_blood_pool(pool, 1));
        assert!(!decals.add_blood_pool(pool, 1));
        assert_eq!(decals.blood_pools.len(), 1);
    }

    #[test]
    fn texts_rise_and_expire() {
        let mut decals = Decals::default();
        decals.add_text(text("+10", 1.0), 8);
        decals.add_text(text("+20", 0.1), 8);

        decals.update(0.5, 0.5, 40.0, 25.0);

        assert_eq!(decals.floating_texts.len(), 1);
        let survivor = &decals.floating_texts[0];
        assert_eq!(survivor.text, "+10");
        assert_eq!(survivor.position.y, -20.0);
    }

    #[test]
    fn bodies_fade_after_end_time() {
        let mut decals = Decals::default();
        decals.add_body(body(0.0), 8);
        decals.add_body(body(10.0), 8);

        decals.update(0.0, 30.0, 40.0, 25.0);

        assert_eq!(decals.bodies.len(), 1);
        decals.clear();
        assert!(decals.bodies.is_empty());
    }

    #[test]
    fn faded_blood_pools_make_room_for_new_ones() {
        let mut decals = Decals::default();
        assert!(decals.add_blood_pool(pool(0.0), 2));
        assert!(decals.add_blood_pool(pool(10.0), 2));
        assert!(!decals.add_blood_pool(pool(20.0), 2));

        decals.update(0.0, 30.0, 40.0, 25.0);

        assert_eq!(decals.blood_pools.len(), 1);
        assert!(decals.add_blood_pool(pool(30.0), 2));
        let ages: Vec<f32> = decals.blood_pools.iter().map(|pool| pool.created_at).collect();
        assert_eq!(ages, vec![10.0, 30.0]);
    }
}
