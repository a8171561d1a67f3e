use endless_assault_core::{ObstacleKind, Vec2};

/// Distance beyond which obstacles are skipped without computing a square root.
const QUICK_REJECT: f32 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Obstacle {
    pub(crate) kind: ObstacleKind,
    pub(crate) position: Vec2,
    pub(crate) hp: f32,
    pub(crate) exploded: bool,
}

impl Obstacle {
    pub(crate) fn is_intact_barrel(&self) -> bool {
        self.kind == ObstacleKind::Barrel && !self.exploded
    }
}

/// Static obstacles queried for push-out collision and destructible barrels.
#[derive(Clone, Debug, Default)]
pub(crate) struct Obstacles {
    items: Vec<Obstacle>,
}

impl Obstacles {
    pub(crate) fn place(&mut self, kind: ObstacleKind, position: Vec2, barrel_hp: f32) {
        self.items.push(Obstacle {
            kind,
            position,
            hp: barrel_hp,
            exploded: false,
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Obstacle> {
        self.items.get_mut(index)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.items.iter()
    }

    /// Rebuilds every barrel for a fresh run.
    pub(crate) fn restore_barrels(&mut self, barrel_hp: f32) {
        for obstacle in self
            .items
            .iter_mut()
            .filter(|obstacle| obstacle.kind == ObstacleKind::Barrel)
        {
            obstacle.hp = barrel_hp;
            obstacle.exploded = false;
        }
    }

    /// Pushes a circle of `radius` out of every overlapping solid obstacle.
    ///
    /// Obstacles are resolved one after another along their separating
    /// vectors. Exact overlaps of centres have no separating direction and
    /// are left untouched.
    pub(crate) fn push_out(&self, mut position: Vec2, radius: f32) -> Vec2 {
        for obstacle in &self.items {
            let Some(solid) = obstacle.kind.collision_radius() else {
                continue;
            };
            let offset = position - obstacle.position;
            if offset.x.abs() > QUICK_REJECT || offset.y.abs() > QUICK_REJECT {
                continue;
            }
            let min_distance = radius + solid;
            let distance_sq = offset.length_squared();
            if distance_sq < min_distance * min_distance && distance_sq > 0.0 {
                let distance = distance_sq.sqrt();
                position += offset / distance * (min_distance - distance);
            }
        }
        position
    }
}
