use endless_assault_core::{ObstacleKind, TerrainKind, TerrainQuery, Vec2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::NoiseTerrain;

/// Tiles along each edge of a scatter chunk.
pub const CHUNK_TILES: u32 = 8;

/// Half extent of the square around the origin kept free of vegetation and rocks.
const SPAWN_CLEARING: f32 = 150.0;
/// Half extent of the square around the origin kept free of barrels.
const BARREL_CLEARING: f32 = 200.0;
const TREE_WATER_CLEARANCE: f32 = 40.0;
const ROCK_WATER_CLEARANCE: f32 = 25.0;
const FOREST_CHUNK_DENSITY: f64 = 0.5;

/// Integer coordinate of a square chunk of tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Chunk column.
    pub x: i32,
    /// Chunk row.
    pub y: i32,
}

impl ChunkCoord {
    /// Creates a chunk coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk containing the provided world position.
    #[must_use]
    pub fn containing(position: Vec2, tile_size: f32) -> Self {
        let extent = chunk_extent(tile_size);
        Self::new(
            (position.x / extent).floor() as i32,
            (position.y / extent).floor() as i32,
        )
    }

    /// World position of the chunk's minimum corner.
    #[must_use]
    pub fn origin(self, tile_size: f32) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32) * chunk_extent(tile_size)
    }

    fn stream(self, seed: u64) -> u64 {
        let mixed = i64::from(self.x).wrapping_mul(12_345) ^ i64::from(self.y).wrapping_mul(67_890);
        seed ^ mixed as u64
    }
}

/// Obstacle proposed for a chunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Obstacle kind.
    pub kind: ObstacleKind,
    /// World position of the obstacle centre.
    pub position: Vec2,
}

/// Scatters trees, rocks and barrels over chunks of a [`NoiseTerrain`].
///
/// Placements depend only on the terrain seed and the chunk coordinate, so
/// chunks may be populated lazily in any order.
#[derive(Debug, Default)]
pub struct ObstacleScatter {
    probes: Vec<Vec2>,
}

impl ObstacleScatter {
    /// Creates a scatter system with an empty probe buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the obstacles of one chunk.
    ///
    /// The output buffer is cleared before populating it.
    pub fn handle(
        &mut self,
        terrain: &NoiseTerrain,
        chunk: ChunkCoord,
        tile_size: f32,
        out: &mut Vec<Placement>,
    ) {
        out.clear();

        let origin = chunk.origin(tile_size);
        let extent = chunk_extent(tile_size);
        let mut rng = ChaCha8Rng::seed_from_u64(chunk.stream(terrain.seed()));

        let forested = terrain.forest_density(origin) > FOREST_CHUNK_DENSITY;
        let trees = if forested {
            30 + rng.gen_range(0..20)
        } else {
            5 + rng.gen_range(0..12)
        };
        let rocks = 3 + rng.gen_range(0..6);
        let military = rng.gen_range(0..3);

        for _ in 0..trees {
            let position = origin + Vec2::new(rng.gen(), rng.gen()) * extent;
            let roll: f32 = rng.gen();
            if in_clearing(position, SPAWN_CLEARING)
                || self.near_water(terrain, position, TREE_WATER_CLEARANCE, true)
            {
                continue;
            }
            let kind = if roll < 0.5 {
                ObstacleKind::Tree
            } else if roll < 0.75 {
                ObstacleKind::Pine
            } else {
                continue;
            };
            out.push(Placement { kind, position });
        }

        for _ in 0..rocks {
            let position = origin + Vec2::new(rng.gen(), rng.gen()) * extent;
            let roll: f32 = rng.gen();
            if in_clearing(position, SPAWN_CLEARING)
                || self.near_water(terrain, position, ROCK_WATER_CLEARANCE, false)
            {
                continue;
            }
            let on_hill = terrain.terrain_at(position) == TerrainKind::Hill;
            let kind = if roll < 0.35 {
                ObstacleKind::Rock
            } else if roll < 0.7 || on_hill {
                ObstacleKind::Boulder
            } else {
                continue;
            };
            out.push(Placement { kind, position });
        }

        for _ in 0..military {
            let position = origin + Vec2::new(rng.gen(), rng.gen()) * extent;
            let roll: f32 = rng.gen();
            if in_clearing(position, BARREL_CLEARING)
                || terrain.terrain_at(position) == TerrainKind::Water
            {
                continue;
            }
            if roll < 0.35 {
                out.push(Placement {
                    kind: ObstacleKind::Barrel,
                    position,
                });
            }
        }
    }

    fn near_water(
        &mut self,
        terrain: &NoiseTerrain,
        center: Vec2,
        radius: f32,
        diagonals: bool,
    ) -> bool {
        self.probes.clear();
        self.probes.push(center);
        for direction in [Vec2::X, Vec2::NEG_X, Vec2::Y, Vec2::NEG_Y] {
            self.probes.push(center + direction * radius);
        }
        if diagonals {
            for (x, y) in [(1.0, 1.0), (-1.0, 1.0), (1.0, -1.0), (-1.0, -1.0)] {
                self.probes.push(center + Vec2::new(x, y) * radius * 0.7);
            }
        }
        self.probes
            .iter()
            .any(|probe| terrain.terrain_at(*probe) == TerrainKind::Water)
    }
}

fn chunk_extent(tile_size: f32) -> f32 {
    CHUNK_TILES as f32 * tile_size
}

fn in_clearing(position: Vec2, half_extent: f32) -> bool {
    position.x.abs() < half_extent && position.y.abs() < half_extent
}
