#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded gradient-noise terrain and per-chunk obstacle scattering.

mod scatter;

pub use scatter::{ChunkCoord, ObstacleScatter, Placement, CHUNK_TILES};

use endless_assault_core::{TerrainKind, TerrainQuery, Vec2};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

const GRADIENTS: [(f64, f64); 8] = [
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
];

const RIVER_FREQUENCY: f64 = 0.0008;
const RIVER_OFFSET: f64 = 50.0;
const WATER_BAND: f64 = 0.06;
const BEACH_BAND: f64 = 0.1;

const HILL_FREQUENCY: f64 = 0.002;
const HILL_OFFSET: f64 = 200.0;
const HILL_THRESHOLD: f64 = 0.32;

const FOREST_FREQUENCY: f64 = 0.001;
const DENSE_FOREST: f64 = 0.65;
const LIGHT_FOREST: f64 = 0.45;

/// Terrain generated from layered gradient noise.
///
/// Rivers follow the zero crossings of a low frequency field and are lined
/// with beaches. Hills and forest floors come from fractal sums of the same
/// field sampled at other frequencies.
#[derive(Clone, Debug)]
pub struct NoiseTerrain {
    permutation: [u8; 512],
    seed: u64,
}

impl NoiseTerrain {
    /// Builds the lattice permutation for the provided seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut table: [u8; 256] = std::array::from_fn(|index| index as u8);
        table.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));

        let mut permutation = [0; 512];
        for (slot, value) in permutation.iter_mut().zip(table.iter().cycle()) {
            *slot = *value;
        }

        Self { permutation, seed }
    }

    /// Seed the permutation was shuffled with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Forest density around a position, roughly centred on `0.5`.
    #[must_use]
    pub fn forest_density(&self, position: Vec2) -> f64 {
        let (x, y) = (f64::from(position.x), f64::from(position.y));
        self.fbm(x * FOREST_FREQUENCY, y * FOREST_FREQUENCY, 3) + 0.5
    }

    fn classify(&self, x: f64, y: f64) -> TerrainKind {
        let river = self
            .noise(
                x * RIVER_FREQUENCY + RIVER_OFFSET,
                y * RIVER_FREQUENCY + RIVER_OFFSET,
            )
            .abs();
        if river < WATER_BAND {
            return TerrainKind::Water;
        }
        if river < BEACH_BAND {
            return TerrainKind::Sand;
        }

        let hill = self.fbm(
            x * HILL_FREQUENCY + HILL_OFFSET,
            y * HILL_FREQUENCY + HILL_OFFSET,
            2,
        );
        if hill > HILL_THRESHOLD {
            return TerrainKind::Hill;
        }

        let forest = self.fbm(x * FOREST_FREQUENCY, y * FOREST_FREQUENCY, 3) + 0.5;
        if forest > DENSE_FOREST {
            TerrainKind::Dark
        } else if forest > LIGHT_FOREST {
            TerrainKind::Dirt
        } else {
            TerrainKind::Grass
        }
    }

    fn hash(&self, column: usize, row: usize) -> usize {
        let first = usize::from(self.permutation[column]);
        usize::from(self.permutation[first + row])
    }

    /// Smoothed gradient noise; zero on every lattice point.
    fn noise(&self, x: f64, y: f64) -> f64 {
        let (x0, y0) = (x.floor(), y.floor());
        let column = (x0 as i64 & 255) as usize;
        let row = (y0 as i64 & 255) as usize;
        let (xf, yf) = (x - x0, y - y0);
        let (u, v) = (fade(xf), fade(yf));

        let aa = gradient(self.hash(column, row), xf, yf);
        let ba = gradient(self.hash(column + 1, row), xf - 1.0, yf);
        let ab = gradient(self.hash(column, row + 1), xf, yf - 1.0);
        let bb = gradient(self.hash(column + 1, row + 1), xf - 1.0, yf - 1.0);

        lerp(lerp(aa, ba, u), lerp(ab, bb, u), v)
    }

    fn fbm(&self, x: f64, y: f64, octaves: u32) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 0.5;
        let mut frequency = 1.0;
        for _ in 0..octaves {
            total += self.noise(x * frequency, y * frequency) * amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }
        total
    }
}

impl TerrainQuery for NoiseTerrain {
    fn terrain_at(&self, position: Vec2) -> TerrainKind {
        self.classify(f64::from(position.x), f64::from(position.y))
    }
}

fn fade(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from * (1.0 - t) + to * t
}

fn gradient(hash: usize, x: f64, y: f64) -> f64 {
    let (gx, gy) = GRADIENTS[hash & 7];
    gx * x + gy * y
}
