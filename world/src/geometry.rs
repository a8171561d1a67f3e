use endless_assault_core::{TerrainKind, TerrainQuery, Vec2};

/// Unit vector pointing along `angle`.
pub(crate) fn unit(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Direction angle of `vector`; zero for the zero vector.
pub(crate) fn heading(vector: Vec2) -> f32 {
    vector.y.atan2(vector.x)
}

/// Linear falloff that is `1.0` at the centre and `0.0` at `radius`.
pub(crate) fn falloff(distance: f32, radius: f32) -> f32 {
    (1.0 - distance / radius).max(0.0)
}

/// Terrain under `position`, sampled at the corner of its tile.
pub(crate) fn terrain_under(terrain: &dyn TerrainQuery, tile_size: f32, position: Vec2) -> TerrainKind {
    let snapped = (position / tile_size).floor() * tile_size;
    terrain.terrain_at(snapped)
}

/// Candidate with the smallest distance; the earliest wins ties.
pub(crate) fn nearest<T>(candidates: impl Iterator<Item = (T, f32)>) -> Option<(T, f32)> {
    candidates.fold(None, |best, candidate| match best {
        Some(best) if best.1 <= candidate.1 => Some(best),
        _ => Some(candidate),
    })
}
