use endless_assault_core::{Command, TerrainKind, TerrainQuery, Tuning, Vec2};
use endless_assault_system_terrain::{ChunkCoord, NoiseTerrain, ObstacleScatter, Placement};
use endless_assault_world::{apply, query, World};

fn populated_world(seed: u64, radius: i32) -> (World, Vec<Placement>) {
    let terrain = NoiseTerrain::new(seed);
    let tuning = Tuning::default();
    let tile_size = tuning.frame.tile_size;
    let mut scatter = ObstacleScatter::new();
    let mut placements = Vec::new();
    let mut chunk = Vec::new();
    for x in -radius..radius {
        for y in -radius..radius {
            scatter.handle(&terrain, ChunkCoord::new(x, y), tile_size, &mut chunk);
            placements.extend(chunk.iter().copied());
        }
    }

    let mut world = World::from_config(tuning, seed, terrain).expect("default tuning is valid");
    let mut events = Vec::new();
    for placement in &placements {
        apply(
            &mut world,
            Command::PlaceObstacle {
                kind: placement.kind,
                position: placement.position,
            },
            &mut events,
        );
    }
    assert!(events.is_empty());
    (world, placements)
}

#[test]
fn world_answers_terrain_from_the_noise_field() {
    let (world, _) = populated_world(31, 1);
    let reference = NoiseTerrain::new(31);

    for step in -20..20 {
        let position = Vec2::new(step as f32 * 173.0, step as f32 * -59.0);
        assert_eq!(
            query::terrain_at(&world, position),
            reference.terrain_at(position)
        );
    }
    assert_eq!(query::terrain_at(&world, Vec2::ZERO), TerrainKind::Water);
}

#[test]
fn scattered_chunks_fill_the_obstacle_index() {
    let (world, placements) = populated_world(12, 2);

    let obstacles = query::obstacles(&world);
    assert_eq!(obstacles.len(), placements.len());
    for (obstacle, placement) in obstacles.iter().zip(&placements) {
        assert_eq!(obstacle.kind, placement.kind);
        assert_eq!(obstacle.position, placement.position);
        assert!(!obstacle.exploded);
    }
}
