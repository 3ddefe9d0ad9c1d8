/// Tile world: the chunk store, terrain generation and grid queries.
///
/// - **tile / chunk / coords**: plain data and coordinate conversion
/// - **tile_map**: the `TileMap` resource (lazy chunks, door gluing)
/// - **generation**: `TerrainGenerator` implementations
/// - **query**: collision and raycast against the grid
/// - **explosion**: terrain damage
/// - **systems**: chunk streaming and async generation

mod tile;
mod chunk;
mod coords;
mod tile_map;
mod generation;
mod query;
mod explosion;
mod systems;


pub use tile::Tile;
pub use chunk::{Chunk, ChunkState};
pub use coords::{Direction, GridSettings};
pub use tile_map::{DetailedTile, TileMap};
pub use generation::{BspGenerator, PerimeterGenerator, TerrainGenerator};
pub use systems::{ChunkReady, GenerationTasks};

use bevy::prelude::*;
use crate::game::config::{InitialConfig, RuntimeSettings};
use crate::game::simulation::SimSet;

/// Chunk streaming and generation; runs before anything reads the map.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct WorldSystems;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InitialConfig>();
        app.init_resource::<RuntimeSettings>();
        app.init_resource::<TileMap>();
        app.init_resource::<GenerationTasks>();
        app.add_message::<ChunkReady>();

        app.add_systems(FixedUpdate, (
            systems::stream_chunks,
            systems::spawn_generation_tasks,
            systems::poll_generation_tasks,
        ).chain().in_set(WorldSystems).in_set(SimSet::Input));
    }
}
