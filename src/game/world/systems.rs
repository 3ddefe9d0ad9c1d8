use bevy::prelude::*;
use bevy::tasks::{block_on, futures_lite::future, AsyncComputeTaskPool, Task};

use crate::game::config::RuntimeSettings;
use crate::game::simulation::{Behavior, SimPosition};
use super::tile::Tile;
use super::tile_map::TileMap;

/// Sent once per chunk, the tick its generated layout lands in the map.
#[derive(Message, Debug, Clone, Copy)]
pub struct ChunkReady {
    pub coord: IVec2,
}

/// Generator runs in flight on the async compute pool.
#[derive(Resource, Default)]
pub struct GenerationTasks(pub Vec<(IVec2, Task<Vec<Tile>>)>);

/// Create every chunk within the streaming radius of each player.
pub(super) fn stream_chunks(
    mut map: ResMut<TileMap>,
    settings: Res<RuntimeSettings>,
    players: Query<(&SimPosition, &Behavior)>,
) {
    let radius = settings.chunk_stream_radius.max(0);
    for (pos, behavior) in players.iter() {
        if !matches!(behavior, Behavior::Player) {
            continue;
        }
        let center = map.settings().world_to_chunk(pos.0);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                map.create_chunk_if_absent(center + IVec2::new(dx, dy));
            }
        }
    }
}

pub(super) fn spawn_generation_tasks(mut map: ResMut<TileMap>, mut tasks: ResMut<GenerationTasks>) {
    if !map.has_pending() {
        return;
    }
    let pool = AsyncComputeTaskPool::get();
    let size = map.settings().chunk_size;
    for coord in map.take_pending() {
        let generator = map.generator();
        let task = pool.spawn(async move { generator.generate(coord, size) });
        tasks.0.push((coord, task));
    }
}

pub(super) fn poll_generation_tasks(
    mut map: ResMut<TileMap>,
    mut tasks: ResMut<GenerationTasks>,
    mut ready: MessageWriter<ChunkReady>,
) {
    let mut still_running = Vec::with_capacity(tasks.0.len());
    for (coord, mut task) in tasks.0.drain(..) {
        match block_on(future::poll_once(&mut task)) {
            Some(tiles) => {
                if map.finish_generation(coord, tiles) {
                    ready.write(ChunkReady { coord });
                }
            }
            None => still_running.push((coord, task)),
        }
    }
    tasks.0 = still_running;
}
