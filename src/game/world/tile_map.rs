use std::collections::VecDeque;
use std::sync::Arc;

use bevy::prelude::*;
use rustc_hash::FxHashMap;

use crate::game::config::InitialConfig;
use super::chunk::Chunk;
use super::coords::{Direction, GridSettings};
use super::generation::TerrainGenerator;
use super::tile::Tile;

/// A tile resolved against the chunk store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetailedTile {
    pub tile: Tile,
    /// Owning chunk, `None` when the chunk does not exist yet.
    pub chunk: Option<IVec2>,
    pub local: UVec2,
    pub world: IVec2,
}

/// Sparse, unbounded grid of lazily generated chunks.
///
/// Lookups outside any created chunk resolve to `Tile::Void`. Chunks are never
/// evicted.
#[derive(Resource)]
pub struct TileMap {
    settings: GridSettings,
    chunks: FxHashMap<IVec2, Chunk>,
    generator: Arc<dyn TerrainGenerator>,
    /// Created chunks whose layout has not been handed to a generator yet.
    pending: VecDeque<IVec2>,
}

impl FromWorld for TileMap {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource::<InitialConfig>().cloned().unwrap_or_default();
        TileMap::new(config.grid_settings(), Arc::new(config.bsp_generator()))
    }
}

impl TileMap {
    pub fn new(settings: GridSettings, generator: Arc<dyn TerrainGenerator>) -> Self {
        Self {
            settings,
            chunks: FxHashMap::default(),
            generator,
            pending: VecDeque::new(),
        }
    }

    #[inline]
    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn generator(&self) -> Arc<dyn TerrainGenerator> {
        Arc::clone(&self.generator)
    }

    pub fn chunk(&self, coord: IVec2) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn chunk_mut(&mut self, coord: IVec2) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Insert a `Floor` placeholder chunk and queue it for generation.
    ///
    /// Returns `false` if the chunk already exists; nothing is regenerated.
    pub fn create_chunk_if_absent(&mut self, coord: IVec2) -> bool {
        if self.chunks.contains_key(&coord) {
            return false;
        }
        self.chunks.insert(coord, Chunk::new(coord, self.settings.chunk_size));
        self.pending.push_back(coord);
        debug!("Created chunk {}", coord);
        true
    }

    pub fn take_pending(&mut self) -> Vec<IVec2> {
        self.pending.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Land a generator result: swap the layout in and glue the chunk to every
    /// cardinal neighbour that is already ready.
    pub fn finish_generation(&mut self, coord: IVec2, tiles: Vec<Tile>) -> bool {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            warn!("Generation finished for unknown chunk {}", coord);
            return false;
        };
        if chunk.is_ready() {
            warn!("Chunk {} was already generated, dropping result", coord);
            return false;
        }
        if !chunk.apply_generated(tiles) {
            return false;
        }

        for dir in Direction::ALL {
            let neighbour = coord + dir.offset();
            if self.chunks.get(&neighbour).is_some_and(Chunk::is_ready) {
                self.glue(coord, dir);
            }
        }
        debug!("Chunk {} ready", coord);
        true
    }

    /// Run every queued generation on the calling thread.
    pub fn generate_pending_blocking(&mut self) {
        let size = self.settings.chunk_size;
        for coord in self.take_pending() {
            let tiles = self.generator.generate(coord, size);
            self.finish_generation(coord, tiles);
        }
    }

    /// Create a chunk and generate it immediately if it is not ready yet.
    pub fn ensure_chunk_ready(&mut self, coord: IVec2) {
        self.create_chunk_if_absent(coord);
        if self.chunks.get(&coord).is_some_and(|c| !c.is_ready()) {
            self.pending.retain(|c| *c != coord);
            let tiles = self.generator.generate(coord, self.settings.chunk_size);
            self.finish_generation(coord, tiles);
        }
    }

    pub fn probe_tile(&self, world: IVec2) -> DetailedTile {
        let coord = self.settings.tile_to_chunk(world);
        let local = self.settings.tile_to_local(world);
        match self.chunks.get(&coord) {
            Some(chunk) => DetailedTile { tile: chunk.get(local), chunk: Some(coord), local, world },
            None => DetailedTile { tile: Tile::Void, chunk: None, local, world },
        }
    }

    #[inline]
    pub fn get_tile(&self, world: IVec2) -> Tile {
        self.probe_tile(world).tile
    }

    #[inline]
    pub fn is_tile(&self, world: IVec2, tile: Tile) -> bool {
        self.get_tile(world) == tile
    }

    /// Returns `false` (and changes nothing) when the owning chunk is missing.
    pub fn set_tile(&mut self, world: IVec2, tile: Tile) -> bool {
        let coord = self.settings.tile_to_chunk(world);
        let local = self.settings.tile_to_local(world);
        match self.chunks.get_mut(&coord) {
            Some(chunk) => chunk.set(local, tile),
            None => false,
        }
    }

    /// Open a door pair across the edge between `coord` and its neighbour in `dir`.
    fn glue(&mut self, coord: IVec2, dir: Direction) {
        let neighbour = coord + dir.offset();
        let size = self.settings.chunk_size as u32;
        if size < 3 {
            return;
        }
        let last = size - 1;

        // (edge in a, inward in a) and (edge in b, inward in b) at position i along the seam
        let seam = |i: u32| -> [UVec2; 4] {
            match dir {
                Direction::East => [UVec2::new(last, i), UVec2::new(last - 1, i), UVec2::new(0, i), UVec2::new(1, i)],
                Direction::West => [UVec2::new(0, i), UVec2::new(1, i), UVec2::new(last, i), UVec2::new(last - 1, i)],
                Direction::North => [UVec2::new(i, last), UVec2::new(i, last - 1), UVec2::new(i, 0), UVec2::new(i, 1)],
                Direction::South => [UVec2::new(i, 0), UVec2::new(i, 1), UVec2::new(i, last), UVec2::new(i, last - 1)],
            }
        };

        let (Some(a), Some(b)) = (self.chunks.get(&coord), self.chunks.get(&neighbour)) else { return };

        // Exact alignment first, then the facing tile one step either way.
        let opening = [0i32, -1, 1].into_iter().find_map(|offset| {
            (1..last).find_map(|i| {
                let j = i as i32 + offset;
                if j < 1 || j >= last as i32 {
                    return None;
                }
                let j = j as u32;
                let inward_a = seam(i)[1];
                let inward_b = seam(j)[3];
                (a.get(inward_a).is_walkable() && b.get(inward_b).is_walkable()).then_some((i, j))
            })
        });

        let (i, j) = match opening {
            Some(pair) => pair,
            None => {
                let mid = size / 2;
                error!("No aligned opening between chunks {} and {}, forcing a door at {}", coord, neighbour, mid);
                let [_, inward_a, _, inward_b] = seam(mid);
                if let Some(a) = self.chunks.get_mut(&coord) {
                    a.set(inward_a, Tile::Floor);
                }
                if let Some(b) = self.chunks.get_mut(&neighbour) {
                    b.set(inward_b, Tile::Floor);
                }
                (mid, mid)
            }
        };

        let [edge_a, _, edge_b, _] = seam(i);
        let edge_b_offset = seam(j)[2];
        let exit_a = self.settings.local_to_tile(coord, edge_a);
        let exit_b = self.settings.local_to_tile(neighbour, edge_b);

        if let Some(a) = self.chunks.get_mut(&coord) {
            a.set(edge_a, Tile::Door);
            a.set_exit(dir, exit_a);
        }
        if let Some(b) = self.chunks.get_mut(&neighbour) {
            b.set(edge_b, Tile::Door);
            b.set(edge_b_offset, Tile::Door);
            b.set_exit(dir.opposite(), exit_b);
        }
        debug!("Glued chunk {} to {} at {} / {}", coord, neighbour, exit_a, exit_b);
    }
}
