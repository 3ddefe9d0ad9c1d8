use bevy::prelude::*;

use super::coords::Direction;
use super::tile::Tile;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Tile array is the `Floor` placeholder; a generator result is pending.
    Generating,
    Ready,
}

/// A square block of tiles, addressed by chunk-local coordinates.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub coord: IVec2,
    size: usize,
    tiles: Vec<Tile>,
    state: ChunkState,
    /// Door tile (world tile coordinates) on each side, set when glued to a neighbor.
    exits: [Option<IVec2>; 4],
    pub populated: bool,
}

impl Chunk {
    pub fn new(coord: IVec2, size: usize) -> Self {
        Self {
            coord,
            size,
            tiles: vec![Tile::Floor; size * size],
            state: ChunkState::Generating,
            exits: [None; 4],
            populated: false,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn state(&self) -> ChunkState {
        self.state
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state == ChunkState::Ready
    }

    #[inline]
    pub fn contains_local(&self, local: IVec2) -> bool {
        local.x >= 0 && local.y >= 0 && (local.x as usize) < self.size && (local.y as usize) < self.size
    }

    #[inline]
    fn index(&self, local: UVec2) -> Option<usize> {
        let (x, y) = (local.x as usize, local.y as usize);
        (x < self.size && y < self.size).then_some(y * self.size + x)
    }

    /// `Void` for coordinates outside the chunk.
    #[inline]
    pub fn get(&self, local: UVec2) -> Tile {
        self.index(local).map_or(Tile::Void, |i| self.tiles[i])
    }

    pub fn set(&mut self, local: UVec2, tile: Tile) -> bool {
        match self.index(local) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Swap in a generated layout. The whole array is replaced at once.
    pub fn apply_generated(&mut self, tiles: Vec<Tile>) -> bool {
        if tiles.len() != self.size * self.size {
            error!(
                "Generated layout for chunk {} has {} tiles, expected {}",
                self.coord,
                tiles.len(),
                self.size * self.size
            );
            return false;
        }
        self.tiles = tiles;
        self.state = ChunkState::Ready;
        true
    }

    #[inline]
    pub fn exit(&self, dir: Direction) -> Option<IVec2> {
        self.exits[dir.as_index()]
    }

    pub(super) fn set_exit(&mut self, dir: Direction, tile: IVec2) {
        self.exits[dir.as_index()] = Some(tile);
    }

    /// Local coordinates of every tile that satisfies `pred`, row-major.
    pub fn locals_where(&self, pred: impl Fn(Tile) -> bool) -> Vec<UVec2> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| pred(**t))
            .map(|(i, _)| UVec2::new((i % self.size) as u32, (i / self.size) as u32))
            .collect()
    }
}
