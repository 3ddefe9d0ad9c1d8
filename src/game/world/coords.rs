use bevy::math::{IVec2, UVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Geometry shared by every chunk of a map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSettings {
    /// Side length of a chunk, in tiles.
    pub chunk_size: usize,
    /// Side length of a tile, in world units.
    pub tile_size: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self { chunk_size: 20, tile_size: 32.0 }
    }
}

impl GridSettings {
    #[inline]
    pub fn chunk_area(&self) -> usize {
        self.chunk_size * self.chunk_size
    }

    #[inline]
    pub fn world_to_tile(&self, pos: Vec2) -> IVec2 {
        (pos / self.tile_size).floor().as_ivec2()
    }

    /// Euclidean division, so tile -1 lands in chunk -1.
    #[inline]
    pub fn tile_to_chunk(&self, tile: IVec2) -> IVec2 {
        let size = self.chunk_size as i32;
        IVec2::new(tile.x.div_euclid(size), tile.y.div_euclid(size))
    }

    #[inline]
    pub fn tile_to_local(&self, tile: IVec2) -> UVec2 {
        let size = self.chunk_size as i32;
        UVec2::new(tile.x.rem_euclid(size) as u32, tile.y.rem_euclid(size) as u32)
    }

    #[inline]
    pub fn world_to_chunk(&self, pos: Vec2) -> IVec2 {
        self.tile_to_chunk(self.world_to_tile(pos))
    }

    /// World tile of a chunk's local (0, 0).
    #[inline]
    pub fn chunk_origin(&self, chunk: IVec2) -> IVec2 {
        chunk * self.chunk_size as i32
    }

    #[inline]
    pub fn local_to_tile(&self, chunk: IVec2, local: UVec2) -> IVec2 {
        self.chunk_origin(chunk) + local.as_ivec2()
    }

    /// Top-left corner of a tile in world units.
    #[inline]
    pub fn tile_to_world(&self, tile: IVec2) -> Vec2 {
        tile.as_vec2() * self.tile_size
    }

    #[inline]
    pub fn tile_center(&self, tile: IVec2) -> Vec2 {
        (tile.as_vec2() + Vec2::splat(0.5)) * self.tile_size
    }
}

/// The four sides of a chunk. `North` is +y.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East = 0,
    West = 1,
    North = 2,
    South = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::East, Direction::West, Direction::North, Direction::South];

    #[inline]
    pub fn as_index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::East => IVec2::X,
            Direction::West => IVec2::NEG_X,
            Direction::North => IVec2::Y,
            Direction::South => IVec2::NEG_Y,
        }
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
        }
    }

    /// Direction of a single-axis chunk step, if `step` is one.
    pub fn from_offset(step: IVec2) -> Option<Direction> {
        match (step.x, step.y) {
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            (0, 1) => Some(Direction::North),
            (0, -1) => Some(Direction::South),
            _ => None,
        }
    }
}
