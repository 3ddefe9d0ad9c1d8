use serde::{Deserialize, Serialize};

/// A single grid cell.
///
/// Walkability depends only on the variant: `Wall` is the one blocking tile.
/// Damaged variants are what explosions leave behind and stay passable.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Outside any created chunk.
    #[default]
    Void = 0,
    Floor = 1,
    Wall = 2,
    Door = 3,
    DamagedWall = 4,
    DamagedFloor = 5,
}

impl Tile {
    #[inline]
    pub fn is_blocking(self) -> bool {
        matches!(self, Tile::Wall)
    }

    #[inline]
    pub fn is_walkable(self) -> bool {
        !self.is_blocking()
    }

    /// What an explosion turns this tile into, if anything.
    pub fn damaged(self) -> Option<Tile> {
        match self {
            Tile::Wall => Some(Tile::DamagedWall),
            Tile::Floor => Some(Tile::DamagedFloor),
            _ => None,
        }
    }
}
