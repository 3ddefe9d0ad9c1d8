use std::cmp::Ordering;
use std::fmt;

use bevy::prelude::*;

use crate::game::world::Direction;

/// World-tile route stored goal first, start last.
///
/// Consecutive entries are 4- or 8-neighbours.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    tiles: Vec<IVec2>,
}

impl Path {
    pub fn new(tiles: Vec<IVec2>) -> Self {
        Self { tiles }
    }

    pub fn tiles(&self) -> &[IVec2] {
        &self.tiles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of moves from start to goal.
    #[inline]
    pub fn steps(&self) -> usize {
        self.tiles.len().saturating_sub(1)
    }

    pub fn goal(&self) -> Option<IVec2> {
        self.tiles.first().copied()
    }

    pub fn start(&self) -> Option<IVec2> {
        self.tiles.last().copied()
    }

    /// Tile `index` moves along from the start; index 0 is the start tile.
    #[inline]
    pub fn from_start(&self, index: usize) -> Option<IVec2> {
        self.tiles.len().checked_sub(index + 1).map(|i| self.tiles[i])
    }
}

/// Bounds on a single search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathLimits {
    /// Expansion cap per chunk-local search, as a multiple of the chunk area.
    pub expansion_multiplier: usize,
    pub max_chunk_hops: usize,
}

impl Default for PathLimits {
    fn default() -> Self {
        Self { expansion_multiplier: 4, max_chunk_hops: 16 }
    }
}

impl PathLimits {
    #[inline]
    pub fn max_expansions(&self, chunk_area: usize) -> usize {
        self.expansion_multiplier * chunk_area
    }
}

/// Why a search produced no path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathFailure {
    /// Start tile is in a chunk that does not exist.
    StartOutsideWorld,
    GoalOutsideWorld,
    /// A chunk on the hop route has not been created.
    ChunkMissing { chunk: IVec2 },
    GoalBlocked,
    /// Open set ran dry; the goal is unreachable inside the chunk.
    Exhausted,
    BudgetExceeded { expansions: usize },
    /// A chunk on the hop route has no door on the side the route leaves by.
    MissingExit { chunk: IVec2, side: Direction },
    TooManyHops { hops: usize },
}

impl fmt::Display for PathFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathFailure::StartOutsideWorld => write!(f, "start tile is outside any chunk"),
            PathFailure::GoalOutsideWorld => write!(f, "goal tile is outside any chunk"),
            PathFailure::ChunkMissing { chunk } => write!(f, "chunk {} on the route does not exist", chunk),
            PathFailure::GoalBlocked => write!(f, "goal tile is blocking"),
            PathFailure::Exhausted => write!(f, "goal unreachable, open set exhausted"),
            PathFailure::BudgetExceeded { expansions } => {
                write!(f, "search budget exceeded after {} expansions", expansions)
            }
            PathFailure::MissingExit { chunk, side } => {
                write!(f, "chunk {} has no exit towards {:?}", chunk, side)
            }
            PathFailure::TooManyHops { hops } => write!(f, "goal is {} chunks away", hops),
        }
    }
}

/// Ask for a path for `entity`. Resolved later by `process_path_requests`.
#[derive(Message, Debug, Clone)]
pub struct PathRequest {
    pub entity: Entity,
    pub start: IVec2,
    pub goal: IVec2,
    /// Per-entity, strictly increasing.
    pub sequence: u64,
}

#[derive(Message, Debug, Clone)]
pub struct PathResolved {
    pub entity: Entity,
    pub sequence: u64,
    pub result: Result<Path, PathFailure>,
}

/// Open set entry. Ordered so `BinaryHeap` pops the lowest `f` first.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(super) struct State {
    pub f: u32,
    pub g: u32,
    pub node: u32,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f)
            .then_with(|| self.g.cmp(&other.g))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
