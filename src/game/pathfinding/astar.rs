use std::collections::BinaryHeap;

use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use smallvec::SmallVec;

use crate::game::world::Chunk;
use super::debug::SearchTrace;
use super::types::{Path, PathFailure, State};

const HORIZONTALS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
const DIAGONALS: [(i32, i32); 4] = [(-1, -1), (1, 1), (1, -1), (-1, 1)];

const UNSEEN: u32 = u32::MAX;

#[inline]
pub(super) fn manhattan(a: IVec2, b: IVec2) -> u32 {
    let d = (a - b).abs();
    (d.x + d.y) as u32
}

/// Grid of one chunk as the search sees it: blocking bits plus index math.
struct ChunkGrid {
    size: i32,
    origin: IVec2,
    blocked: FixedBitSet,
}

impl ChunkGrid {
    fn new(chunk: &Chunk, origin: IVec2) -> Self {
        let mut blocked = FixedBitSet::with_capacity(chunk.tiles().len());
        for (i, tile) in chunk.tiles().iter().enumerate() {
            blocked.set(i, tile.is_blocking());
        }
        Self { size: chunk.size() as i32, origin, blocked }
    }

    #[inline]
    fn index(&self, local: IVec2) -> Option<u32> {
        (local.x >= 0 && local.y >= 0 && local.x < self.size && local.y < self.size)
            .then(|| (local.y * self.size + local.x) as u32)
    }

    #[inline]
    fn local(&self, index: u32) -> IVec2 {
        IVec2::new(index as i32 % self.size, index as i32 / self.size)
    }

    #[inline]
    fn world(&self, index: u32) -> IVec2 {
        self.origin + self.local(index)
    }

    #[inline]
    fn is_blocked(&self, local: IVec2) -> bool {
        self.index(local).is_none_or(|i| self.blocked.contains(i as usize))
    }

    /// Cardinals first, then diagonals that do not squeeze between two walls.
    fn neighbours(&self, index: u32) -> SmallVec<[u32; 8]> {
        let at = self.local(index);
        let mut out = SmallVec::new();
        for (dx, dy) in HORIZONTALS {
            let next = at + IVec2::new(dx, dy);
            if !self.is_blocked(next) {
                out.extend(self.index(next));
            }
        }
        for (dx, dy) in DIAGONALS {
            let next = at + IVec2::new(dx, dy);
            if self.is_blocked(next) {
                continue;
            }
            if self.is_blocked(IVec2::new(next.x, at.y)) && self.is_blocked(IVec2::new(at.x, next.y)) {
                continue;
            }
            out.extend(self.index(next));
        }
        out
    }
}

/// A* between two tiles of the same chunk (chunk-local coordinates).
///
/// Every move costs 1 and the heuristic is Manhattan distance, so diagonal
/// moves are favoured but the result is not guaranteed shortest. Improved
/// nodes are pushed again and stale heap entries skipped on pop.
pub(super) fn find_path_in_chunk(
    chunk: &Chunk,
    origin: IVec2,
    start: IVec2,
    goal: IVec2,
    max_expansions: usize,
    mut trace: Option<&mut SearchTrace>,
) -> Result<Path, PathFailure> {
    let grid = ChunkGrid::new(chunk, origin);
    let (Some(start_idx), Some(goal_idx)) = (grid.index(start), grid.index(goal)) else {
        return Err(PathFailure::Exhausted);
    };
    if grid.is_blocked(goal) {
        return Err(PathFailure::GoalBlocked);
    }

    let area = chunk.tiles().len();
    let mut g_score = vec![UNSEEN; area];
    let mut came_from = vec![UNSEEN; area];
    let mut open_set = BinaryHeap::new();

    let h0 = manhattan(start, goal);
    g_score[start_idx as usize] = 0;
    open_set.push(State { f: h0, g: 0, node: start_idx });
    if let Some(trace) = trace.as_deref_mut() {
        trace.record_seed(grid.world(start_idx), h0);
    }

    let mut expansions = 0usize;
    while let Some(State { g, node: current, .. }) = open_set.pop() {
        if g > g_score[current as usize] {
            continue;
        }

        expansions += 1;
        if expansions > max_expansions {
            error!(
                "[PATHFINDING] A* exceeded {} expansions between {} and {} in chunk {}",
                max_expansions,
                origin + start,
                origin + goal,
                chunk.coord
            );
            return Err(PathFailure::BudgetExceeded { expansions: max_expansions });
        }
        if let Some(trace) = trace.as_deref_mut() {
            trace.record_expansion(grid.world(current));
        }

        if current == goal_idx {
            return Ok(reconstruct_path(&grid, &came_from, current));
        }

        for neighbour in grid.neighbours(current) {
            let tentative = g + 1;
            if tentative < g_score[neighbour as usize] {
                let f = tentative + manhattan(grid.local(neighbour), goal);
                g_score[neighbour as usize] = tentative;
                came_from[neighbour as usize] = current;
                open_set.push(State { f, g: tentative, node: neighbour });
                if let Some(trace) = trace.as_deref_mut() {
                    trace.record_relaxation(grid.world(neighbour), grid.world(current), tentative, f);
                }
            }
        }
    }

    Err(PathFailure::Exhausted)
}

fn reconstruct_path(grid: &ChunkGrid, came_from: &[u32], mut current: u32) -> Path {
    let mut tiles = vec![grid.world(current)];
    while came_from[current as usize] != UNSEEN {
        current = came_from[current as usize];
        tiles.push(grid.world(current));
    }
    Path::new(tiles)
}
