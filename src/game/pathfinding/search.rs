use bevy::prelude::*;

use crate::game::world::{DetailedTile, Direction, TileMap};
use super::astar::find_path_in_chunk;
use super::debug::SearchTrace;
use super::types::{Path, PathFailure, PathLimits};

/// Path between two tiles, or `None` when there is none within the limits.
///
/// Failures are logged; use [`find_path_detailed`] to get the reason.
pub fn find_path(
    map: &TileMap,
    start: &DetailedTile,
    goal: &DetailedTile,
    limits: &PathLimits,
    trace: Option<&mut SearchTrace>,
) -> Option<Path> {
    match find_path_detailed(map, start, goal, limits, trace) {
        Ok(path) => Some(path),
        Err(PathFailure::BudgetExceeded { .. }) => None,
        Err(failure) => {
            warn!("[PATHFINDING] No path from {} to {}: {}", start.world, goal.world, failure);
            None
        }
    }
}

pub fn find_path_detailed(
    map: &TileMap,
    start: &DetailedTile,
    goal: &DetailedTile,
    limits: &PathLimits,
    mut trace: Option<&mut SearchTrace>,
) -> Result<Path, PathFailure> {
    if let Some(trace) = trace.as_deref_mut() {
        trace.reset(start.world, goal.world);
    }

    let result = search(map, start, goal, limits, trace.as_deref_mut());

    if let Some(trace) = trace {
        trace.outcome = Some(result.as_ref().map(Path::len).map_err(|e| *e));
    }
    result
}

fn search(
    map: &TileMap,
    start: &DetailedTile,
    goal: &DetailedTile,
    limits: &PathLimits,
    mut trace: Option<&mut SearchTrace>,
) -> Result<Path, PathFailure> {
    if goal.tile.is_blocking() {
        return Err(PathFailure::GoalBlocked);
    }
    let start_chunk = start.chunk.ok_or(PathFailure::StartOutsideWorld)?;
    let goal_chunk = goal.chunk.ok_or(PathFailure::GoalOutsideWorld)?;
    let settings = map.settings();
    let budget = limits.max_expansions(settings.chunk_area());

    if start_chunk == goal_chunk {
        let chunk = map.chunk(start_chunk).ok_or(PathFailure::StartOutsideWorld)?;
        return find_path_in_chunk(
            chunk,
            settings.chunk_origin(start_chunk),
            start.local.as_ivec2(),
            goal.local.as_ivec2(),
            budget,
            trace,
        );
    }

    let hops = chunk_route(start_chunk, goal_chunk, limits.max_chunk_hops)?;

    // Walk the route start -> goal, pathing through each chunk from where we
    // entered it to the door we leave by.
    let mut forward: Vec<IVec2> = Vec::new();
    let mut coord = start_chunk;
    let mut entry = start.world;
    for k in 0..=hops.len() {
        let chunk = map.chunk(coord).ok_or(PathFailure::ChunkMissing { chunk: coord })?;
        let origin = settings.chunk_origin(coord);

        let (target, arrival) = match hops.get(k) {
            Some(&side) => {
                let exit = chunk.exit(side).ok_or(PathFailure::MissingExit { chunk: coord, side })?;
                let next = coord + side.offset();
                let arrival = map
                    .chunk(next)
                    .ok_or(PathFailure::ChunkMissing { chunk: next })?
                    .exit(side.opposite())
                    .ok_or(PathFailure::MissingExit { chunk: next, side: side.opposite() })?;
                (exit, Some((next, arrival)))
            }
            None => (goal.world, None),
        };

        let segment = find_path_in_chunk(chunk, origin, entry - origin, target - origin, budget, trace.as_deref_mut())?;
        forward.extend(segment.tiles().iter().rev());

        if let Some((next, arrival)) = arrival {
            coord = next;
            entry = arrival;
        }
    }

    forward.reverse();
    Ok(Path::new(forward))
}

/// Chunk hops from `from` to `to`, alternating x and y steps while both
/// axes still differ.
pub(super) fn chunk_route(from: IVec2, to: IVec2, max_hops: usize) -> Result<Vec<Direction>, PathFailure> {
    let delta = to - from;
    let hops = (delta.x.unsigned_abs() + delta.y.unsigned_abs()) as usize;
    if hops > max_hops {
        return Err(PathFailure::TooManyHops { hops });
    }

    let horizontal = if delta.x > 0 { Direction::East } else { Direction::West };
    let vertical = if delta.y > 0 { Direction::North } else { Direction::South };
    let (mut remaining_x, mut remaining_y) = (delta.x.unsigned_abs(), delta.y.unsigned_abs());

    let mut route = Vec::with_capacity(hops);
    let mut x_turn = true;
    while remaining_x + remaining_y > 0 {
        if (x_turn && remaining_x > 0) || remaining_y == 0 {
            route.push(horizontal);
            remaining_x -= 1;
        } else {
            route.push(vertical);
            remaining_y -= 1;
        }
        x_turn = !x_turn;
    }
    Ok(route)
}
