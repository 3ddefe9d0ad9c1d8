//! Tests for the chunk-local A* and the chunk-hopping search built on it.

use std::collections::VecDeque;
use std::sync::Arc;

use bevy::prelude::*;

use super::*;
use super::astar::find_path_in_chunk;
use super::search::chunk_route;
use crate::game::world::{BspGenerator, Direction, GridSettings, PerimeterGenerator, TerrainGenerator, Tile, TileMap};

struct OpenGenerator;

impl TerrainGenerator for OpenGenerator {
    fn generate(&self, _chunk: IVec2, size: usize) -> Vec<Tile> {
        vec![Tile::Floor; size * size]
    }
}

struct SolidGenerator;

impl TerrainGenerator for SolidGenerator {
    fn generate(&self, _chunk: IVec2, size: usize) -> Vec<Tile> {
        vec![Tile::Wall; size * size]
    }
}

fn map_with(generator: impl TerrainGenerator + 'static) -> TileMap {
    TileMap::new(GridSettings::default(), Arc::new(generator))
}

fn open_chunk() -> TileMap {
    let mut map = map_with(OpenGenerator);
    map.ensure_chunk_ready(IVec2::ZERO);
    map
}

fn path_between(map: &TileMap, start: IVec2, goal: IVec2) -> Result<Path, PathFailure> {
    find_path_detailed(map, &map.probe_tile(start), &map.probe_tile(goal), &PathLimits::default(), None)
}

fn is_wall(map: &TileMap, tile: IVec2) -> bool {
    map.get_tile(tile).is_blocking()
}

/// Goal first, start last, every step a legal 8-neighbour move.
fn assert_valid_path(map: &TileMap, path: &Path, start: IVec2, goal: IVec2) {
    assert_eq!(path.goal(), Some(goal), "path must begin at the goal");
    assert_eq!(path.start(), Some(start), "path must end at the start");
    for tile in path.tiles() {
        assert!(!is_wall(map, *tile), "path crosses wall at {}", tile);
    }
    for pair in path.tiles().windows(2) {
        let d = (pair[0] - pair[1]).abs();
        assert!(d.x <= 1 && d.y <= 1 && d != IVec2::ZERO, "{} -> {} is not a neighbour step", pair[1], pair[0]);
        if d.x == 1 && d.y == 1 {
            let cut = is_wall(map, IVec2::new(pair[0].x, pair[1].y)) && is_wall(map, IVec2::new(pair[1].x, pair[0].y));
            assert!(!cut, "{} -> {} cuts a corner", pair[1], pair[0]);
        }
    }
}

/// Reachability with the same move rules, by breadth-first search.
fn reachable(map: &TileMap, start: IVec2, goal: IVec2, size: i32) -> bool {
    if is_wall(map, goal) {
        return false;
    }
    let inside = |t: IVec2| t.x >= 0 && t.y >= 0 && t.x < size && t.y < size;
    let mut seen = vec![start];
    let mut queue = VecDeque::from([start]);
    while let Some(at) = queue.pop_front() {
        if at == goal {
            return true;
        }
        for dy in -1..=1 {
            for dx in -1..=1 {
                let next = at + IVec2::new(dx, dy);
                if (dx == 0 && dy == 0) || !inside(next) || is_wall(map, next) || seen.contains(&next) {
                    continue;
                }
                if dx != 0 && dy != 0
                    && is_wall(map, IVec2::new(next.x, at.y))
                    && is_wall(map, IVec2::new(at.x, next.y))
                {
                    continue;
                }
                seen.push(next);
                queue.push_back(next);
            }
        }
    }
    false
}

// ============================================================================
// Same-chunk search
// ============================================================================

#[test]
fn test_path_to_self_is_a_single_tile() {
    let map = open_chunk();
    let path = path_between(&map, IVec2::new(4, 4), IVec2::new(4, 4)).expect("trivial path");
    assert_eq!(path.len(), 1);
    assert_eq!(path.steps(), 0);
}

#[test]
fn test_open_room_path_is_valid() {
    let map = open_chunk();
    let start = IVec2::new(1, 2);
    let goal = IVec2::new(15, 9);
    let path = path_between(&map, start, goal).expect("open room");
    assert_valid_path(&map, &path, start, goal);
    assert_eq!(path.steps(), 14, "diagonal moves cover the shorter axis for free");
}

#[test]
fn test_randomized_reachability_soundness() {
    let mut rng = fastrand::Rng::with_seed(0xA57A);
    let limits = PathLimits { expansion_multiplier: 64, ..default() };

    for round in 0..60 {
        let mut map = open_chunk();
        for y in 0..20 {
            for x in 0..20 {
                if rng.f32() < 0.3 {
                    map.set_tile(IVec2::new(x, y), Tile::Wall);
                }
            }
        }
        let start = IVec2::new(rng.i32(0..20), rng.i32(0..20));
        let goal = IVec2::new(rng.i32(0..20), rng.i32(0..20));
        map.set_tile(start, Tile::Floor);

        let result = find_path_detailed(&map, &map.probe_tile(start), &map.probe_tile(goal), &limits, None);
        if reachable(&map, start, goal, 20) {
            let path = result.unwrap_or_else(|e| panic!("round {}: {} -> {} reachable but got {}", round, start, goal, e));
            assert_valid_path(&map, &path, start, goal);
        } else {
            assert!(result.is_err(), "round {}: {} -> {} unreachable but a path came back", round, start, goal);
        }
    }
}

#[test]
fn test_wall_goal_fails_without_searching() {
    let mut map = open_chunk();
    map.set_tile(IVec2::new(10, 10), Tile::Wall);

    let mut trace = SearchTrace::default();
    let result = find_path_detailed(
        &map,
        &map.probe_tile(IVec2::new(2, 2)),
        &map.probe_tile(IVec2::new(10, 10)),
        &PathLimits::default(),
        Some(&mut trace),
    );
    assert_eq!(result, Err(PathFailure::GoalBlocked));
    assert_eq!(trace.expansions(), 0);
    assert_eq!(trace.outcome, Some(Err(PathFailure::GoalBlocked)));

    let path = find_path(&map, &map.probe_tile(IVec2::new(2, 2)), &map.probe_tile(IVec2::new(10, 10)), &PathLimits::default(), None);
    assert!(path.is_none());
}

#[test]
fn test_diagonal_between_two_walls_is_rejected() {
    let mut map = open_chunk();
    map.set_tile(IVec2::new(5, 6), Tile::Wall);
    map.set_tile(IVec2::new(6, 5), Tile::Wall);

    let path = path_between(&map, IVec2::new(5, 5), IVec2::new(6, 6)).expect("route around");
    assert_valid_path(&map, &path, IVec2::new(5, 5), IVec2::new(6, 6));
    assert!(path.steps() > 1, "must not squeeze through the corner");
}

#[test]
fn test_diagonal_past_a_single_wall_is_allowed() {
    let mut map = open_chunk();
    map.set_tile(IVec2::new(5, 6), Tile::Wall);

    let path = path_between(&map, IVec2::new(5, 5), IVec2::new(6, 6)).expect("diagonal");
    assert_eq!(path.tiles(), &[IVec2::new(6, 6), IVec2::new(5, 5)]);
}

#[test]
fn test_enclosed_goal_exhausts_open_set() {
    let mut map = open_chunk();
    let goal = IVec2::new(10, 10);
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx != 0 || dy != 0 {
                map.set_tile(goal + IVec2::new(dx, dy), Tile::Wall);
            }
        }
    }
    assert_eq!(path_between(&map, IVec2::new(1, 1), goal), Err(PathFailure::Exhausted));
}

/// Serpentine corridor filling the chunk: rows of wall with a gap at
/// alternating ends.
fn serpentine() -> TileMap {
    let mut map = open_chunk();
    for y in (1..20).step_by(2) {
        let gap = if (y / 2) % 2 == 0 { 19 } else { 0 };
        for x in 0..20 {
            if x != gap {
                map.set_tile(IVec2::new(x, y), Tile::Wall);
            }
        }
    }
    map
}

#[test]
fn test_search_bound_terminates_with_budget_failure() {
    let map = serpentine();
    let chunk = map.chunk(IVec2::ZERO).expect("chunk exists");
    let start = IVec2::new(0, 0);
    let goal = IVec2::new(0, 18);

    let full = find_path_in_chunk(chunk, IVec2::ZERO, start, goal, 1600, None).expect("serpentine is connected");
    assert!(full.steps() > 100);

    let capped = find_path_in_chunk(chunk, IVec2::ZERO, start, goal, 50, None);
    assert_eq!(capped, Err(PathFailure::BudgetExceeded { expansions: 50 }));
}

#[test]
fn test_straight_corridor_stays_in_corridor() {
    let mut map = map_with(SolidGenerator);
    map.ensure_chunk_ready(IVec2::ZERO);
    for x in 0..20 {
        map.set_tile(IVec2::new(x, 5), Tile::Floor);
    }

    let mut trace = SearchTrace::default();
    let path = find_path_detailed(
        &map,
        &map.probe_tile(IVec2::new(0, 5)),
        &map.probe_tile(IVec2::new(19, 5)),
        &PathLimits::default(),
        Some(&mut trace),
    )
    .expect("corridor path");

    assert_eq!(path.steps(), 19);
    assert!(trace.expansion_order.iter().all(|t| t.y == 5), "expanded outside the corridor");
    assert_eq!(trace.expansions(), 20);
}

#[test]
fn test_trace_matches_returned_path() {
    let mut map = open_chunk();
    for y in 2..15 {
        map.set_tile(IVec2::new(8, y), Tile::Wall);
    }
    let start = IVec2::new(3, 8);
    let goal = IVec2::new(14, 8);

    let mut trace = SearchTrace::default();
    let path = find_path_detailed(&map, &map.probe_tile(start), &map.probe_tile(goal), &PathLimits::default(), Some(&mut trace))
        .expect("path around the wall");

    assert_eq!(trace.start, Some(start));
    assert_eq!(trace.goal, Some(goal));
    assert_eq!(trace.outcome, Some(Ok(path.len())));
    assert_eq!(trace.g_score.get(&start), Some(&0));
    for pair in path.tiles().windows(2) {
        assert_eq!(trace.came_from.get(&pair[0]), Some(&pair[1]));
    }
    assert_eq!(trace.expansion_order.last(), Some(&goal));

    let untraced = path_between(&map, start, goal).expect("same search without a trace");
    assert_eq!(untraced, path, "tracing must not change the result");
}

// ============================================================================
// Cross-chunk search
// ============================================================================

#[test]
fn test_chunk_route_alternates_axes() {
    use Direction::*;
    assert_eq!(chunk_route(IVec2::ZERO, IVec2::new(2, 3), 16), Ok(vec![East, North, East, North, North]));
    assert_eq!(chunk_route(IVec2::ZERO, IVec2::new(-3, 0), 16), Ok(vec![West, West, West]));
    assert_eq!(chunk_route(IVec2::new(1, 1), IVec2::new(1, -1), 16), Ok(vec![South, South]));
    assert_eq!(chunk_route(IVec2::ZERO, IVec2::new(5, 5), 4), Err(PathFailure::TooManyHops { hops: 10 }));
}

fn first_floor(map: &TileMap, chunk: IVec2) -> IVec2 {
    let size = map.settings().chunk_size as i32;
    let origin = map.settings().chunk_origin(chunk);
    (1..size - 1)
        .flat_map(|y| (1..size - 1).map(move |x| IVec2::new(x, y)))
        .map(|local| origin + local)
        .find(|tile| map.get_tile(*tile) == Tile::Floor)
        .expect("chunk has a floor tile")
}

#[test]
fn test_neighbouring_chunks_path_through_the_door() {
    let mut map = map_with(BspGenerator { seed: 3, ..default() });
    map.ensure_chunk_ready(IVec2::ZERO);
    map.ensure_chunk_ready(IVec2::new(1, 0));

    let start = first_floor(&map, IVec2::ZERO);
    let goal = first_floor(&map, IVec2::new(1, 0));
    let path = path_between(&map, start, goal).expect("glued chunks connect");
    assert_valid_path(&map, &path, start, goal);

    let exit = map.chunk(IVec2::ZERO).and_then(|c| c.exit(Direction::East)).expect("east exit");
    assert!(path.tiles().contains(&exit));
    assert!(path.tiles().contains(&(exit + IVec2::X)));
}

#[test]
fn test_path_through_intermediate_chunks_is_connected() {
    let mut map = map_with(BspGenerator { seed: 11, ..default() });
    for cy in 0..=1 {
        for cx in 0..=2 {
            map.ensure_chunk_ready(IVec2::new(cx, cy));
        }
    }

    let start = first_floor(&map, IVec2::ZERO);
    let goal = first_floor(&map, IVec2::new(2, 1));
    let path = path_between(&map, start, goal).expect("four chunk route");
    assert_valid_path(&map, &path, start, goal);

    let settings = *map.settings();
    let visited: Vec<IVec2> = path.tiles().iter().map(|t| settings.tile_to_chunk(*t)).collect();
    for chunk in [IVec2::new(1, 0), IVec2::new(1, 1)] {
        assert!(visited.contains(&chunk), "route should pass through {}", chunk);
    }
}

#[test]
fn test_missing_neighbour_chunk_fails_cleanly() {
    let mut map = map_with(PerimeterGenerator);
    map.ensure_chunk_ready(IVec2::ZERO);
    map.ensure_chunk_ready(IVec2::new(2, 0));

    let start = IVec2::new(5, 5);
    let goal = IVec2::new(45, 5);
    assert_eq!(path_between(&map, start, goal), Err(PathFailure::MissingExit { chunk: IVec2::ZERO, side: Direction::East }));

    // Created but still generating: no doors yet.
    map.create_chunk_if_absent(IVec2::new(1, 0));
    assert_eq!(path_between(&map, start, goal), Err(PathFailure::MissingExit { chunk: IVec2::ZERO, side: Direction::East }));

    map.generate_pending_blocking();
    let path = path_between(&map, start, goal).expect("all three chunks glued");
    assert_valid_path(&map, &path, start, goal);
}

#[test]
fn test_hop_limit_and_missing_chunks() {
    let mut map = map_with(PerimeterGenerator);
    map.ensure_chunk_ready(IVec2::ZERO);
    map.ensure_chunk_ready(IVec2::new(3, 0));

    let limits = PathLimits { max_chunk_hops: 2, ..default() };
    let result = find_path_detailed(&map, &map.probe_tile(IVec2::new(5, 5)), &map.probe_tile(IVec2::new(65, 5)), &limits, None);
    assert_eq!(result, Err(PathFailure::TooManyHops { hops: 3 }));

    assert_eq!(path_between(&map, IVec2::new(5, 5), IVec2::new(-30, 5)), Err(PathFailure::GoalOutsideWorld));
    assert_eq!(path_between(&map, IVec2::new(-30, 5), IVec2::new(5, 5)), Err(PathFailure::StartOutsideWorld));
}

// ============================================================================
// Types
// ============================================================================

#[test]
fn test_path_indexing_from_start() {
    let path = Path::new(vec![IVec2::new(3, 0), IVec2::new(2, 0), IVec2::new(1, 0)]);
    assert_eq!(path.from_start(0), Some(IVec2::new(1, 0)));
    assert_eq!(path.from_start(2), Some(IVec2::new(3, 0)));
    assert_eq!(path.from_start(3), None);
    assert_eq!(path.steps(), 2);
}

#[test]
fn test_request_queue_keeps_latest_per_entity() {
    let mut world = World::new();
    let entity = world.spawn_empty().id();
    let other = world.spawn_empty().id();
    let request = |entity, sequence| PathRequest { entity, start: IVec2::ZERO, goal: IVec2::splat(sequence as i32), sequence };

    let mut queue = PathRequestQueue::default();
    queue.push(request(entity, 1));
    queue.push(request(other, 1));
    queue.push(request(entity, 3));
    queue.push(request(entity, 2));

    assert_eq!(queue.len(), 2);
    let first = queue.pop().expect("queued");
    assert_eq!((first.entity, first.sequence), (entity, 3));
    assert_eq!(queue.pop().map(|r| r.entity), Some(other));
    assert!(queue.is_empty());
}
