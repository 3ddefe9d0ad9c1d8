use bevy::math::IVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::tile::Tile;

/// Produces the initial layout of a freshly created chunk.
///
/// Implementations run on the async compute pool, so they only get the chunk
/// coordinate and side length and must not touch the map.
pub trait TerrainGenerator: Send + Sync {
    /// Row-major tiles, exactly `size * size` long.
    fn generate(&self, chunk: IVec2, size: usize) -> Vec<Tile>;
}

/// Walls around the chunk border and floor everywhere else.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerimeterGenerator;

impl TerrainGenerator for PerimeterGenerator {
    fn generate(&self, _chunk: IVec2, size: usize) -> Vec<Tile> {
        let mut tiles = vec![Tile::Floor; size * size];
        stamp_perimeter(&mut tiles, size, Room { x: 0, y: 0, w: size, h: size });
        tiles
    }
}

/// Recursive binary space partitioning into walled rooms joined by doors.
#[derive(Clone, Debug)]
pub struct BspGenerator {
    pub seed: u64,
    pub depth: u32,
    /// Smallest side a room may have, walls included.
    pub min_room_size: usize,
    /// Range the split fraction is drawn from.
    pub split_range: (f32, f32),
}

impl Default for BspGenerator {
    fn default() -> Self {
        Self {
            seed: 0,
            depth: 4,
            min_room_size: 4,
            split_range: (0.2, 0.6),
        }
    }
}

/// Inclusive rectangle of local tiles. Neighbouring rooms share their wall line.
#[derive(Clone, Copy, Debug)]
struct Room {
    x: usize,
    y: usize,
    w: usize,
    h: usize,
}

#[derive(Clone, Copy, Debug)]
enum SplitLine {
    /// Wall column at `x`, passable across x.
    Vertical { x: usize },
    /// Wall row at `y`, passable across y.
    Horizontal { y: usize },
}

#[derive(Clone, Copy, Debug)]
struct DoorCandidate {
    line: SplitLine,
    /// Position along the line.
    at: usize,
    /// Range along the line the door may slide within.
    span: (usize, usize),
}

impl BspGenerator {
    fn rng_for(&self, chunk: IVec2) -> StdRng {
        let mixed = self.seed
            ^ (chunk.x as i64 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (chunk.y as i64 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
        StdRng::seed_from_u64(mixed)
    }

    fn split(
        &self,
        rng: &mut StdRng,
        tiles: &mut [Tile],
        size: usize,
        room: Room,
        depth: u32,
        doors: &mut Vec<DoorCandidate>,
    ) {
        let min_side = self.min_room_size.max(3);
        if depth == 0 || room.w < min_side || room.h < min_side {
            stamp_perimeter(tiles, size, room);
            return;
        }

        let vertical = rng.random_bool(room.w as f64 / (room.w + room.h) as f64);
        let (lo, hi) = self.split_range;
        let fraction = rng.random_range(lo..=hi);

        let (first, second, door) = if vertical {
            let offset = (room.w as f32 * fraction).round() as usize;
            let first = Room { w: offset + 1, ..room };
            let second = Room { x: room.x + offset, w: room.w.saturating_sub(offset), ..room };
            let span = (room.y + 1, room.y + room.h - 2);
            let door = DoorCandidate {
                line: SplitLine::Vertical { x: room.x + offset },
                at: rng.random_range(span.0..=span.1),
                span,
            };
            (first, second, door)
        } else {
            let offset = (room.h as f32 * fraction).round() as usize;
            let first = Room { h: offset + 1, ..room };
            let second = Room { y: room.y + offset, h: room.h.saturating_sub(offset), ..room };
            let span = (room.x + 1, room.x + room.w - 2);
            let door = DoorCandidate {
                line: SplitLine::Horizontal { y: room.y + offset },
                at: rng.random_range(span.0..=span.1),
                span,
            };
            (first, second, door)
        };

        let too_small = |r: &Room| r.w < min_side || r.h < min_side;
        if too_small(&first) || too_small(&second) {
            stamp_perimeter(tiles, size, room);
            return;
        }

        self.split(rng, tiles, size, first, depth - 1, doors);
        self.split(rng, tiles, size, second, depth - 1, doors);
        doors.push(door);
    }
}

impl TerrainGenerator for BspGenerator {
    fn generate(&self, chunk: IVec2, size: usize) -> Vec<Tile> {
        let mut tiles = vec![Tile::Floor; size * size];
        if size < self.min_room_size.max(3) {
            stamp_perimeter(&mut tiles, size, Room { x: 0, y: 0, w: size, h: size });
            return tiles;
        }

        let mut rng = self.rng_for(chunk);
        let mut doors = Vec::new();
        self.split(&mut rng, &mut tiles, size, Room { x: 0, y: 0, w: size, h: size }, self.depth, &mut doors);

        for door in &doors {
            carve_door(&mut tiles, size, door);
        }
        tiles
    }
}

fn stamp_perimeter(tiles: &mut [Tile], size: usize, room: Room) {
    if room.w == 0 || room.h == 0 {
        return;
    }
    let (x1, y1) = (room.x + room.w - 1, room.y + room.h - 1);
    for x in room.x..=x1 {
        tiles[room.y * size + x] = Tile::Wall;
        tiles[y1 * size + x] = Tile::Wall;
    }
    for y in room.y..=y1 {
        tiles[y * size + room.x] = Tile::Wall;
        tiles[y * size + x1] = Tile::Wall;
    }
}

/// Carve the door at the candidate, sliding outward along the split line
/// until both sides of the opening are open.
fn carve_door(tiles: &mut [Tile], size: usize, door: &DoorCandidate) {
    let cell = |along: usize| -> (usize, [usize; 2]) {
        match door.line {
            SplitLine::Vertical { x } => (along * size + x, [along * size + x - 1, along * size + x + 1]),
            SplitLine::Horizontal { y } => (y * size + along, [(y - 1) * size + along, (y + 1) * size + along]),
        }
    };
    let (lo, hi) = door.span;
    let reach = (door.at - lo).max(hi - door.at);
    for step in 0..=reach {
        for along in [door.at.checked_add(step), door.at.checked_sub(step)].into_iter().flatten() {
            if along < lo || along > hi {
                continue;
            }
            let (target, sides) = cell(along);
            if tiles[sides[0]] != Tile::Wall && tiles[sides[1]] != Tile::Wall {
                tiles[target] = Tile::Floor;
                return;
            }
        }
    }

    // Every position along the line meets a cross wall; punch through at the candidate.
    let (target, sides) = cell(door.at);
    tiles[target] = Tile::Floor;
    for side in sides {
        tiles[side] = Tile::Floor;
    }
}
