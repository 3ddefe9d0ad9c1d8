use bevy::prelude::*;

use super::tile::Tile;
use super::tile_map::TileMap;

/// Continuous-space queries resolved against the tile grid.
impl TileMap {
    /// First `Wall` tile overlapped by `rect` (world units), scanned row by row.
    ///
    /// The covered tile range is derived from the rectangle corners with
    /// `floor`, so an edge lying exactly on a tile boundary touches that tile.
    pub fn tile_collides(&self, rect: Rect) -> Option<IVec2> {
        let min = self.settings().world_to_tile(rect.min);
        let max = self.settings().world_to_tile(rect.max);
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                let tile = IVec2::new(x, y);
                if self.is_tile(tile, Tile::Wall) {
                    return Some(tile);
                }
            }
        }
        None
    }

    /// Walk the grid cells crossed by the segment `start -> end` and return the
    /// sample points that touch a blocking tile, at most `max_hits` of them.
    ///
    /// Samples are taken at the start and at every cell boundary crossing. Each
    /// sample checks the cell being entered plus the points `epsilon` ahead
    /// along each moving axis, so a wall grazed at a corner is still reported.
    pub fn raycast(&self, start: Vec2, end: Vec2, max_hits: usize, epsilon: f32) -> Vec<Vec2> {
        let delta = end - start;
        let length = delta.length();
        if length <= 0.0 || max_hits == 0 || !length.is_finite() {
            return Vec::new();
        }
        let dir = delta / length;
        let tile_size = self.settings().tile_size;

        let mut cell = self.settings().world_to_tile(start);
        let step = IVec2::new(axis_step(dir.x), axis_step(dir.y));
        let mut t_next = Vec2::new(
            first_crossing(start.x, dir.x, cell.x, tile_size),
            first_crossing(start.y, dir.y, cell.y, tile_size),
        );
        let t_delta = Vec2::new(crossing_interval(dir.x, tile_size), crossing_interval(dir.y, tile_size));
        let probe_x = Vec2::new(step.x as f32 * epsilon, 0.0);
        let probe_y = Vec2::new(0.0, step.y as f32 * epsilon);

        let blocked = |pos: Vec2| self.get_tile(self.settings().world_to_tile(pos)).is_blocking();

        let mut hits = Vec::new();
        let mut t = 0.0;
        while hits.len() < max_hits && t < length {
            let point = start + dir * t;
            let hit = self.get_tile(cell).is_blocking()
                || (step.x != 0 && blocked(point + probe_x))
                || (step.y != 0 && blocked(point + probe_y));
            if hit {
                hits.push(point);
            }

            // A corner crossing moves both axes at once so its point is sampled once.
            let next = t_next.x.min(t_next.y);
            if t_next.x <= next {
                cell.x += step.x;
                t_next.x += t_delta.x;
            }
            if t_next.y <= next {
                cell.y += step.y;
                t_next.y += t_delta.y;
            }
            t = next;
        }
        hits
    }
}

#[inline]
fn axis_step(d: f32) -> i32 {
    if d > 0.0 {
        1
    } else if d < 0.0 {
        -1
    } else {
        0
    }
}

/// Ray parameter of the first boundary crossing on one axis.
#[inline]
fn first_crossing(origin: f32, d: f32, cell: i32, tile_size: f32) -> f32 {
    if d > 0.0 {
        ((cell + 1) as f32 * tile_size - origin) / d
    } else if d < 0.0 {
        (cell as f32 * tile_size - origin) / d
    } else {
        f32::INFINITY
    }
}

#[inline]
fn crossing_interval(d: f32, tile_size: f32) -> f32 {
    if d == 0.0 {
        f32::INFINITY
    } else {
        tile_size / d.abs()
    }
}
