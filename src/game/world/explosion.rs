use bevy::prelude::*;

use super::tile_map::TileMap;

impl TileMap {
    /// Turn every damageable tile whose center lies within `radius` of `center`
    /// into its damaged variant. Returns the number of tiles changed.
    ///
    /// Damaged walls stop blocking, so this is the only way terrain opens up
    /// after generation.
    pub fn damage_area(&mut self, center: Vec2, radius: f32) -> usize {
        if radius <= 0.0 {
            return 0;
        }
        let settings = *self.settings();
        let min = settings.world_to_tile(center - Vec2::splat(radius));
        let max = settings.world_to_tile(center + Vec2::splat(radius));
        let radius_sq = radius * radius;

        let mut changed = 0;
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                let tile = IVec2::new(x, y);
                if settings.tile_center(tile).distance_squared(center) > radius_sq {
                    continue;
                }
                if let Some(damaged) = self.get_tile(tile).damaged() {
                    if self.set_tile(tile, damaged) {
                        changed += 1;
                    }
                }
            }
        }
        changed
    }
}
