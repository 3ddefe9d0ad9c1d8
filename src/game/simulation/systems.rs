use bevy::prelude::*;

use crate::game::world::TileMap;
use super::components::*;
use super::events::{EntityKilled, Explosion};
use super::resources::SimTick;

// ============================================================================
// Tick Management
// ============================================================================

pub fn increment_sim_tick(mut tick: ResMut<SimTick>) {
    tick.increment();
}

// ============================================================================
// Explosions
// ============================================================================

/// Damage terrain inside each blast and every entity with health in range.
pub fn apply_explosions(
    mut explosions: MessageReader<Explosion>,
    mut map: ResMut<TileMap>,
    mut targets: Query<(Entity, &SimPosition, &mut Health)>,
) {
    for explosion in explosions.read() {
        let damaged_tiles = map.damage_area(explosion.center, explosion.radius);

        let radius_sq = explosion.radius * explosion.radius;
        let mut hit = 0;
        for (entity, pos, mut health) in targets.iter_mut() {
            if pos.0.distance_squared(explosion.center) > radius_sq {
                continue;
            }
            hit += 1;
            if health.damage(explosion.damage) {
                debug!("[EXPLOSION] {:?} killed at {}", entity, pos.0);
            }
        }

        info!(
            "[EXPLOSION] at {} r={}: {} tiles damaged, {} entities hit",
            explosion.center, explosion.radius, damaged_tiles, hit
        );
    }
}

// ============================================================================
// Death
// ============================================================================

/// Announce entities whose health ran out and despawn all but the player,
/// whose death ends the session instead.
pub fn reap_dead(
    mut commands: Commands,
    bodies: Query<(Entity, &Health, &Behavior, &SimPosition)>,
    mut killed: MessageWriter<EntityKilled>,
    mut player_reported: Local<bool>,
) {
    for (entity, health, behavior, pos) in bodies.iter() {
        if !health.is_dead() {
            continue;
        }
        match behavior {
            Behavior::Player => {
                if !*player_reported {
                    warn!("[SIM] Player died at {}", pos.0);
                    killed.write(EntityKilled { entity, behavior: *behavior, position: pos.0 });
                    *player_reported = true;
                }
            }
            _ => {
                killed.write(EntityKilled { entity, behavior: *behavior, position: pos.0 });
                commands.entity(entity).despawn();
            }
        }
    }
}
