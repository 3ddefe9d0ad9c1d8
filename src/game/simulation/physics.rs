/// Physics integration and movement systems.
///
/// This module handles:
/// - Short-range separation between living entities
/// - Velocity drag
/// - Substepped, axis-separated movement against `Wall` tiles
/// - Projectiles: raycast against walls, segment tests against bodies

use bevy::prelude::*;
use warren_macros::profile;

use crate::game::config::InitialConfig;
use crate::game::debug::{CollisionHit, DebugCategory, DebugContext};
use crate::game::world::TileMap;
use super::components::*;
use super::components::Drag;
use super::resources::SimTick;

// ============================================================================
// Separation
// ============================================================================

/// Push living entities apart when they are closer than `separation_radius`.
///
/// Every close pair contributes a fixed-size push along the line between the
/// two centres; the magnitude does not depend on the distance.
#[profile(2)]
pub fn separate_entities(
    #[allow(unused_variables)] tick: Res<SimTick>,
    config: Res<InitialConfig>,
    mut bodies: Query<(Entity, &SimPosition, &mut SimVelocity, &Behavior, Option<&Health>)>,
) {
    let radius_sq = config.separation_radius * config.separation_radius;
    let living: Vec<(Entity, Vec2)> = bodies
        .iter()
        .filter(|(.., health)| !health.is_some_and(Health::is_dead))
        .map(|(entity, pos, ..)| (entity, pos.0))
        .collect();

    let mut pushes = 0usize;
    for (entity, pos, mut vel, behavior, health) in bodies.iter_mut() {
        if behavior.is_static() || health.is_some_and(Health::is_dead) {
            continue;
        }
        for &(other, other_pos) in &living {
            if other == entity {
                continue;
            }
            let away = pos.0 - other_pos;
            if away.length_squared() < radius_sq {
                vel.0 += away.normalize_or_zero() * config.separation_strength;
                pushes += 1;
            }
        }
    }

    crate::profile_log!(tick, "[SEPARATION] {} bodies, {} pushes", living.len(), pushes);
}

// ============================================================================
// Physics Integration
// ============================================================================

/// Apply drag, then move each body in `physics_substeps` slices, resolving
/// the x and y axes separately so a body slides along walls.
///
/// A blocked axis is reverted for that substep and its velocity zeroed.
#[profile(2)]
pub fn integrate_motion(
    #[allow(unused_variables)] tick: Res<SimTick>,
    config: Res<InitialConfig>,
    time: Res<Time<Fixed>>,
    map: Res<TileMap>,
    mut debug: ResMut<DebugContext>,
    mut bodies: Query<(Entity, &mut SimPosition, &mut SimVelocity, &Collider, &Behavior, Option<&Drag>)>,
) {
    let dt = time.timestep().as_secs_f32();
    let substeps = config.physics_substeps.max(1);
    let record = debug.is_enabled(DebugCategory::Collision);
    if record {
        debug.collisions.clear();
    }

    for (entity, mut pos, mut vel, collider, behavior, drag) in bodies.iter_mut() {
        if behavior.is_static() {
            continue;
        }
        if let Some(drag) = drag {
            vel.0 *= drag.0;
        }

        for _ in 0..substeps {
            if vel.0 == Vec2::ZERO {
                break;
            }
            let mut next = pos.0 + vel.0 * dt / substeps as f32;

            if let Some(tile) = map.tile_collides(collider.rect_at(Vec2::new(next.x, pos.0.y))) {
                next.x = pos.0.x;
                vel.0.x = 0.0;
                if record {
                    debug.collisions.push(CollisionHit { entity, tile });
                }
            }
            if let Some(tile) = map.tile_collides(collider.rect_at(next)) {
                next.y = pos.0.y;
                vel.0.y = 0.0;
                if record {
                    debug.collisions.push(CollisionHit { entity, tile });
                }
            }
            pos.0 = next;
        }
    }

    crate::profile_log!(tick, "[INTEGRATE] {} collisions recorded", debug.collisions.len());
}

// ============================================================================
// Projectiles
// ============================================================================

/// Move every projectile along the segment it covers this tick.
///
/// The first blocking tile on the segment (from `TileMap::raycast`) either
/// stops the projectile there or, with restitution, sends it back along its
/// path. Every living body whose collider the travelled segment crosses takes
/// the damage and a knockback; the projectile is spent on the first such hit.
#[profile(2)]
pub fn move_projectiles(
    #[allow(unused_variables)] tick: Res<SimTick>,
    mut commands: Commands,
    config: Res<InitialConfig>,
    time: Res<Time<Fixed>>,
    map: Res<TileMap>,
    mut projectiles: Query<(Entity, &mut Projectile, &mut SimPosition, &mut SimVelocity)>,
    mut bodies: Query<(&SimPosition, &Collider, &mut Health, &mut SimVelocity), Without<Projectile>>,
) {
    let dt = time.timestep().as_secs_f32();
    let mut expired = 0;

    for (entity, mut projectile, mut pos, mut vel) in projectiles.iter_mut() {
        projectile.life -= dt;
        let from = pos.0;
        let mut to = from + vel.0 * dt;
        let travel = vel.0;
        vel.0 *= projectile.drag;

        let mut spent = projectile.life <= 0.0;
        if let Some(&wall) = map.raycast(from, to, 1, config.raycast_epsilon).first() {
            to = wall;
            if projectile.restitution > 0.0 {
                // Back off the boundary so the next ray starts on open floor.
                to -= travel.normalize_or_zero() * config.raycast_epsilon;
                vel.0 = -vel.0 * projectile.restitution;
            } else {
                spent = true;
            }
        }

        for (body, collider, mut health, mut body_vel) in bodies.iter_mut() {
            if health.is_dead() || !segment_hits_rect(from, to, collider.rect_at(body.0)) {
                continue;
            }
            health.damage(projectile.damage);
            body_vel.0 += travel * config.projectile_knockback;
            spent = true;
        }

        pos.0 = to;
        if spent {
            commands.entity(entity).despawn();
            expired += 1;
        }
    }

    crate::profile_log!(tick, "[PROJECTILES] {} spent", expired);
}

/// Slab test of the segment `a -> b` against `rect`, edges included.
fn segment_hits_rect(a: Vec2, b: Vec2, rect: Rect) -> bool {
    let d = b - a;
    let (mut t_min, mut t_max) = (0.0f32, 1.0f32);
    for (origin, delta, lo, hi) in [(a.x, d.x, rect.min.x, rect.max.x), (a.y, d.y, rect.min.y, rect.max.y)] {
        if delta == 0.0 {
            if origin < lo || origin > hi {
                return false;
            }
            continue;
        }
        let (near, far) = {
            let (t0, t1) = ((lo - origin) / delta, (hi - origin) / delta);
            if t0 <= t1 { (t0, t1) } else { (t1, t0) }
        };
        t_min = t_min.max(near);
        t_max = t_max.min(far);
        if t_min > t_max {
            return false;
        }
    }
    true
}
