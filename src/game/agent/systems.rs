use bevy::prelude::*;
use warren_macros::profile;

use crate::game::config::InitialConfig;
use crate::game::debug::{DebugCategory, DebugContext, SteeringSample};
use crate::game::pathfinding::{PathRequest, PathResolved};
use crate::game::simulation::{Behavior, Health, SimPosition, SimTick, SimVelocity};
use crate::game::world::TileMap;
use super::follower::{PathFollower, Resolution};

fn alive(health: Option<&Health>) -> bool {
    !health.is_some_and(Health::is_dead)
}

/// Issue path requests toward the player for every follower whose gating
/// says so.
#[profile(2)]
pub(super) fn request_paths(
    #[allow(unused_variables)] tick: Res<SimTick>,
    config: Res<InitialConfig>,
    map: Res<TileMap>,
    bodies: Query<(&SimPosition, &Behavior, Option<&Health>)>,
    mut followers: Query<(Entity, &SimPosition, &mut PathFollower, Option<&Health>)>,
    mut requests: MessageWriter<PathRequest>,
) {
    let Some(player) = bodies
        .iter()
        .find(|(_, behavior, health)| **behavior == Behavior::Player && alive(*health))
        .map(|(pos, ..)| pos.0)
    else {
        return;
    };

    let settings = map.settings();
    let tuning = config.follower_tuning();
    let target_tile = settings.world_to_tile(player);
    let mut issued = 0usize;

    for (entity, pos, mut follower, health) in followers.iter_mut() {
        if !alive(health) {
            continue;
        }
        let current_tile = settings.world_to_tile(pos.0);
        if follower.needs_new_path(current_tile, target_tile, &tuning) {
            let sequence = follower.begin_request(target_tile);
            requests.write(PathRequest { entity, start: current_tile, goal: target_tile, sequence });
            issued += 1;
        }
        follower.observe_target(target_tile);
    }

    crate::profile_log!(tick, "[AI] {} path requests issued", issued);
}

/// Hand search results to their followers. A failed search is terminal for
/// the follower when `kill_on_path_failure` is set.
pub(super) fn apply_path_results(
    config: Res<InitialConfig>,
    map: Res<TileMap>,
    mut resolved: MessageReader<PathResolved>,
    mut followers: Query<(&mut PathFollower, Option<&mut Health>)>,
) {
    for result in resolved.read() {
        let Ok((mut follower, health)) = followers.get_mut(result.entity) else {
            continue;
        };

        match follower.apply_resolution(result.sequence, &result.result, map.settings()) {
            Resolution::Applied => {}
            Resolution::Stale => {
                debug!("[AI] {:?} dropped stale path result #{}", result.entity, result.sequence);
            }
            Resolution::Failed(failure) => {
                if config.kill_on_path_failure {
                    if let Some(mut health) = health {
                        warn!("[AI] {:?} has no path to the player ({}), removing it", result.entity, failure);
                        health.kill();
                    }
                }
            }
        }
    }
}

/// Turn each follower's waypoint into acceleration for the integrator.
pub(super) fn steer_followers(
    config: Res<InitialConfig>,
    map: Res<TileMap>,
    time: Res<Time<Fixed>>,
    mut debug: ResMut<DebugContext>,
    mut followers: Query<(Entity, &SimPosition, &mut SimVelocity, &mut PathFollower, Option<&Health>)>,
) {
    let dt = time.timestep().as_secs_f32();
    let tuning = config.follower_tuning();
    let record = debug.is_enabled(DebugCategory::Ai);
    if record {
        debug.steering.clear();
    }

    for (entity, pos, mut vel, mut follower, health) in followers.iter_mut() {
        if !alive(health) {
            continue;
        }
        let Some(direction) = follower.steer(pos.0, map.settings(), &tuning) else {
            continue;
        };
        vel.0 += direction * config.steering_force * dt;

        if record {
            if let Some(waypoint) = follower.steering_target() {
                debug.steering.push(SteeringSample { entity, waypoint, direction });
            }
        }
    }
}
