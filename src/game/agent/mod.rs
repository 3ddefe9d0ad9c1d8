/// Path-following agents: when to ask for a path, how to walk it.
///
/// Requests and results travel as messages through the pathfinding queue, so
/// an answer can land ticks after it was asked for; followers keep walking
/// their previous path in the meantime.

mod follower;
mod systems;

#[cfg(test)]
mod tests;

pub use follower::{manhattan, FollowState, FollowerTuning, PathFollower, Resolution};

use bevy::prelude::*;
use crate::game::config::InitialConfig;
use crate::game::debug::DebugContext;
use crate::game::pathfinding::{PathRequest, PathResolved, PathfindingSystems};
use crate::game::simulation::SimSet;

pub struct AgentPlugin;

impl Plugin for AgentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InitialConfig>();
        app.init_resource::<DebugContext>();
        app.add_message::<PathRequest>();
        app.add_message::<PathResolved>();

        app.add_systems(FixedUpdate, (
            systems::request_paths.in_set(SimSet::Input).before(PathfindingSystems),
            systems::apply_path_results.in_set(SimSet::Input).after(PathfindingSystems),
            systems::steer_followers.in_set(SimSet::Steering),
        ));
    }
}
