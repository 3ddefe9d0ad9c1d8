mod types;
mod astar;
mod search;
mod debug;
mod systems;

#[cfg(test)]
mod tests;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use types::{Path, PathFailure, PathLimits, PathRequest, PathResolved};
pub use search::{find_path, find_path_detailed};
pub use debug::SearchTrace;
pub use systems::PathRequestQueue;

use bevy::prelude::*;
use crate::game::config::{InitialConfig, RuntimeSettings};
use crate::game::debug::DebugContext;
use crate::game::simulation::SimSet;

/// Request queueing and search; followers order themselves around it.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct PathfindingSystems;

pub struct PathfindingPlugin;

impl Plugin for PathfindingPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PathRequest>();
        app.add_message::<PathResolved>();
        app.init_resource::<InitialConfig>();
        app.init_resource::<RuntimeSettings>();
        app.init_resource::<DebugContext>();
        app.init_resource::<PathRequestQueue>();

        app.add_systems(FixedUpdate, (
            systems::queue_path_requests,
            systems::process_path_requests,
        ).chain().in_set(PathfindingSystems).in_set(SimSet::Input).after(crate::game::world::WorldSystems));
    }
}
