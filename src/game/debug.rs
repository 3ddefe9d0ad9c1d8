/// Debug flags and introspection data, owned by the app as a resource.
///
/// Producers only write here when their category is enabled, so leaving every
/// flag off costs nothing beyond the flag check.

use bevy::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::game::pathfinding::SearchTrace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebugCategory {
    /// Keep the trace of the most recent A* search.
    Pathfinding,
    /// Record steering decisions of path followers.
    Ai,
    /// Record tile hits from the physics integrator.
    Collision,
}

/// A substep of `entity` was blocked by the wall at `tile`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionHit {
    pub entity: Entity,
    pub tile: IVec2,
}

/// One steering decision: where the follower was heading and the unit
/// direction it accelerated in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringSample {
    pub entity: Entity,
    pub waypoint: Vec2,
    pub direction: Vec2,
}

#[derive(Resource, Default, Debug)]
pub struct DebugContext {
    enabled: FxHashSet<DebugCategory>,
    pub last_search: Option<SearchTrace>,
    /// Hits of the latest physics tick.
    pub collisions: Vec<CollisionHit>,
    /// Steering of the latest tick.
    pub steering: Vec<SteeringSample>,
}

impl DebugContext {
    pub fn set(&mut self, category: DebugCategory, enabled: bool) {
        if enabled {
            self.enabled.insert(category);
        } else if self.enabled.remove(&category) {
            match category {
                DebugCategory::Pathfinding => self.last_search = None,
                DebugCategory::Ai => self.steering.clear(),
                DebugCategory::Collision => self.collisions.clear(),
            }
        }
    }

    pub fn toggle(&mut self, category: DebugCategory) -> bool {
        let enabled = !self.is_enabled(category);
        self.set(category, enabled);
        enabled
    }

    #[inline]
    pub fn is_enabled(&self, category: DebugCategory) -> bool {
        self.enabled.contains(&category)
    }
}
