use bevy::prelude::*;

use crate::game::pathfinding::{Path, PathFailure};
use crate::game::world::GridSettings;

/// Thresholds that gate re-planning and waypoint arrival.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FollowerTuning {
    /// Manhattan tile distance under which an agent without a path starts pursuing.
    pub pursuit_distance: u32,
    /// Tighter distance under which a nearly finished path is refreshed.
    pub replan_distance: u32,
    /// Remaining steps under which a moving target triggers a refresh.
    pub replan_remaining_steps: usize,
    /// Waypoint arrival radius, in tiles.
    pub arrival_epsilon: f32,
}

impl Default for FollowerTuning {
    fn default() -> Self {
        Self {
            pursuit_distance: 100,
            replan_distance: 50,
            replan_remaining_steps: 30,
            arrival_epsilon: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FollowState {
    #[default]
    Idle,
    Following,
    Arrived,
}

/// What happened to a path result handed to [`PathFollower::apply_resolution`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Answer to a request that has since been superseded.
    Stale,
    Applied,
    Failed(PathFailure),
}

#[inline]
pub fn manhattan(a: IVec2, b: IVec2) -> u32 {
    let d = (a - b).abs();
    (d.x + d.y) as u32
}

/// Path-following state owned by an agent.
///
/// `index` counts moves from the start of the current path and only grows;
/// a new path resets it to 1 because index 0 is the tile the agent was on
/// when it asked.
#[derive(Component, Clone, Debug, Default)]
pub struct PathFollower {
    path: Option<Path>,
    index: usize,
    /// Target tile seen on the latest tick.
    last_target_tile: Option<IVec2>,
    /// Target tile the latest request was made for.
    last_destination_tile: Option<IVec2>,
    steering_target: Option<Vec2>,
    latest_sequence: u64,
    awaiting: bool,
}

impl PathFollower {
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn steering_target(&self) -> Option<Vec2> {
        self.steering_target
    }

    pub fn last_target_tile(&self) -> Option<IVec2> {
        self.last_target_tile
    }

    pub fn last_destination_tile(&self) -> Option<IVec2> {
        self.last_destination_tile
    }

    pub fn latest_sequence(&self) -> u64 {
        self.latest_sequence
    }

    /// A request has been issued and its answer has not arrived.
    pub fn is_awaiting(&self) -> bool {
        self.awaiting
    }

    pub fn state(&self) -> FollowState {
        match &self.path {
            None => FollowState::Idle,
            Some(path) if self.index >= path.len() => FollowState::Arrived,
            Some(_) => FollowState::Following,
        }
    }

    /// Moves left between the current waypoint and the goal.
    pub fn remaining_steps(&self) -> usize {
        self.path.as_ref().map_or(0, |path| path.len().saturating_sub(self.index))
    }

    pub fn observe_target(&mut self, target_tile: IVec2) {
        self.last_target_tile = Some(target_tile);
    }

    /// Decide whether to ask for a new path from `current_tile` to `target_tile`.
    ///
    /// Pursuit starts when there is no usable path and the target is within
    /// `pursuit_distance`. An existing path is refreshed only when it is nearly
    /// done, the target has moved since it was requested, and the target is
    /// within `replan_distance`.
    pub fn needs_new_path(&self, current_tile: IVec2, target_tile: IVec2, tuning: &FollowerTuning) -> bool {
        let distance = manhattan(current_tile, target_tile);
        let exhausted = self.path.as_ref().is_none_or(|path| self.index >= path.len());

        if exhausted {
            return !self.awaiting && distance < tuning.pursuit_distance;
        }

        self.remaining_steps() < tuning.replan_remaining_steps
            && self.last_destination_tile != Some(target_tile)
            && distance < tuning.replan_distance
    }

    /// Record an outgoing request and return the sequence number it must carry.
    pub fn begin_request(&mut self, target_tile: IVec2) -> u64 {
        self.latest_sequence += 1;
        self.last_destination_tile = Some(target_tile);
        self.awaiting = true;
        self.latest_sequence
    }

    /// Accept a search result unless a newer request has been issued since.
    pub fn apply_resolution(
        &mut self,
        sequence: u64,
        result: &Result<Path, PathFailure>,
        settings: &GridSettings,
    ) -> Resolution {
        if sequence < self.latest_sequence {
            return Resolution::Stale;
        }
        self.awaiting = false;

        match result {
            Ok(path) => {
                self.path = Some(path.clone());
                self.index = 1;
                self.refresh_waypoint(settings);
                Resolution::Applied
            }
            Err(failure) => {
                self.path = None;
                self.index = 0;
                self.steering_target = None;
                Resolution::Failed(*failure)
            }
        }
    }

    /// Unit direction to accelerate in this tick, if any.
    ///
    /// Within `arrival_epsilon` tiles of the waypoint the index advances to the
    /// next tile instead; past the goal the follower is `Arrived`.
    pub fn steer(&mut self, position: Vec2, settings: &GridSettings, tuning: &FollowerTuning) -> Option<Vec2> {
        if self.state() != FollowState::Following {
            return None;
        }
        let waypoint = self.steering_target?;
        let to_waypoint = (waypoint - position) / settings.tile_size;

        if to_waypoint.length() < tuning.arrival_epsilon {
            self.index += 1;
            self.refresh_waypoint(settings);
            return None;
        }
        Some(to_waypoint.normalize_or_zero())
    }

    fn refresh_waypoint(&mut self, settings: &GridSettings) {
        self.steering_target = self
            .path
            .as_ref()
            .and_then(|path| path.from_start(self.index))
            .map(|tile| settings.tile_center(tile));
    }
}
