use std::collections::VecDeque;

use bevy::prelude::*;
use warren_macros::profile;

use crate::game::config::{InitialConfig, RuntimeSettings};
use crate::game::debug::{DebugCategory, DebugContext};
use crate::game::simulation::SimTick;
use crate::game::world::TileMap;
use super::debug::SearchTrace;
use super::search::find_path_detailed;
use super::types::{PathFailure, PathRequest, PathResolved};

/// Requests waiting for a search slot. At most one per entity; a newer
/// request replaces the queued one in place.
#[derive(Resource, Default, Debug)]
pub struct PathRequestQueue {
    queue: VecDeque<PathRequest>,
}

impl PathRequestQueue {
    pub fn push(&mut self, request: PathRequest) {
        match self.queue.iter_mut().find(|queued| queued.entity == request.entity) {
            Some(queued) if queued.sequence < request.sequence => *queued = request,
            Some(_) => {}
            None => self.queue.push_back(request),
        }
    }

    pub fn pop(&mut self) -> Option<PathRequest> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

pub(super) fn queue_path_requests(
    mut path_requests: MessageReader<PathRequest>,
    mut queue: ResMut<PathRequestQueue>,
) {
    for request in path_requests.read() {
        queue.push(request.clone());
    }
}

#[profile(2)]
pub(super) fn process_path_requests(
    #[allow(unused_variables)] tick: Res<SimTick>,
    mut queue: ResMut<PathRequestQueue>,
    map: Res<TileMap>,
    config: Res<InitialConfig>,
    settings: Res<RuntimeSettings>,
    mut debug: ResMut<DebugContext>,
    mut resolved: MessageWriter<PathResolved>,
) {
    if queue.is_empty() {
        return;
    }
    if queue.len() > settings.path_requests_per_tick * 4 {
        warn!("[PATHFINDING] Request backlog at {} (budget {} per tick)", queue.len(), settings.path_requests_per_tick);
    }

    let limits = config.path_limits();
    let tracing = debug.is_enabled(DebugCategory::Pathfinding);
    let mut processed = 0;

    while processed < settings.path_requests_per_tick {
        let Some(request) = queue.pop() else { break };
        processed += 1;

        let start = map.probe_tile(request.start);
        let goal = map.probe_tile(request.goal);

        let mut trace = tracing.then(SearchTrace::default);
        let result = find_path_detailed(&map, &start, &goal, &limits, trace.as_mut());
        if let Some(trace) = trace {
            debug.last_search = Some(trace);
        }

        match &result {
            Ok(_) | Err(PathFailure::BudgetExceeded { .. }) => {}
            Err(failure) => debug!("[PATHFINDING] {:?} {} -> {}: {}", request.entity, request.start, request.goal, failure),
        }

        resolved.write(PathResolved {
            entity: request.entity,
            sequence: request.sequence,
            result,
        });
    }

    crate::profile_log!(tick, "[PATHFINDING] tick {}: {} searches, {} queued", tick.0, processed, queue.len());
}
