use bevy::prelude::*;
use rustc_hash::FxHashMap;

use super::types::PathFailure;

/// Introspection record of the most recent search.
///
/// Filled only when a caller passes one in; search results never depend on it.
/// Keyed by world tile so every segment of a cross-chunk search fits in one trace.
#[derive(Clone, Debug, Default)]
pub struct SearchTrace {
    pub start: Option<IVec2>,
    pub goal: Option<IVec2>,
    /// Tiles in the order they were taken off the open set.
    pub expansion_order: Vec<IVec2>,
    pub g_score: FxHashMap<IVec2, u32>,
    pub f_score: FxHashMap<IVec2, u32>,
    pub came_from: FxHashMap<IVec2, IVec2>,
    /// Path length on success.
    pub outcome: Option<Result<usize, PathFailure>>,
}

impl SearchTrace {
    pub fn reset(&mut self, start: IVec2, goal: IVec2) {
        self.start = Some(start);
        self.goal = Some(goal);
        self.expansion_order.clear();
        self.g_score.clear();
        self.f_score.clear();
        self.came_from.clear();
        self.outcome = None;
    }

    #[inline]
    pub fn expansions(&self) -> usize {
        self.expansion_order.len()
    }

    pub fn was_expanded(&self, tile: IVec2) -> bool {
        self.expansion_order.contains(&tile)
    }

    pub(super) fn record_expansion(&mut self, tile: IVec2) {
        self.expansion_order.push(tile);
    }

    pub(super) fn record_relaxation(&mut self, tile: IVec2, from: IVec2, g: u32, f: u32) {
        self.g_score.insert(tile, g);
        self.f_score.insert(tile, f);
        self.came_from.insert(tile, from);
    }

    pub(super) fn record_seed(&mut self, tile: IVec2, f: u32) {
        self.g_score.insert(tile, 0);
        self.f_score.insert(tile, f);
    }
}
