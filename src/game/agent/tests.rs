use bevy::prelude::*;

use super::*;
use crate::game::pathfinding::{Path, PathFailure};
use crate::game::world::GridSettings;

/// Straight path along +x from `(0, 0)` to `(len - 1, 0)`, goal first.
fn straight_path(len: i32) -> Path {
    Path::new((0..len).rev().map(|x| IVec2::new(x, 0)).collect())
}

fn following(path: Path) -> PathFollower {
    let mut follower = PathFollower::default();
    let goal = path.goal().unwrap();
    let sequence = follower.begin_request(goal);
    follower.apply_resolution(sequence, &Ok(path), &GridSettings::default());
    follower
}

#[test]
fn test_idle_follower_pursues_within_range() {
    let tuning = FollowerTuning::default();
    let follower = PathFollower::default();
    assert_eq!(follower.state(), FollowState::Idle);
    assert!(follower.needs_new_path(IVec2::ZERO, IVec2::new(60, 39), &tuning));
    assert!(!follower.needs_new_path(IVec2::ZERO, IVec2::new(60, 40), &tuning));
}

#[test]
fn test_in_flight_request_suppresses_pursuit() {
    let tuning = FollowerTuning::default();
    let mut follower = PathFollower::default();
    follower.begin_request(IVec2::new(5, 5));
    assert!(follower.is_awaiting());
    assert!(!follower.needs_new_path(IVec2::ZERO, IVec2::new(5, 5), &tuning));
}

#[test]
fn test_replan_requires_short_path_moved_target_and_proximity() {
    let tuning = FollowerTuning::default();
    let goal = IVec2::new(19, 0);

    let short = following(straight_path(20));
    assert_eq!(short.state(), FollowState::Following);
    assert_eq!(short.remaining_steps(), 19);
    assert!(!short.needs_new_path(IVec2::ZERO, goal, &tuning), "target has not moved");
    assert!(short.needs_new_path(IVec2::ZERO, goal + IVec2::Y, &tuning));
    assert!(!short.needs_new_path(IVec2::ZERO, IVec2::new(30, 25), &tuning), "moved but too far");

    let long = following(straight_path(40));
    assert!(!long.needs_new_path(IVec2::ZERO, IVec2::new(10, 0), &tuning), "plenty of path left");
}

#[test]
fn test_walking_toward_a_drifting_target_replans_once_the_path_runs_short() {
    let settings = GridSettings::default();
    let tuning = FollowerTuning::default();
    let mut follower = following(straight_path(40));

    let mut replanned_at = None;
    for tick in 1..40 {
        let target = IVec2::new(39, tick);
        let current = IVec2::new(follower.index() as i32 - 1, 0);
        let remaining = follower.remaining_steps();

        let wants = follower.needs_new_path(current, target, &tuning);
        if remaining >= tuning.replan_remaining_steps {
            assert!(!wants, "tick {tick}: {remaining} steps left, no replan yet");
        } else {
            assert!(wants, "tick {tick}: {remaining} steps left and the target moved");
            replanned_at = Some(remaining);
            break;
        }
        follower.observe_target(target);

        let waypoint = follower.steering_target().unwrap();
        assert_eq!(follower.steer(waypoint, &settings, &tuning), None);
    }

    assert_eq!(replanned_at, Some(tuning.replan_remaining_steps - 1));
}

#[test]
fn test_stale_results_are_discarded() {
    let settings = GridSettings::default();
    let mut follower = PathFollower::default();
    let first = follower.begin_request(IVec2::new(3, 0));
    let second = follower.begin_request(IVec2::new(4, 0));
    assert!(second > first);

    assert_eq!(follower.apply_resolution(first, &Ok(straight_path(4)), &settings), Resolution::Stale);
    assert!(follower.path().is_none());
    assert!(follower.is_awaiting());

    assert_eq!(follower.apply_resolution(second, &Ok(straight_path(5)), &settings), Resolution::Applied);
    assert_eq!(follower.index(), 1);
    assert_eq!(follower.steering_target(), Some(settings.tile_center(IVec2::new(1, 0))));
    assert!(!follower.is_awaiting());
}

#[test]
fn test_failure_clears_the_path() {
    let mut follower = following(straight_path(5));
    let sequence = follower.begin_request(IVec2::new(9, 9));
    let outcome = follower.apply_resolution(sequence, &Err(PathFailure::Exhausted), &GridSettings::default());
    assert_eq!(outcome, Resolution::Failed(PathFailure::Exhausted));
    assert_eq!(follower.state(), FollowState::Idle);
    assert!(follower.steering_target().is_none());
}

#[test]
fn test_steering_walks_waypoints_to_arrival() {
    let settings = GridSettings::default();
    let tuning = FollowerTuning::default();
    let mut follower = following(straight_path(4));

    let start = settings.tile_center(IVec2::ZERO);
    assert_eq!(follower.steer(start, &settings, &tuning), Some(Vec2::X));

    for x in 1..4 {
        let on_waypoint = settings.tile_center(IVec2::new(x, 0)) + Vec2::new(-3.0, 2.0);
        assert_eq!(follower.steer(on_waypoint, &settings, &tuning), None);
        assert_eq!(follower.index(), x as usize + 1);
    }
    assert_eq!(follower.state(), FollowState::Arrived);
    assert!(follower.steering_target().is_none());
    assert_eq!(follower.steer(Vec2::ZERO, &settings, &tuning), None);
}

#[test]
fn test_single_tile_path_has_already_arrived() {
    let follower = following(Path::new(vec![IVec2::new(2, 2)]));
    assert_eq!(follower.state(), FollowState::Arrived);
    assert_eq!(follower.remaining_steps(), 0);
}
