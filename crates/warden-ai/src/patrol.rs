//! Ordered waypoint traversal with a dwell at each waypoint.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use warden_core::constants::FALLBACK_WAYPOINT_DISTANCE;
use warden_core::types::Pose;

/// Position in a looping patrol route. Persists across state re-entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatrolCursor {
    /// Never empty.
    waypoints: Vec<Vec3>,
    index: usize,
    /// When the current waypoint was reached (seconds).
    reached_at: f64,
    waiting: bool,
}

impl PatrolCursor {
    /// Build a route. With no waypoints, synthesizes two: the spawn point
    /// and a point a few meters ahead of it.
    pub fn new(waypoints: Vec<Vec3>, spawn: &Pose) -> Self {
        let waypoints = if waypoints.is_empty() {
            tracing::debug!("no patrol waypoints configured, using spawn fallback");
            vec![
                spawn.position,
                spawn.position + spawn.forward() * FALLBACK_WAYPOINT_DISTANCE,
            ]
        } else {
            waypoints
        };
        Self {
            waypoints,
            index: 0,
            reached_at: 0.0,
            waiting: false,
        }
    }

    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Vec3 {
        self.waypoints[self.index]
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Start the dwell timer at the current waypoint.
    pub fn begin_dwell(&mut self, now: f64) {
        self.waiting = true;
        self.reached_at = now;
    }

    /// Cancel any dwell in progress (used when patrol is re-entered).
    pub fn clear_dwell(&mut self) {
        self.waiting = false;
    }

    pub fn dwell_elapsed(&self, now: f64, wait_secs: f64) -> bool {
        self.waiting && now >= self.reached_at + wait_secs
    }

    /// End the dwell and step to the next waypoint, wrapping around.
    pub fn advance(&mut self) -> Vec3 {
        self.waiting = false;
        self.index = (self.index + 1) % self.waypoints.len();
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_waypoints_follow_spawn_forward() {
        let spawn = Pose::from_yaw(Vec3::new(1.0, 0.0, 1.0), 90.0);
        let cursor = PatrolCursor::new(Vec::new(), &spawn);
        assert_eq!(cursor.waypoints().len(), 2);
        assert_eq!(cursor.waypoints()[0], spawn.position);
        let ahead = cursor.waypoints()[1];
        assert!((ahead - Vec3::new(6.0, 0.0, 1.0)).length() < 1e-4, "{ahead}");
    }

    #[test]
    fn test_index_wraps_for_every_route_length() {
        for n in 1..=6 {
            let points: Vec<Vec3> = (0..n).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
            let mut cursor = PatrolCursor::new(points, &Pose::default());
            let mut visited = Vec::new();
            for _ in 0..(n * 3) {
                cursor.begin_dwell(0.0);
                cursor.advance();
                assert!(cursor.index() < n);
                visited.push(cursor.index());
            }
            let expected: Vec<usize> = (0..n * 3).map(|k| (k + 1) % n).collect();
            assert_eq!(visited, expected, "route length {n}");
        }
    }

    #[test]
    fn test_dwell_timing() {
        let mut cursor = PatrolCursor::new(vec![Vec3::ZERO, Vec3::X], &Pose::default());
        assert!(!cursor.dwell_elapsed(100.0, 5.0), "not waiting yet");
        cursor.begin_dwell(10.0);
        assert!(!cursor.dwell_elapsed(14.9, 5.0));
        assert!(cursor.dwell_elapsed(15.0, 5.0));
        cursor.clear_dwell();
        assert!(!cursor.is_waiting());
    }
}
