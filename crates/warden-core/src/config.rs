//! Per-agent tuning loaded from structured config.
//!
//! All fields default to the values in `constants`, so a config file only
//! needs to name what it overrides.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

/// Behavior parameters for one enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    // --- Detection ---
    pub detection_radius: f32,
    /// Full cone angle in degrees.
    pub detection_angle_deg: f32,
    pub max_chase_distance: f32,
    /// Project both vectors onto the ground plane before the cone test.
    /// Off by default; the cone test is a full 3D angle.
    pub flatten_fov: bool,

    // --- Patrol ---
    pub waypoint_wait_secs: f64,
    pub patrol_speed: f32,
    pub patrol_acceleration: f32,
    pub patrol_stopping_distance: f32,
    pub patrol_turn_speed_deg: f32,

    // --- Chase ---
    pub chase_speed: f32,
    pub chase_acceleration: f32,
    pub chase_stopping_distance: f32,
    pub chase_rotation_speed_deg: f32,

    // --- Attack ---
    pub attack_range: f32,
    pub attack_damage: f32,
    pub combo_reset_secs: f64,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            detection_radius: DETECTION_RADIUS,
            detection_angle_deg: DETECTION_ANGLE_DEG,
            max_chase_distance: MAX_CHASE_DISTANCE,
            flatten_fov: false,
            waypoint_wait_secs: WAYPOINT_WAIT_SECS,
            patrol_speed: PATROL_SPEED,
            patrol_acceleration: PATROL_ACCELERATION,
            patrol_stopping_distance: PATROL_STOPPING_DISTANCE,
            patrol_turn_speed_deg: PATROL_TURN_SPEED_DEG,
            chase_speed: CHASE_SPEED,
            chase_acceleration: CHASE_ACCELERATION,
            chase_stopping_distance: CHASE_STOPPING_DISTANCE,
            chase_rotation_speed_deg: CHASE_ROTATION_SPEED_DEG,
            attack_range: ATTACK_RANGE,
            attack_damage: ATTACK_DAMAGE,
            combo_reset_secs: COMBO_RESET_SECS,
        }
    }
}

impl EnemyTuning {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Lock-on targeting parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockOnTuning {
    pub search_radius: f32,
}

impl Default for LockOnTuning {
    fn default() -> Self {
        Self {
            search_radius: LOCK_ON_SEARCH_RADIUS,
        }
    }
}
