//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems and in the AI crate, not here.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::NAV_ANGULAR_SPEED_DEG;

/// Marks an entity as an AI-controlled enemy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Enemy;

/// Marks the player-controlled character.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Player;

/// Path-follower state. Driven by movement directives, integrated by the
/// navigation system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavAgent {
    pub speed: f32,
    pub acceleration: f32,
    pub stopping_distance: f32,
    /// Turn rate toward the direction of travel (degrees/s).
    pub angular_speed_deg: f32,
    pub destination: Option<Vec3>,
    /// When set, the agent brakes and holds position.
    pub stopped: bool,
    /// True from `SetDestination` until the next navigation step.
    pub path_pending: bool,
    pub velocity: Vec3,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            speed: 0.0,
            acceleration: 0.0,
            stopping_distance: 0.0,
            angular_speed_deg: NAV_ANGULAR_SPEED_DEG,
            destination: None,
            stopped: false,
            path_pending: false,
            velocity: Vec3::ZERO,
        }
    }
}

/// Animator parameter store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimatorState {
    /// Triggers set and not yet consumed or reset.
    pub triggers: BTreeSet<String>,
    pub bools: BTreeMap<String, bool>,
}

/// Damageable hit points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub max: f32,
    pub current: f32,
    /// Set once `current` reaches zero. Defeated agents are inert.
    pub defeated: bool,
}

/// Mesh highlight flag toggled by lock-on.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Highlight {
    pub on: bool,
}
