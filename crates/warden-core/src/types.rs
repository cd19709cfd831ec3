//! Fundamental geometric and simulation types.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Stable handle for any agent in the registry (enemies and the player).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

/// World-space placement of an agent.
/// Y is up; the local forward axis is +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

/// Identifies one fired attack step. Animation playback echoes it back so
/// callbacks resolve against the step that actually fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttackTag {
    /// Attack-session generation, bumped every time the enemy enters Attack.
    pub session: u32,
    /// Index into the combo table.
    pub combo: usize,
    /// Step within the combo (0-based).
    pub step: usize,
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` facing `yaw_degrees` around +Y (0 = facing +Z).
    pub fn from_yaw(position: Vec3, yaw_degrees: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_y(yaw_degrees.to_radians()),
        }
    }

    /// Unit forward vector.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Heading around +Y in degrees, in (-180, 180].
    pub fn yaw_degrees(&self) -> f32 {
        let f = self.forward();
        f.x.atan2(f.z).to_degrees()
    }

    /// Straight-line distance to a point.
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.elapsed_secs += dt as f64;
    }
}
