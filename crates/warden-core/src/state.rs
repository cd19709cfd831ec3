//! World snapshot: the complete visible state handed to collaborators each tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::EnemyState;
use crate::events::{AiEvent, Directive};
use crate::types::{AgentId, SimTime};

/// Complete state after a tick, plus everything emitted during it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: SimTime,
    pub enemies: Vec<EnemyView>,
    pub player: Option<PlayerView>,
    pub lock_on: LockOnView,
    /// Capability calls issued this tick, in emission order.
    pub directives: Vec<Directive>,
    pub events: Vec<AiEvent>,
}

/// One enemy as seen by camera, UI and debug tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: AgentId,
    pub state: EnemyState,
    pub previous_state: EnemyState,
    pub position: Vec3,
    /// Heading around +Y (degrees).
    pub yaw_degrees: f32,
    pub target: Option<AgentId>,
    /// Name of the combo in use.
    pub combo: String,
    pub attack_index: usize,
    pub is_attacking: bool,
    pub waypoint_index: usize,
    pub engagement_range: f32,
    pub health: f32,
    pub highlighted: bool,
}

/// The player character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: AgentId,
    pub position: Vec3,
    pub health: f32,
    pub defeated: bool,
}

/// Lock-on targeting state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockOnView {
    pub combat_mode: bool,
    pub target: Option<AgentId>,
}
