//! Outputs of the AI: capability directives and gameplay events.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::EnemyState;
use crate::types::{AgentId, AttackTag};

/// A fire-and-forget call on an external capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Directive {
    // --- Path follower ---
    SetSpeed { agent: AgentId, speed: f32 },
    SetAcceleration { agent: AgentId, acceleration: f32 },
    SetStoppingDistance { agent: AgentId, distance: f32 },
    SetDestination { agent: AgentId, point: Vec3 },
    Stop { agent: AgentId, stopped: bool },

    // --- Animator ---
    SetTrigger { agent: AgentId, name: String },
    ResetTrigger { agent: AgentId, name: String },
    SetBool { agent: AgentId, name: String, value: bool },

    // --- Damageable ---
    ApplyDamage { source: AgentId, target: AgentId, amount: f32 },

    // --- Mesh highlighter ---
    Highlight { target: AgentId, on: bool },
}

/// Notable AI decisions, for logs, UI and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AiEvent {
    StateChanged {
        agent: AgentId,
        from: EnemyState,
        to: EnemyState,
    },
    TargetAcquired {
        agent: AgentId,
        target: AgentId,
    },
    ComboSelected {
        agent: AgentId,
        combo: usize,
        name: String,
    },
    AttackFired {
        agent: AgentId,
        attack: AttackTag,
        trigger: Option<String>,
    },
    /// Fire requested while an attack was still in flight.
    AttackRejected { agent: AgentId },
    HitLanded {
        agent: AgentId,
        target: AgentId,
        damage: f32,
        attack: AttackTag,
    },
    /// Hit frame reached but the target was out of reach or not in front.
    HitMissed { agent: AgentId },
    WaypointReached { agent: AgentId, index: usize },
    Defeated { agent: AgentId },
    LockOnChanged { target: Option<AgentId> },
}
