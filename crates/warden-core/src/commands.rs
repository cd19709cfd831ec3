//! External commands sent into the simulation.
//!
//! Commands are queued and processed at the next tick boundary, so an
//! animation callback can never interleave with an in-progress update.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::AnimationEvent;
use crate::types::{AgentId, AttackTag};

/// All inputs the simulation accepts from collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    // --- Player / camera ---
    /// Teleport the player (movement is owned by the character controller).
    SetPlayerPosition { position: Vec3 },
    /// Camera position used to derive the lock-on sightline.
    SetCameraPosition { position: Vec3 },

    // --- Lock-on ---
    /// Enter or leave combat (lock-on) mode.
    SetCombatMode { active: bool },

    // --- Animation playback ---
    /// A keyframe callback for one agent's attack animation. `attack` is the
    /// tag from the `AttackFired` that started the clip; untagged callbacks
    /// apply to the most recently fired step.
    AnimationEvent {
        agent: AgentId,
        event: AnimationEvent,
        #[serde(default)]
        attack: Option<AttackTag>,
    },

    // --- Damage ---
    /// Apply damage from an outside source (player weapons, hazards).
    DamageAgent { agent: AgentId, amount: f32 },
}
