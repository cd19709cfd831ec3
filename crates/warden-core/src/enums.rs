//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Enemy behavior state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Transient: resolved to Chase or Patrol on the first update.
    #[default]
    Idle,
    /// Cycling through waypoints with a dwell at each.
    Patrol,
    /// Pursuing the current target.
    Chase,
    /// Running a melee combo against the current target.
    Attack,
    /// Walking back to the spawn anchor and re-orienting.
    Return,
}

impl EnemyState {
    pub const ALL: [EnemyState; 5] = [
        EnemyState::Idle,
        EnemyState::Patrol,
        EnemyState::Chase,
        EnemyState::Attack,
        EnemyState::Return,
    ];

    /// Whether `self -> next` is an edge of the transition graph.
    /// Self-loops are internal and never go through a state change.
    pub fn can_transition_to(self, next: EnemyState) -> bool {
        use EnemyState::*;
        matches!(
            (self, next),
            (Idle, Chase)
                | (Idle, Patrol)
                | (Patrol, Chase)
                | (Chase, Return)
                | (Chase, Attack)
                | (Attack, Return)
                | (Attack, Chase)
                | (Return, Chase)
                | (Return, Patrol)
        )
    }

    /// Whether a target reference may be held in this state.
    pub fn holds_target(self) -> bool {
        matches!(self, EnemyState::Chase | EnemyState::Attack)
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyState::Idle => "Idle",
            EnemyState::Patrol => "Patrol",
            EnemyState::Chase => "Chase",
            EnemyState::Attack => "Attack",
            EnemyState::Return => "Return",
        }
    }
}

/// Animation keyframe callbacks raised by animation playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationEvent {
    /// The strike frame of an attack animation.
    AttackHit,
    /// The end of an attack animation.
    AttackEnd,
}
