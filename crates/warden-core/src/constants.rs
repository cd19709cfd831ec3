//! Simulation constants and tuning defaults.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

// --- Detection ---

/// Radius within which an enemy can notice the player (m).
pub const DETECTION_RADIUS: f32 = 15.0;

/// Full field-of-view cone angle (degrees).
pub const DETECTION_ANGLE_DEG: f32 = 110.0;

/// Beyond this distance a chase is abandoned (m).
pub const MAX_CHASE_DISTANCE: f32 = 20.0;

// --- Patrol ---

/// Dwell at each reached waypoint (seconds).
pub const WAYPOINT_WAIT_SECS: f64 = 180.0;

pub const PATROL_SPEED: f32 = 2.0;
pub const PATROL_ACCELERATION: f32 = 4.0;
pub const PATROL_STOPPING_DISTANCE: f32 = 0.1;

/// Turn rate used when re-orienting at the spawn anchor (degrees/s).
pub const PATROL_TURN_SPEED_DEG: f32 = 120.0;

/// Distance ahead of spawn for the synthesized second waypoint (m).
pub const FALLBACK_WAYPOINT_DISTANCE: f32 = 5.0;

// --- Chase ---

pub const CHASE_SPEED: f32 = 4.5;
pub const CHASE_ACCELERATION: f32 = 8.0;
pub const CHASE_STOPPING_DISTANCE: f32 = 1.5;

/// Chase never parks farther out than this fraction of the engagement range,
/// otherwise a short-range combo could never be started.
pub const CHASE_STOP_RANGE_FRACTION: f32 = 0.9;

/// Turn rate while facing the target during an attack (degrees/s).
pub const CHASE_ROTATION_SPEED_DEG: f32 = 360.0;

// --- Attack ---

/// Engagement range used when no combo range is available (m).
pub const ATTACK_RANGE: f32 = 1.5;

/// Damage used when a combo has no entry for the current attack.
pub const ATTACK_DAMAGE: f32 = 10.0;

/// Idle time after the last attack before a combo is abandoned (seconds).
pub const COMBO_RESET_SECS: f64 = 2.0;

/// Multiplier on combo range before an attack breaks off, also the hit reach.
pub const ATTACK_BREAK_OFF_FACTOR: f32 = 1.2;

/// Minimum dot(forward, to-target) for a hit to connect.
pub const ATTACK_FACING_DOT: f32 = 0.5;

/// Number of combo definitions in a table.
pub const COMBO_COUNT: usize = 4;

/// Every trigger the attack animator understands. Cleared as a group.
pub const ATTACK_TRIGGERS: [&str; 13] = [
    "QuickJab1",
    "QuickJab2",
    "QuickJab3",
    "HeavyStrike1",
    "HeavyStrike2",
    "HeavyStrike3",
    "SpinAttack1",
    "SpinAttack2",
    "SpinAttack3",
    "SpinAttack4",
    "UppercutSetup",
    "UppercutHit",
    "UppercutFinish",
];

// --- Return ---

/// Orientation error below which the anchor counts as reached (degrees).
pub const RETURN_ALIGN_TOLERANCE_DEG: f32 = 1.0;

// --- Animator parameters ---

pub const ANIM_IS_MOVING: &str = "IsMoving";
pub const ANIM_IS_CHASING: &str = "IsChasing";
pub const ANIM_IS_ATTACKING: &str = "IsAttacking";

/// Speed above which an agent counts as moving (m/s).
pub const MOVING_SPEED_THRESHOLD: f32 = 0.1;

/// Distance to the active waypoint under which a patrolling agent counts as stopped (m).
pub const WAYPOINT_ARRIVAL_EPSILON: f32 = 0.1;

// --- Navigation ---

/// Turn rate of the path follower toward its velocity (degrees/s).
pub const NAV_ANGULAR_SPEED_DEG: f32 = 120.0;

// --- Lock-on ---

/// Radius around the player searched for lock-on candidates (m).
pub const LOCK_ON_SEARCH_RADIUS: f32 = 20.0;

// --- Health ---

pub const PLAYER_MAX_HEALTH: f32 = 100.0;
pub const ENEMY_MAX_HEALTH: f32 = 50.0;
