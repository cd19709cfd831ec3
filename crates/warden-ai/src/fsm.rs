//! Enemy behavior finite state machine.
//!
//! Each `EnemyState` maps to an (enter, update, exit) triple in `STATE_TABLE`.
//! `update` returns the next state, if any; `change_state` then runs the old
//! state's exit hook followed by the new state's enter hook. A newly entered
//! state is not updated until the next tick.
//!
//! The brain never touches collaborators directly. Movement, animation and
//! damage requests are pushed into an `Outbox` as directives, and the
//! path follower reports back through `NavFeedback`.

use glam::Vec3;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use warden_core::config::EnemyTuning;
use warden_core::constants::*;
use warden_core::enums::EnemyState;
use warden_core::events::{AiEvent, Directive};
use warden_core::types::{AgentId, AttackTag, Pose};

use crate::attack::{clear_triggers, hit_connects, hit_damage, AttackSession};
use crate::combos::ComboTable;
use crate::geometry::{self, look_rotation, rotate_towards, rotation_angle_deg};
use crate::patrol::PatrolCursor;

/// Directives and events produced during a tick or callback.
#[derive(Debug, Default)]
pub struct Outbox {
    pub directives: Vec<Directive>,
    pub events: Vec<AiEvent>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty() && self.events.is_empty()
    }
}

/// The player as observed this tick. Absent when there is no live player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub id: AgentId,
    pub position: Vec3,
}

/// Values reported by the path follower.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NavFeedback {
    pub remaining_distance: f32,
    pub path_pending: bool,
    pub velocity: Vec3,
}

/// Everything the brain reads and writes during one tick or callback.
pub struct Frame<'a> {
    /// Sim time (seconds).
    pub now: f64,
    /// Tick duration (seconds).
    pub dt: f32,
    /// The agent's own pose. Rotated in place while attacking and returning.
    pub pose: &'a mut Pose,
    pub player: Option<Sighting>,
    pub nav: NavFeedback,
    pub combos: &'a ComboTable,
    pub rng: &'a mut dyn RngCore,
    pub out: &'a mut Outbox,
}

type HookFn = fn(&mut EnemyBrain, &mut Frame<'_>);
type UpdateFn = fn(&mut EnemyBrain, &mut Frame<'_>) -> Option<EnemyState>;

struct StateHandlers {
    enter: HookFn,
    update: UpdateFn,
    exit: HookFn,
}

/// Indexed by `EnemyState as usize`.
static STATE_TABLE: [StateHandlers; 5] = [
    // Idle is only ever the starting state, so it is never entered
    StateHandlers {
        enter: no_op,
        update: update_idle,
        exit: no_op,
    },
    StateHandlers {
        enter: enter_patrol,
        update: update_patrol,
        exit: no_op,
    },
    StateHandlers {
        enter: enter_chase,
        update: update_chase,
        exit: no_op,
    },
    StateHandlers {
        enter: enter_attack,
        update: update_attack,
        exit: exit_attack,
    },
    StateHandlers {
        enter: enter_return,
        update: update_return,
        exit: no_op,
    },
];

fn handlers(state: EnemyState) -> &'static StateHandlers {
    &STATE_TABLE[state as usize]
}

/// Per-enemy AI state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBrain {
    id: AgentId,
    state: EnemyState,
    previous_state: EnemyState,
    /// Only held in Chase and Attack.
    target: Option<AgentId>,
    /// Spawn pose; Return walks back here and re-orients.
    anchor: Pose,
    patrol: PatrolCursor,
    attack: AttackSession,
    tuning: EnemyTuning,
    /// Last stopping distance sent to the path follower.
    stopping_distance: f32,
    /// Last [IsMoving, IsChasing, IsAttacking] sent to the animator.
    anim_params: Option<[bool; 3]>,
    warned_missing_player: bool,
}

impl EnemyBrain {
    /// Create a brain in the transient Idle state. Call `initialize` before
    /// the first tick.
    pub fn new(id: AgentId, spawn: Pose, waypoints: Vec<Vec3>, tuning: EnemyTuning) -> Self {
        Self {
            id,
            state: EnemyState::Idle,
            previous_state: EnemyState::Idle,
            target: None,
            anchor: spawn,
            patrol: PatrolCursor::new(waypoints, &spawn),
            attack: AttackSession::default(),
            tuning,
            stopping_distance: 0.0,
            anim_params: None,
            warned_missing_player: false,
        }
    }

    /// Leave Idle and start patrolling.
    pub fn initialize(&mut self, frame: &mut Frame<'_>) {
        self.change_state(EnemyState::Patrol, frame);
    }

    /// Run the active state's update, apply any transition, then refresh
    /// animator locomotion parameters.
    pub fn tick(&mut self, frame: &mut Frame<'_>) {
        if let Some(next) = (handlers(self.state).update)(self, frame) {
            self.change_state(next, frame);
        }
        self.update_animator(frame);
    }

    /// Exit the current state and enter `next`. No-op if already there.
    pub fn change_state(&mut self, next: EnemyState, frame: &mut Frame<'_>) {
        if next == self.state {
            return;
        }
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );

        (handlers(self.state).exit)(self, frame);

        self.previous_state = self.state;
        self.state = next;
        debug!(agent = %self.id, from = self.previous_state.name(), to = next.name(), "state change");
        frame.out.events.push(AiEvent::StateChanged {
            agent: self.id,
            from: self.previous_state,
            to: next,
        });

        (handlers(next).enter)(self, frame);
    }

    // --- Queries ---

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn previous_state(&self) -> EnemyState {
        self.previous_state
    }

    pub fn target(&self) -> Option<AgentId> {
        self.target
    }

    pub fn anchor(&self) -> &Pose {
        &self.anchor
    }

    pub fn patrol(&self) -> &PatrolCursor {
        &self.patrol
    }

    pub fn session(&self) -> &AttackSession {
        &self.attack
    }

    pub fn tuning(&self) -> &EnemyTuning {
        &self.tuning
    }

    /// Distance at which Chase hands over to Attack for the current combo.
    pub fn engagement_range(&self, combos: &ComboTable) -> f32 {
        combos
            .get(self.attack.combo)
            .map(|c| c.range)
            .unwrap_or(self.tuning.attack_range)
    }

    /// Position of the held target, if it is still observable.
    fn target_position(&self, frame: &Frame<'_>) -> Option<Vec3> {
        let target = self.target?;
        frame
            .player
            .filter(|p| p.id == target)
            .map(|p| p.position)
    }

    // --- Detection ---

    /// Radius + cone test against the player. Acquires the player as target
    /// on success.
    pub fn can_see_player(&mut self, frame: &mut Frame<'_>) -> bool {
        let Some(player) = frame.player else {
            if !self.warned_missing_player {
                warn!(agent = %self.id, "no detectable player");
                self.warned_missing_player = true;
            }
            return false;
        };

        let seen = geometry::can_see(
            frame.pose,
            player.position,
            self.tuning.detection_radius,
            self.tuning.detection_angle_deg,
            self.tuning.flatten_fov,
        );
        if !seen {
            return false;
        }

        if self.target != Some(player.id) {
            debug!(agent = %self.id, target = %player.id, "player detected");
            frame.out.events.push(AiEvent::TargetAcquired {
                agent: self.id,
                target: player.id,
            });
        }
        self.target = Some(player.id);
        true
    }

    // --- Combo engine ---

    /// Fire the next step of the current combo. Rejected while one is in flight.
    pub fn fire_attack(&mut self, frame: &mut Frame<'_>) -> bool {
        let combos = frame.combos;
        let Some(combo) = combos.get(self.attack.combo) else {
            return false;
        };
        self.attack
            .fire(self.id, combo, &combos.all_triggers(), frame.now, frame.out)
    }

    fn select_combo(&mut self, frame: &mut Frame<'_>) {
        let combos = frame.combos;
        let next = combos.select_next(self.attack.combo, &mut *frame.rng);
        self.attack.combo = next;
        let name = combos.get(next).map(|c| c.name.clone()).unwrap_or_default();
        debug!(agent = %self.id, combo = %name, "combo selected");
        frame.out.events.push(AiEvent::ComboSelected {
            agent: self.id,
            combo: next,
            name,
        });
    }

    /// Animation callback at the strike frame of the `attack` step (or the
    /// most recently fired step when untagged). Applies that step's damage if
    /// the target is still in front and within reach, even when the combo
    /// has already handed back to Chase.
    pub fn on_attack_hit(&mut self, attack: Option<AttackTag>, frame: &mut Frame<'_>) {
        let Some(attack) = attack.or(self.attack.last_fired) else {
            debug!(agent = %self.id, state = self.state.name(), "attack hit with nothing fired ignored");
            return;
        };
        let (Some(target), Some(target_pos)) = (self.target, self.target_position(frame)) else {
            return;
        };

        let combos = frame.combos;
        let combo = combos.get(attack.combo);
        let range = combo.map_or(self.tuning.attack_range, |c| c.range);
        if !hit_connects(frame.pose, target_pos, range) {
            debug!(agent = %self.id, step = attack.step, "attack missed");
            frame.out.events.push(AiEvent::HitMissed { agent: self.id });
            return;
        }

        let damage = hit_damage(combo, &attack, self.tuning.attack_damage);
        info!(agent = %self.id, %target, damage, step = attack.step, "attack hit");
        frame.out.directives.push(Directive::ApplyDamage {
            source: self.id,
            target,
            amount: damage,
        });
        frame.out.events.push(AiEvent::HitLanded {
            agent: self.id,
            target,
            damage,
            attack,
        });
    }

    /// Animation callback when an attack animation finishes. A tagged
    /// callback only counts for the step currently in flight.
    pub fn on_attack_end(&mut self, attack: Option<AttackTag>, frame: &mut Frame<'_>) {
        if self.state != EnemyState::Attack {
            debug!(agent = %self.id, state = self.state.name(), "stale attack end ignored");
            return;
        }
        if let Some(tag) = attack {
            if !self.attack.is_in_flight(&tag) {
                debug!(agent = %self.id, session = tag.session, step = tag.step, "attack end for an old clip ignored");
                return;
            }
        }
        self.attack.is_attacking = false;
        let combos = frame.combos;
        clear_triggers(self.id, &combos.all_triggers(), frame.out);

        let complete = combos
            .get(self.attack.combo)
            .map_or(true, |c| self.attack.is_complete(c));
        if complete {
            self.attack.index = 0;
            self.change_state(EnemyState::Chase, frame);
        }
    }

    // --- Directive helpers ---

    fn set_motion(&mut self, frame: &mut Frame<'_>, speed: f32, acceleration: f32, stopping: f32) {
        let agent = self.id;
        self.stopping_distance = stopping;
        frame.out.directives.extend([
            Directive::SetSpeed { agent, speed },
            Directive::SetAcceleration {
                agent,
                acceleration,
            },
            Directive::SetStoppingDistance {
                agent,
                distance: stopping,
            },
            Directive::Stop {
                agent,
                stopped: false,
            },
        ]);
    }

    fn stop(&self, frame: &mut Frame<'_>, stopped: bool) {
        frame.out.directives.push(Directive::Stop {
            agent: self.id,
            stopped,
        });
    }

    fn set_destination(&self, frame: &mut Frame<'_>, point: Vec3) {
        frame.out.directives.push(Directive::SetDestination {
            agent: self.id,
            point,
        });
    }

    fn arrived(&self, frame: &Frame<'_>) -> bool {
        frame.nav.remaining_distance <= self.stopping_distance && !frame.nav.path_pending
    }

    /// Push IsMoving / IsChasing / IsAttacking when any of them changed.
    fn update_animator(&mut self, frame: &mut Frame<'_>) {
        let mut moving = frame.nav.velocity.length() > MOVING_SPEED_THRESHOLD;
        if self.state == EnemyState::Patrol
            && frame.pose.position.distance(self.patrol.current()) <= WAYPOINT_ARRIVAL_EPSILON
        {
            moving = false;
        }
        let params = [
            moving,
            self.state == EnemyState::Chase,
            self.state == EnemyState::Attack,
        ];

        let previous = self.anim_params;
        if previous == Some(params) {
            return;
        }
        let names = [ANIM_IS_MOVING, ANIM_IS_CHASING, ANIM_IS_ATTACKING];
        for (i, (name, value)) in names.iter().zip(params).enumerate() {
            if previous.map_or(true, |p| p[i] != value) {
                frame.out.directives.push(Directive::SetBool {
                    agent: self.id,
                    name: name.to_string(),
                    value,
                });
            }
        }
        self.anim_params = Some(params);
    }
}

fn no_op(_brain: &mut EnemyBrain, _frame: &mut Frame<'_>) {}

// --- Idle ---

fn update_idle(brain: &mut EnemyBrain, frame: &mut Frame<'_>) -> Option<EnemyState> {
    if brain.can_see_player(frame) {
        return Some(EnemyState::Chase);
    }
    Some(EnemyState::Patrol)
}

// --- Patrol ---

fn enter_patrol(brain: &mut EnemyBrain, frame: &mut Frame<'_>) {
    brain.target = None;
    let t = &brain.tuning;
    let (speed, accel, stopping) = (t.patrol_speed, t.patrol_acceleration, t.patrol_stopping_distance);
    brain.set_motion(frame, speed, accel, stopping);
    brain.patrol.clear_dwell();
    brain.set_destination(frame, brain.patrol.current());
}

fn update_patrol(brain: &mut EnemyBrain, frame: &mut Frame<'_>) -> Option<EnemyState> {
    if brain.can_see_player(frame) {
        return Some(EnemyState::Chase);
    }

    if !brain.patrol.is_waiting() && brain.arrived(frame) {
        debug!(agent = %brain.id, waypoint = brain.patrol.index(), "waypoint reached, dwelling");
        brain.patrol.begin_dwell(frame.now);
        frame.out.events.push(AiEvent::WaypointReached {
            agent: brain.id,
            index: brain.patrol.index(),
        });
    }

    if brain.patrol.dwell_elapsed(frame.now, brain.tuning.waypoint_wait_secs) {
        let next = brain.patrol.advance();
        debug!(agent = %brain.id, waypoint = brain.patrol.index(), "moving to next waypoint");
        brain.set_destination(frame, next);
    }

    trace!(
        agent = %brain.id,
        waypoint = brain.patrol.index(),
        remaining = frame.nav.remaining_distance,
        waiting = brain.patrol.is_waiting(),
        "patrolling"
    );
    None
}

// --- Chase ---

fn enter_chase(brain: &mut EnemyBrain, frame: &mut Frame<'_>) {
    let reach = brain.engagement_range(frame.combos) * CHASE_STOP_RANGE_FRACTION;
    let t = &brain.tuning;
    let (speed, accel, stopping) = (t.chase_speed, t.chase_acceleration, t.chase_stopping_distance.min(reach));
    brain.set_motion(frame, speed, accel, stopping);
}

fn update_chase(brain: &mut EnemyBrain, frame: &mut Frame<'_>) -> Option<EnemyState> {
    let Some(target) = brain.target_position(frame) else {
        return Some(EnemyState::Return);
    };

    let distance = frame.pose.distance_to(target);
    if distance <= brain.engagement_range(frame.combos) {
        return Some(EnemyState::Attack);
    }
    if distance > brain.tuning.max_chase_distance {
        return Some(EnemyState::Return);
    }

    brain.set_destination(frame, target);
    None
}

// --- Attack ---

fn enter_attack(brain: &mut EnemyBrain, frame: &mut Frame<'_>) {
    brain.stop(frame, true);
    brain.attack.reset(frame.now);
    let combos = frame.combos;
    clear_triggers(brain.id, &combos.all_triggers(), frame.out);
    brain.select_combo(frame);
    brain.fire_attack(frame);
}

fn update_attack(brain: &mut EnemyBrain, frame: &mut Frame<'_>) -> Option<EnemyState> {
    let Some(target) = brain.target_position(frame) else {
        return Some(EnemyState::Return);
    };

    let to_target = target - frame.pose.position;
    if let Some(facing) = look_rotation(to_target) {
        let max_step = brain.tuning.chase_rotation_speed_deg * frame.dt;
        frame.pose.rotation = rotate_towards(frame.pose.rotation, facing, max_step);
    }

    let combos = frame.combos;
    if to_target.length() > brain.engagement_range(combos) * ATTACK_BREAK_OFF_FACTOR {
        return Some(EnemyState::Chase);
    }

    let Some(combo) = combos.get(brain.attack.combo) else {
        return Some(EnemyState::Chase);
    };
    if brain.attack.has_next(combo) {
        if brain.attack.ready_for_next(combo, frame.now) {
            brain.fire_attack(frame);
        }
    } else if brain
        .attack
        .should_reset(combo, frame.now, brain.tuning.combo_reset_secs)
    {
        brain.attack.is_attacking = false;
        brain.attack.index = 0;
        clear_triggers(brain.id, &combos.all_triggers(), frame.out);
        return Some(EnemyState::Chase);
    }
    None
}

fn exit_attack(brain: &mut EnemyBrain, frame: &mut Frame<'_>) {
    brain.attack.is_attacking = false;
    brain.stop(frame, false);
    let combos = frame.combos;
    clear_triggers(brain.id, &combos.all_triggers(), frame.out);
}

// --- Return ---

fn enter_return(brain: &mut EnemyBrain, frame: &mut Frame<'_>) {
    brain.target = None;
    let t = &brain.tuning;
    let (speed, accel, stopping) = (t.patrol_speed, t.patrol_acceleration, t.patrol_stopping_distance);
    brain.set_motion(frame, speed, accel, stopping);
    brain.set_destination(frame, brain.anchor.position);
}

fn update_return(brain: &mut EnemyBrain, frame: &mut Frame<'_>) -> Option<EnemyState> {
    if brain.can_see_player(frame) {
        return Some(EnemyState::Chase);
    }

    if brain.arrived(frame) {
        let max_step = brain.tuning.patrol_turn_speed_deg * frame.dt;
        frame.pose.rotation = rotate_towards(frame.pose.rotation, brain.anchor.rotation, max_step);
        if rotation_angle_deg(frame.pose.rotation, brain.anchor.rotation) < RETURN_ALIGN_TOLERANCE_DEG {
            return Some(EnemyState::Patrol);
        }
    }
    None
}
