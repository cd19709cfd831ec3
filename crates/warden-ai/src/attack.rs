//! Attack sequencing within a combo.
//!
//! An `AttackSession` tracks one run through a combo: which step is next,
//! whether a step's animation is still in flight, and when the last step
//! fired. At most one attack is in flight at a time.
//!
//! Every fired step is stamped with an `AttackTag`. The session generation
//! changes on each reset, so animation callbacks from an earlier session
//! can be told apart from the current one.

use std::collections::BTreeSet;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use warden_core::constants::{ATTACK_BREAK_OFF_FACTOR, ATTACK_FACING_DOT};
use warden_core::events::{AiEvent, Directive};
use warden_core::types::{AgentId, AttackTag, Pose};

use crate::combos::ComboDefinition;
use crate::fsm::Outbox;

/// Progress through the current combo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackSession {
    /// Index into the combo table.
    pub combo: usize,
    /// Next step to fire (0-based). Incremented when a step fires.
    pub index: usize,
    /// True from a step firing until its animation ends.
    pub is_attacking: bool,
    /// Sim time of the last fired step (seconds).
    pub last_attack_time: f64,
    /// Bumped by every reset.
    pub generation: u32,
    /// Tag of the most recently fired step in this session.
    pub last_fired: Option<AttackTag>,
}

impl AttackSession {
    /// Start a new session at step 0 with nothing in flight.
    pub fn reset(&mut self, now: f64) {
        self.is_attacking = false;
        self.index = 0;
        self.last_attack_time = now;
        self.generation = self.generation.wrapping_add(1);
        self.last_fired = None;
    }

    /// Fire the next step of `combo`.
    ///
    /// Rejected (returns false, state untouched) while an attack is in flight.
    pub fn fire(
        &mut self,
        agent: AgentId,
        combo: &ComboDefinition,
        triggers: &BTreeSet<&str>,
        now: f64,
        out: &mut Outbox,
    ) -> bool {
        if self.is_attacking {
            warn!(%agent, index = self.index, "attack requested while one is in flight, ignoring");
            out.events.push(AiEvent::AttackRejected { agent });
            return false;
        }

        let tag = AttackTag {
            session: self.generation,
            combo: self.combo,
            step: self.index,
        };
        self.is_attacking = true;
        self.last_attack_time = now;
        self.last_fired = Some(tag);

        clear_triggers(agent, triggers, out);
        let trigger = combo.trigger(self.index).map(str::to_string);
        if let Some(name) = &trigger {
            out.directives.push(Directive::SetTrigger {
                agent,
                name: name.clone(),
            });
        }

        debug!(
            %agent,
            combo = %combo.name,
            step = self.index + 1,
            of = combo.len(),
            trigger = trigger.as_deref().unwrap_or("-"),
            "attack fired"
        );
        out.events.push(AiEvent::AttackFired {
            agent,
            attack: tag,
            trigger,
        });

        self.index += 1;
        true
    }

    /// Whether the next step may fire now.
    pub fn ready_for_next(&self, combo: &ComboDefinition, now: f64) -> bool {
        if self.is_attacking {
            return false;
        }
        match combo.delay(self.index) {
            Some(delay) => now - self.last_attack_time >= delay,
            None => false,
        }
    }

    /// Whether a step is still available in `combo` (ignores timing).
    pub fn has_next(&self, combo: &ComboDefinition) -> bool {
        !self.is_attacking && self.index < combo.len()
    }

    pub fn is_complete(&self, combo: &ComboDefinition) -> bool {
        self.index >= combo.len()
    }

    /// Combo timed out or ran out of steps.
    pub fn should_reset(&self, combo: &ComboDefinition, now: f64, reset_secs: f64) -> bool {
        now >= self.last_attack_time + reset_secs || self.is_complete(combo)
    }

    /// Whether `tag` names the step currently in flight.
    pub fn is_in_flight(&self, tag: &AttackTag) -> bool {
        self.is_attacking && self.last_fired.as_ref() == Some(tag)
    }
}

/// Damage of the tagged step, or `fallback` when the combo has no entry for it.
pub fn hit_damage(combo: Option<&ComboDefinition>, tag: &AttackTag, fallback: f32) -> f32 {
    combo.and_then(|c| c.damage(tag.step)).unwrap_or(fallback)
}

/// A hit connects when the target is in front and within reach.
pub fn hit_connects(attacker: &Pose, target: Vec3, range: f32) -> bool {
    let to_target = target - attacker.position;
    let facing = attacker.forward().dot(to_target.normalize_or_zero());
    facing > ATTACK_FACING_DOT && to_target.length() <= range * ATTACK_BREAK_OFF_FACTOR
}

/// Reset every known trigger on the agent's animator.
pub fn clear_triggers(agent: AgentId, triggers: &BTreeSet<&str>, out: &mut Outbox) {
    out.directives
        .extend(triggers.iter().map(|name| Directive::ResetTrigger {
            agent,
            name: name.to_string(),
        }));
}
