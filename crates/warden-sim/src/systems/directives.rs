//! Directive application: routes capability calls to the components that
//! implement them.
//!
//! Directives naming an unknown agent, or an agent without the matching
//! capability, are logged and skipped.

use std::collections::HashMap;

use hecs::{Entity, World};
use tracing::{info, warn};

use warden_core::components::{AnimatorState, Health, Highlight, NavAgent};
use warden_core::events::{AiEvent, Directive};
use warden_core::types::AgentId;

/// Apply `directives` in order.
pub fn apply(
    world: &mut World,
    agents: &HashMap<AgentId, Entity>,
    directives: &[Directive],
    events: &mut Vec<AiEvent>,
) {
    for directive in directives {
        let agent = subject(directive);
        let Some(&entity) = agents.get(&agent) else {
            warn!(%agent, ?directive, "directive for unknown agent dropped");
            continue;
        };

        match directive {
            Directive::SetSpeed { speed, .. } => with_nav(world, entity, agent, |nav| nav.speed = *speed),
            Directive::SetAcceleration { acceleration, .. } => {
                with_nav(world, entity, agent, |nav| nav.acceleration = *acceleration)
            }
            Directive::SetStoppingDistance { distance, .. } => {
                with_nav(world, entity, agent, |nav| nav.stopping_distance = *distance)
            }
            Directive::SetDestination { point, .. } => with_nav(world, entity, agent, |nav| {
                nav.destination = Some(*point);
                nav.path_pending = true;
            }),
            Directive::Stop { stopped, .. } => with_nav(world, entity, agent, |nav| {
                nav.stopped = *stopped;
                if *stopped {
                    nav.velocity = glam::Vec3::ZERO;
                }
            }),
            Directive::SetTrigger { name, .. } => with_animator(world, entity, agent, |anim| {
                anim.triggers.insert(name.clone());
            }),
            Directive::ResetTrigger { name, .. } => with_animator(world, entity, agent, |anim| {
                anim.triggers.remove(name);
            }),
            Directive::SetBool { name, value, .. } => with_animator(world, entity, agent, |anim| {
                anim.bools.insert(name.clone(), *value);
            }),
            Directive::ApplyDamage { amount, .. } => {
                damage(world, entity, agent, *amount, events);
            }
            Directive::Highlight { on, .. } => match world.get::<&mut Highlight>(entity) {
                Ok(mut highlight) => highlight.on = *on,
                Err(_) => warn!(%agent, "no highlighter, skipping highlight"),
            },
        }
    }
}

/// Reduce `entity`'s health by `amount`. Marks it defeated at zero and
/// halts its path follower.
pub fn damage(
    world: &mut World,
    entity: Entity,
    agent: AgentId,
    amount: f32,
    events: &mut Vec<AiEvent>,
) {
    let defeated = {
        let Ok(mut health) = world.get::<&mut Health>(entity) else {
            warn!(%agent, amount, "no damageable component, damage skipped");
            return;
        };
        if health.defeated {
            return;
        }
        health.current = (health.current - amount).max(0.0);
        info!(%agent, amount, remaining = health.current, "damage applied");
        if health.current <= 0.0 {
            health.defeated = true;
        }
        health.defeated
    };

    if defeated {
        info!(%agent, "defeated");
        events.push(AiEvent::Defeated { agent });
        if let Ok(mut nav) = world.get::<&mut NavAgent>(entity) {
            nav.stopped = true;
            nav.velocity = glam::Vec3::ZERO;
        }
    }
}

/// The agent a directive acts on.
fn subject(directive: &Directive) -> AgentId {
    match directive {
        Directive::SetSpeed { agent, .. }
        | Directive::SetAcceleration { agent, .. }
        | Directive::SetStoppingDistance { agent, .. }
        | Directive::SetDestination { agent, .. }
        | Directive::Stop { agent, .. }
        | Directive::SetTrigger { agent, .. }
        | Directive::ResetTrigger { agent, .. }
        | Directive::SetBool { agent, .. } => *agent,
        Directive::ApplyDamage { target, .. } | Directive::Highlight { target, .. } => *target,
    }
}

fn with_nav(world: &mut World, entity: Entity, agent: AgentId, f: impl FnOnce(&mut NavAgent)) {
    match world.get::<&mut NavAgent>(entity) {
        Ok(mut nav) => f(&mut *nav),
        Err(_) => warn!(%agent, "no path follower, movement directive skipped"),
    }
}

fn with_animator(world: &mut World, entity: Entity, agent: AgentId, f: impl FnOnce(&mut AnimatorState)) {
    match world.get::<&mut AnimatorState>(entity) {
        Ok(mut anim) => f(&mut *anim),
        Err(_) => warn!(%agent, "no animator, animation directive skipped"),
    }
}
