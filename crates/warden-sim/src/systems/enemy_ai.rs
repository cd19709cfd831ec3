//! Enemy AI system: ticks every live enemy's brain and delivers animation
//! callbacks.
//!
//! The brain borrows its own pose mutably for the duration of the call and
//! reads the path follower through `NavFeedback`. Everything it wants done
//! lands in the shared outbox.

use hecs::{Entity, World};
use rand::RngCore;
use tracing::{trace, warn};

use warden_core::components::{Health, NavAgent, Player};
use warden_core::enums::AnimationEvent;
use warden_core::types::{AgentId, AttackTag, Pose};

use warden_ai::combos::ComboTable;
use warden_ai::fsm::{EnemyBrain, Frame, Outbox, Sighting};

use crate::systems::navigation;

/// Per-tick inputs shared by every brain.
pub struct AiContext<'a> {
    pub now: f64,
    pub dt: f32,
    pub combos: &'a ComboTable,
    pub rng: &'a mut dyn RngCore,
    pub out: &'a mut Outbox,
}

/// The first live player, if any. A defeated player is not observable.
pub fn find_player(world: &World) -> Option<Sighting> {
    world
        .query::<(&Player, &AgentId, &Pose, Option<&Health>)>()
        .iter()
        .find(|(_, (_, _, _, health))| !health.is_some_and(|h| h.defeated))
        .map(|(_, (_, id, pose, _))| Sighting {
            id: *id,
            position: pose.position,
        })
}

/// Tick every enemy brain once.
pub fn run(world: &mut World, ctx: AiContext<'_>) {
    let player = find_player(world);

    for (_entity, (brain, pose, nav, health)) in
        world.query_mut::<(&mut EnemyBrain, &mut Pose, &NavAgent, Option<&Health>)>()
    {
        if health.is_some_and(|h| h.defeated) {
            continue;
        }
        let mut frame = Frame {
            now: ctx.now,
            dt: ctx.dt,
            nav: navigation::feedback(pose, nav),
            pose,
            player,
            combos: ctx.combos,
            rng: &mut *ctx.rng,
            out: &mut *ctx.out,
        };
        brain.tick(&mut frame);
        trace!(agent = %brain.id(), state = brain.state().name(), "enemy ticked");
    }
}

/// Move a freshly spawned brain out of Idle.
pub fn initialize(world: &mut World, entity: Entity, ctx: AiContext<'_>) {
    let player = find_player(world);
    let Ok((brain, pose, nav)) = world.query_one_mut::<(&mut EnemyBrain, &mut Pose, &NavAgent)>(entity)
    else {
        warn!(?entity, "initialize on an entity without a brain");
        return;
    };
    let mut frame = Frame {
        now: ctx.now,
        dt: ctx.dt,
        nav: navigation::feedback(pose, nav),
        pose,
        player,
        combos: ctx.combos,
        rng: ctx.rng,
        out: ctx.out,
    };
    brain.initialize(&mut frame);
}

/// Deliver an animation keyframe callback to one enemy. `attack` names the
/// fired step whose clip raised it, when playback knows it.
pub fn deliver_animation_event(
    world: &mut World,
    entity: Entity,
    event: AnimationEvent,
    attack: Option<AttackTag>,
    ctx: AiContext<'_>,
) {
    let player = find_player(world);
    let Ok((brain, pose, nav, health)) =
        world.query_one_mut::<(&mut EnemyBrain, &mut Pose, &NavAgent, Option<&Health>)>(entity)
    else {
        warn!(?entity, ?event, "animation event for an entity without a brain dropped");
        return;
    };
    if health.is_some_and(|h| h.defeated) {
        return;
    }
    let mut frame = Frame {
        now: ctx.now,
        dt: ctx.dt,
        nav: navigation::feedback(pose, nav),
        pose,
        player,
        combos: ctx.combos,
        rng: ctx.rng,
        out: ctx.out,
    };
    match event {
        AnimationEvent::AttackHit => brain.on_attack_hit(attack, &mut frame),
        AnimationEvent::AttackEnd => brain.on_attack_end(attack, &mut frame),
    }
}
