//! Reference path follower.
//!
//! Moves agents in a straight line toward their destination with bounded
//! acceleration, brakes so they settle at the stopping distance, and turns
//! them toward their direction of travel.

use glam::Vec3;
use hecs::World;

use warden_core::components::NavAgent;
use warden_core::constants::MOVING_SPEED_THRESHOLD;
use warden_core::types::Pose;

use warden_ai::fsm::NavFeedback;
use warden_ai::geometry::{flatten, look_rotation, rotate_towards};

/// Integrate every `NavAgent` by `dt` seconds.
pub fn run(world: &mut World, dt: f32) {
    for (_entity, (pose, nav)) in world.query_mut::<(&mut Pose, &mut NavAgent)>() {
        step(pose, nav, dt);
    }
}

fn step(pose: &mut Pose, nav: &mut NavAgent, dt: f32) {
    nav.path_pending = false;

    let desired = match nav.destination {
        Some(destination) if !nav.stopped => {
            let to_dest = destination - pose.position;
            let distance = to_dest.length();
            // Slow down so the agent can stop at the stopping distance
            let braking = (2.0 * nav.acceleration * (distance - nav.stopping_distance).max(0.0)).sqrt();
            to_dest.normalize_or_zero() * nav.speed.min(braking)
        }
        _ => Vec3::ZERO,
    };

    nav.velocity = move_towards(nav.velocity, desired, nav.acceleration * dt);
    if nav.stopped {
        nav.velocity = Vec3::ZERO;
    }

    let travel = nav.velocity * dt;
    match nav.destination {
        // Never step past the destination
        Some(destination) if travel.length() >= pose.position.distance(destination) => {
            pose.position = destination;
            nav.velocity = Vec3::ZERO;
        }
        _ => pose.position += travel,
    }

    let heading = flatten(nav.velocity);
    if heading.length() > MOVING_SPEED_THRESHOLD {
        if let Some(facing) = look_rotation(heading) {
            pose.rotation = rotate_towards(pose.rotation, facing, nav.angular_speed_deg * dt);
        }
    }
}

fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let len = delta.length();
    if len <= max_delta || len < 1e-6 {
        target
    } else {
        current + delta / len * max_delta
    }
}

/// What the path follower reports back to the brain.
pub fn feedback(pose: &Pose, nav: &NavAgent) -> NavFeedback {
    NavFeedback {
        remaining_distance: nav
            .destination
            .map_or(0.0, |destination| pose.position.distance(destination)),
        path_pending: nav.path_pending,
        velocity: nav.velocity,
    }
}
