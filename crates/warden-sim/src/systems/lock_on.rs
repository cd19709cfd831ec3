//! Lock-on system: picks the enemy nearest the camera sightline while the
//! player is in combat mode.

use glam::Vec3;
use hecs::World;

use warden_core::components::{Enemy, Health};
use warden_core::types::{AgentId, Pose};

use warden_ai::fsm::{Outbox, Sighting};
use warden_ai::lock_on::{select_target, sightline, Candidate, LockOnController};

use crate::systems::enemy_ai::find_player;

/// Re-select the lock-on target. Does nothing outside combat mode.
pub fn run(world: &World, controller: &mut LockOnController, camera: Vec3, radius: f32, out: &mut Outbox) {
    if !controller.combat_mode() {
        return;
    }
    let selection = find_player(world).and_then(|player| select(world, player, camera, radius));
    controller.update(selection, out);
}

fn select(world: &World, player: Sighting, camera: Vec3, radius: f32) -> Option<AgentId> {
    let line = sightline(camera, player.position)?;
    let mut query = world.query::<(&Enemy, &AgentId, &Pose, Option<&Health>)>();
    let candidates = query
        .iter()
        .filter(|(_, (_, _, _, health))| !health.is_some_and(|h| h.defeated))
        .map(|(_, (_, id, pose, _))| Candidate {
            id: *id,
            position: pose.position,
        });
    select_target(player.position, line, radius, candidates)
}
