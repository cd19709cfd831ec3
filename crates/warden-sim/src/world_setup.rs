//! Entity spawn factories.
//!
//! Creates the player and enemy entities with their component bundles.
//! Registry bookkeeping (`AgentId` allocation) is the engine's job.

use glam::Vec3;
use hecs::{Entity, EntityBuilder, World};

use warden_core::components::*;
use warden_core::constants::{ENEMY_MAX_HEALTH, PLAYER_MAX_HEALTH};
use warden_core::types::{AgentId, Pose};

use warden_ai::fsm::EnemyBrain;

/// Spawn the player character at `position`, facing +Z.
pub fn spawn_player(world: &mut World, id: AgentId, position: Vec3) -> Entity {
    world.spawn((
        Player,
        id,
        Pose::new(position, glam::Quat::IDENTITY),
        full_health(PLAYER_MAX_HEALTH),
    ))
}

/// Spawn an enemy with the reference capabilities attached. Without
/// `damageable` the enemy has no `Health` and hits against it are skipped.
pub fn spawn_enemy(world: &mut World, brain: EnemyBrain, damageable: bool) -> Entity {
    let mut builder = EntityBuilder::new();
    builder
        .add(Enemy)
        .add(brain.id())
        .add(*brain.anchor())
        .add(NavAgent::default())
        .add(AnimatorState::default())
        .add(Highlight::default());
    if damageable {
        builder.add(full_health(ENEMY_MAX_HEALTH));
    }
    builder.add(brain);
    world.spawn(builder.build())
}

fn full_health(max: f32) -> Health {
    Health {
        max,
        current: max,
        defeated: false,
    }
}
