//! Snapshot system: queries the ECS world and builds a complete WorldSnapshot.
//!
//! This system is read-only; it never modifies the world.

use hecs::World;

use warden_core::components::*;
use warden_core::state::*;
use warden_core::types::{AgentId, Pose, SimTime};

use warden_ai::combos::ComboTable;
use warden_ai::fsm::{EnemyBrain, Outbox};
use warden_ai::lock_on::LockOnController;

/// Build a complete WorldSnapshot, draining this tick's outbox into it.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    combos: &ComboTable,
    lock_on: &LockOnController,
    outbox: Outbox,
) -> WorldSnapshot {
    WorldSnapshot {
        time: *time,
        enemies: build_enemies(world, combos),
        player: build_player(world),
        lock_on: LockOnView {
            combat_mode: lock_on.combat_mode(),
            target: lock_on.target(),
        },
        directives: outbox.directives,
        events: outbox.events,
    }
}

/// Build EnemyView list, ordered by agent id.
fn build_enemies(world: &World, combos: &ComboTable) -> Vec<EnemyView> {
    let mut enemies: Vec<EnemyView> = world
        .query::<(&EnemyBrain, &Pose, Option<&Health>, Option<&Highlight>)>()
        .iter()
        .map(|(_, (brain, pose, health, highlight))| {
            let session = brain.session();
            EnemyView {
                id: brain.id(),
                state: brain.state(),
                previous_state: brain.previous_state(),
                position: pose.position,
                yaw_degrees: pose.yaw_degrees(),
                target: brain.target(),
                combo: combos
                    .get(session.combo)
                    .map(|c| c.name.clone())
                    .unwrap_or_default(),
                attack_index: session.index,
                is_attacking: session.is_attacking,
                waypoint_index: brain.patrol().index(),
                engagement_range: brain.engagement_range(combos),
                health: health.map_or(0.0, |h| h.current),
                highlighted: highlight.is_some_and(|h| h.on),
            }
        })
        .collect();

    enemies.sort_by_key(|e| e.id);
    enemies
}

/// Build PlayerView from the first Player entity.
fn build_player(world: &World) -> Option<PlayerView> {
    world
        .query::<(&Player, &AgentId, &Pose, Option<&Health>)>()
        .iter()
        .next()
        .map(|(_, (_, id, pose, health))| PlayerView {
            id: *id,
            position: pose.position,
            health: health.map_or(0.0, |h| h.current),
            defeated: health.is_some_and(|h| h.defeated),
        })
}
