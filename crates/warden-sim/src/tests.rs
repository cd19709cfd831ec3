//! Tests for the simulation engine, command handling and end-to-end AI flows.

use glam::Vec3;

use warden_core::commands::SimCommand;
use warden_core::components::{AnimatorState, NavAgent};
use warden_core::config::EnemyTuning;
use warden_core::constants::*;
use warden_core::enums::{AnimationEvent, EnemyState};
use warden_core::events::{AiEvent, Directive};
use warden_core::state::WorldSnapshot;
use warden_core::types::{AgentId, AttackTag, Pose};

use crate::engine::{SimConfig, SimulationEngine};
use crate::scenario::{courtyard_ambush, AnimationPlayback, Script, ScriptedCommand};

fn engine_with_seed(seed: u64) -> SimulationEngine {
    SimulationEngine::new(SimConfig {
        seed,
        ..Default::default()
    })
}

/// Enemy at the origin facing +Z, player out of sight to the north.
fn sentry_setup() -> (SimulationEngine, AgentId, AgentId) {
    let mut engine = engine_with_seed(7);
    let player = engine.spawn_player(Vec3::new(0.0, 0.0, 30.0));
    let enemy = engine.spawn_enemy(Pose::default(), Vec::new(), EnemyTuning::default());
    (engine, player, enemy)
}

fn state_changes(snapshot: &WorldSnapshot, agent: AgentId) -> Vec<(EnemyState, EnemyState)> {
    snapshot
        .events
        .iter()
        .filter_map(|e| match e {
            AiEvent::StateChanged { agent: a, from, to } if *a == agent => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

/// Steps fired by `agent` during one attack session.
fn fired_steps(snapshot: &WorldSnapshot, agent: AgentId, session: u32) -> Vec<usize> {
    snapshot
        .events
        .iter()
        .filter_map(|e| match e {
            AiEvent::AttackFired { agent: a, attack, .. } if *a == agent && attack.session == session => {
                Some(attack.step)
            }
            _ => None,
        })
        .collect()
}

/// Tick until `agent` is in `state`, returning the snapshot of that tick.
fn tick_until(engine: &mut SimulationEngine, agent: AgentId, state: EnemyState, max_ticks: usize) -> WorldSnapshot {
    for _ in 0..max_ticks {
        let snapshot = engine.tick();
        if engine.enemy_state(agent) == Some(state) {
            return snapshot;
        }
    }
    panic!("{agent} never reached {state:?} within {max_ticks} ticks");
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut run_a = courtyard_ambush(SimConfig {
        seed: 12345,
        ..Default::default()
    });
    let mut run_b = courtyard_ambush(SimConfig {
        seed: 12345,
        ..Default::default()
    });

    for _ in 0..1200 {
        let json_a = serde_json::to_string(&run_a.step()).unwrap();
        let json_b = serde_json::to_string(&run_b.step()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_seed_drives_combo_choice() {
    let first_combo = |seed: u64| {
        let mut run = courtyard_ambush(SimConfig {
            seed,
            ..Default::default()
        });
        for _ in 0..1200 {
            let snapshot = run.step();
            let picked = snapshot.events.iter().find_map(|e| match e {
                AiEvent::ComboSelected { combo, .. } => Some(*combo),
                _ => None,
            });
            if let Some(combo) = picked {
                return combo;
            }
        }
        panic!("no combo selected with seed {seed}");
    };

    let picks: Vec<usize> = (1..=8).map(first_combo).collect();
    assert!(picks.iter().all(|&c| c != 0), "initial combo is excluded: {picks:?}");
    assert!(picks.windows(2).any(|w| w[0] != w[1]), "seeds should vary the pick: {picks:?}");
}

// ---- Spawning ----

#[test]
fn test_spawned_enemy_starts_patrolling() {
    let (mut engine, _player, enemy) = sentry_setup();
    assert_eq!(engine.enemy_state(enemy), Some(EnemyState::Patrol));

    let entity = engine.entity(enemy).unwrap();
    let nav: NavAgent = (*engine.world().get::<&NavAgent>(entity).unwrap()).clone();
    assert_eq!(nav.speed, PATROL_SPEED);
    assert_eq!(nav.destination, Some(Vec3::ZERO));
    assert!(nav.path_pending);

    // Spawn directives land in the first snapshot
    let snapshot = engine.tick();
    assert_eq!(state_changes(&snapshot, enemy), vec![(EnemyState::Idle, EnemyState::Patrol)]);
    assert_eq!(snapshot.enemies.len(), 1);
    assert_eq!(snapshot.enemies[0].health, ENEMY_MAX_HEALTH);
}

#[test]
fn test_agent_ids_are_unique() {
    let mut engine = engine_with_seed(1);
    let player = engine.spawn_player(Vec3::ZERO);
    let a = engine.spawn_enemy(Pose::default(), Vec::new(), EnemyTuning::default());
    let b = engine.spawn_enemy(Pose::default(), Vec::new(), EnemyTuning::default());
    assert_ne!(player, a);
    assert_ne!(a, b);
    assert_eq!(engine.enemy_state(player), None, "the player has no brain");
}

// ---- End-to-end AI ----

#[test]
fn test_patrol_to_chase_within_one_tick() {
    let (mut engine, player, enemy) = sentry_setup();
    for _ in 0..10 {
        engine.tick();
    }
    assert_eq!(engine.enemy_state(enemy), Some(EnemyState::Patrol));

    engine.queue_command(SimCommand::SetPlayerPosition {
        position: Vec3::new(0.0, 0.0, 10.0),
    });
    let snapshot = engine.tick();
    assert_eq!(state_changes(&snapshot, enemy), vec![(EnemyState::Patrol, EnemyState::Chase)]);
    assert_eq!(snapshot.enemies[0].target, Some(player));
}

#[test]
fn test_chase_closes_and_fires_first_attack() {
    let (mut engine, player, enemy) = sentry_setup();
    engine.queue_command(SimCommand::SetPlayerPosition {
        position: Vec3::new(0.0, 0.0, 10.0),
    });
    engine.tick();
    assert_eq!(engine.enemy_state(enemy), Some(EnemyState::Chase));

    let snapshot = tick_until(&mut engine, enemy, EnemyState::Attack, 600);
    let fired: Vec<usize> = snapshot
        .events
        .iter()
        .filter_map(|e| match e {
            AiEvent::AttackFired { agent, attack, .. } if *agent == enemy => Some(attack.step),
            _ => None,
        })
        .collect();
    assert_eq!(fired, vec![0]);

    let view = &snapshot.enemies[0];
    assert!(view.is_attacking);
    assert_eq!(view.attack_index, 1);
    assert_eq!(view.target, Some(player));
    let range = engine.engagement_range(enemy).unwrap();
    assert!(view.position.distance(Vec3::new(0.0, 0.0, 10.0)) <= range * ATTACK_BREAK_OFF_FACTOR);

    let entity = engine.entity(enemy).unwrap();
    let anim: AnimatorState = (*engine.world().get::<&AnimatorState>(entity).unwrap()).clone();
    assert_eq!(anim.triggers.len(), 1, "exactly the first attack trigger is live");
    assert_eq!(anim.bools.get(ANIM_IS_ATTACKING), Some(&true));
}

#[test]
fn test_full_combo_with_playback_lands_every_step() {
    let (mut engine, player, enemy) = sentry_setup();
    engine.queue_command(SimCommand::SetPlayerPosition {
        position: Vec3::new(0.0, 0.0, 10.0),
    });
    let entry = tick_until(&mut engine, enemy, EnemyState::Attack, 600);
    let session = engine.brain(enemy).unwrap().session().clone();
    let combo = engine.combos().combos[session.combo].clone();

    let mut playback = AnimationPlayback::new();
    playback.observe(&entry);
    let mut fired = fired_steps(&entry, enemy, session.generation);
    let mut hits: Vec<(usize, f32)> = Vec::new();
    let mut left_attack = false;

    for _ in 0..600 {
        engine.queue_commands(playback.due(engine.time().elapsed_secs));
        let snapshot = engine.tick();
        playback.observe(&snapshot);
        fired.extend(fired_steps(&snapshot, enemy, session.generation));
        for event in &snapshot.events {
            if let AiEvent::HitLanded {
                agent,
                target,
                damage,
                attack,
            } = event
            {
                if *agent == enemy && attack.session == session.generation {
                    assert_eq!(*target, player);
                    hits.push((attack.step, *damage));
                }
            }
        }
        left_attack |= state_changes(&snapshot, enemy).contains(&(EnemyState::Attack, EnemyState::Chase));
        if left_attack && hits.len() == combo.len() {
            break;
        }
    }

    assert!(left_attack, "combo should finish and hand back to Chase");
    assert_eq!(fired, (0..combo.len()).collect::<Vec<_>>());
    // One hit per step at that step's damage, the finisher included
    let expected: Vec<(usize, f32)> = combo.damages.iter().copied().enumerate().collect();
    assert_eq!(hits, expected, "{}", combo.name);

    let total: f32 = combo.damages.iter().sum();
    let player_view = engine.tick().player.unwrap();
    assert!(player_view.health <= PLAYER_MAX_HEALTH - total + 1e-3);
}

#[test]
fn test_old_attack_end_after_reentry_is_ignored() {
    let (mut engine, _player, enemy) = sentry_setup();
    engine.queue_command(SimCommand::SetPlayerPosition {
        position: Vec3::new(0.0, 0.0, 10.0),
    });
    let entry = tick_until(&mut engine, enemy, EnemyState::Attack, 600);
    let old = entry
        .events
        .iter()
        .find_map(|e| match e {
            AiEvent::AttackFired { agent, attack, .. } if *agent == enemy => Some(*attack),
            _ => None,
        })
        .unwrap();

    // No clip ever ends, so the session times out and the enemy re-engages
    tick_until(&mut engine, enemy, EnemyState::Chase, 600);
    tick_until(&mut engine, enemy, EnemyState::Attack, 10);
    let fresh = engine.brain(enemy).unwrap().session().clone();
    assert!(fresh.is_attacking);
    assert_ne!(fresh.generation, old.session);

    engine.queue_command(SimCommand::AnimationEvent {
        agent: enemy,
        event: AnimationEvent::AttackEnd,
        attack: Some(old),
    });
    engine.tick();
    let session = engine.brain(enemy).unwrap().session().clone();
    assert_eq!(engine.enemy_state(enemy), Some(EnemyState::Attack));
    assert!(session.is_attacking, "the new step is still in flight");
    assert_eq!(session.index, 1);

    engine.queue_command(SimCommand::AnimationEvent {
        agent: enemy,
        event: AnimationEvent::AttackEnd,
        attack: session.last_fired,
    });
    engine.tick();
    assert!(!engine.brain(enemy).unwrap().session().is_attacking);
}

#[test]
fn test_defeated_player_sends_enemy_home() {
    let (mut engine, player, enemy) = sentry_setup();
    engine.queue_command(SimCommand::SetPlayerPosition {
        position: Vec3::new(0.0, 0.0, 10.0),
    });
    engine.tick();
    assert_eq!(engine.enemy_state(enemy), Some(EnemyState::Chase));

    engine.queue_command(SimCommand::DamageAgent {
        agent: player,
        amount: PLAYER_MAX_HEALTH + 1.0,
    });
    let snapshot = engine.tick();
    assert!(snapshot.events.contains(&AiEvent::Defeated { agent: player }));
    assert!(snapshot.player.unwrap().defeated);
    assert_eq!(engine.enemy_state(enemy), Some(EnemyState::Return));
    assert_eq!(engine.brain(enemy).unwrap().target(), None);
}

#[test]
fn test_return_home_then_patrol() {
    let (mut engine, _player, enemy) = sentry_setup();
    engine.queue_command(SimCommand::SetPlayerPosition {
        position: Vec3::new(0.0, 0.0, 10.0),
    });
    for _ in 0..30 {
        engine.tick();
    }
    assert_eq!(engine.enemy_state(enemy), Some(EnemyState::Chase));

    // Far outside the chase leash
    engine.queue_command(SimCommand::SetPlayerPosition {
        position: Vec3::new(0.0, 0.0, 40.0),
    });
    engine.tick();
    assert_eq!(engine.enemy_state(enemy), Some(EnemyState::Return));

    tick_until(&mut engine, enemy, EnemyState::Patrol, 1200);
    let view = &engine.tick().enemies[0];
    assert!(view.position.length() <= PATROL_STOPPING_DISTANCE + 0.05, "{}", view.position);
    assert!(view.yaw_degrees.abs() < RETURN_ALIGN_TOLERANCE_DEG + 0.5);
}

// ---- Animation callbacks ----

#[test]
fn test_stale_animation_callbacks_ignored() {
    let (mut engine, _player, enemy) = sentry_setup();
    engine.tick();
    let before = engine.brain(enemy).unwrap().session().clone();

    engine.queue_commands([
        SimCommand::AnimationEvent {
            agent: enemy,
            event: AnimationEvent::AttackHit,
            attack: None,
        },
        SimCommand::AnimationEvent {
            agent: enemy,
            event: AnimationEvent::AttackEnd,
            attack: None,
        },
    ]);
    let snapshot = engine.tick();
    assert_eq!(engine.enemy_state(enemy), Some(EnemyState::Patrol));
    assert_eq!(engine.brain(enemy).unwrap().session(), &before);
    assert!(!snapshot
        .directives
        .iter()
        .any(|d| matches!(d, Directive::ApplyDamage { .. } | Directive::ResetTrigger { .. })));
}

#[test]
fn test_commands_for_unknown_agents_are_dropped() {
    let (mut engine, player, enemy) = sentry_setup();
    engine.queue_commands([
        SimCommand::AnimationEvent {
            agent: AgentId(999),
            event: AnimationEvent::AttackEnd,
            attack: None,
        },
        // The player has no brain
        SimCommand::AnimationEvent {
            agent: player,
            event: AnimationEvent::AttackHit,
            attack: None,
        },
        SimCommand::DamageAgent {
            agent: AgentId(999),
            amount: 5.0,
        },
    ]);
    let snapshot = engine.tick();
    assert_eq!(engine.enemy_state(enemy), Some(EnemyState::Patrol));
    assert!(!snapshot.events.iter().any(|e| matches!(e, AiEvent::Defeated { .. })));
}

// ---- Damage ----

#[test]
fn test_missing_health_does_not_panic() {
    let mut engine = engine_with_seed(3);
    engine.spawn_player(Vec3::new(0.0, 0.0, 30.0));
    let enemy = engine.spawn_invulnerable_enemy(Pose::default(), Vec::new(), EnemyTuning::default());

    engine.queue_command(SimCommand::DamageAgent {
        agent: enemy,
        amount: 1_000.0,
    });
    let snapshot = engine.tick();
    assert!(!snapshot.events.iter().any(|e| matches!(e, AiEvent::Defeated { .. })));
    assert_eq!(engine.enemy_state(enemy), Some(EnemyState::Patrol));
}

#[test]
fn test_defeated_enemy_is_inert() {
    let (mut engine, _player, enemy) = sentry_setup();
    engine.queue_command(SimCommand::DamageAgent {
        agent: enemy,
        amount: ENEMY_MAX_HEALTH,
    });
    let snapshot = engine.tick();
    assert!(snapshot.events.contains(&AiEvent::Defeated { agent: enemy }));

    // The player walks right up; a defeated enemy never reacts
    engine.queue_command(SimCommand::SetPlayerPosition {
        position: Vec3::new(0.0, 0.0, 3.0),
    });
    for _ in 0..30 {
        engine.tick();
    }
    assert_eq!(engine.enemy_state(enemy), Some(EnemyState::Patrol));
}

// ---- Lock-on ----

#[test]
fn test_lock_on_follows_camera_sightline() {
    let mut engine = engine_with_seed(5);
    engine.spawn_player(Vec3::ZERO);
    // Both enemies face away from the player so they stay on patrol
    let ahead = engine.spawn_enemy(Pose::from_yaw(Vec3::new(0.0, 0.0, 10.0), 0.0), Vec::new(), EnemyTuning::default());
    let right = engine.spawn_enemy(Pose::from_yaw(Vec3::new(5.0, 0.0, 0.0), 90.0), Vec::new(), EnemyTuning::default());

    engine.queue_commands([
        SimCommand::SetCameraPosition {
            position: Vec3::new(0.0, 3.0, -4.0),
        },
        SimCommand::SetCombatMode { active: true },
    ]);
    let snapshot = engine.tick();
    assert_eq!(snapshot.lock_on.target, Some(ahead));
    let highlighted: Vec<AgentId> = snapshot.enemies.iter().filter(|e| e.highlighted).map(|e| e.id).collect();
    assert_eq!(highlighted, vec![ahead]);

    // Highlight is re-issued every tick while locked on
    let snapshot = engine.tick();
    assert!(snapshot.directives.contains(&Directive::Highlight { target: ahead, on: true }));

    engine.queue_command(SimCommand::SetCameraPosition {
        position: Vec3::new(-4.0, 3.0, 0.0),
    });
    let snapshot = engine.tick();
    assert_eq!(snapshot.lock_on.target, Some(right));
    assert!(snapshot.events.contains(&AiEvent::LockOnChanged { target: Some(right) }));
    let highlighted: Vec<AgentId> = snapshot.enemies.iter().filter(|e| e.highlighted).map(|e| e.id).collect();
    assert_eq!(highlighted, vec![right]);

    engine.queue_command(SimCommand::SetCombatMode { active: false });
    let snapshot = engine.tick();
    assert_eq!(snapshot.lock_on.target, None);
    assert!(!snapshot.lock_on.combat_mode);
    assert!(snapshot.enemies.iter().all(|e| !e.highlighted));
    assert_eq!(engine.enemy_state(ahead), Some(EnemyState::Patrol));
    assert_eq!(engine.enemy_state(right), Some(EnemyState::Patrol));
}

#[test]
fn test_lock_on_ignores_enemies_out_of_radius() {
    let mut engine = engine_with_seed(5);
    engine.spawn_player(Vec3::ZERO);
    engine.spawn_enemy(
        Pose::from_yaw(Vec3::new(0.0, 0.0, LOCK_ON_SEARCH_RADIUS + 5.0), 0.0),
        Vec::new(),
        EnemyTuning::default(),
    );
    engine.queue_commands([
        SimCommand::SetCameraPosition {
            position: Vec3::new(0.0, 3.0, -4.0),
        },
        SimCommand::SetCombatMode { active: true },
    ]);
    let snapshot = engine.tick();
    assert!(snapshot.lock_on.combat_mode);
    assert_eq!(snapshot.lock_on.target, None);
}

// ---- Scenario ----

#[test]
fn test_script_releases_commands_in_time_order() {
    let mut script = Script::new(vec![
        ScriptedCommand {
            at_secs: 2.0,
            command: SimCommand::SetCombatMode { active: false },
        },
        ScriptedCommand {
            at_secs: 1.0,
            command: SimCommand::SetCombatMode { active: true },
        },
    ]);
    assert!(script.due(0.5).is_empty());
    assert_eq!(script.due(1.0).len(), 1);
    assert!(!script.is_finished());
    assert_eq!(script.due(10.0).len(), 1);
    assert!(script.is_finished());
}

#[test]
fn test_playback_schedules_hit_then_end() {
    let mut playback = AnimationPlayback::new();
    let agent = AgentId(3);
    let tag = AttackTag {
        session: 1,
        combo: 0,
        step: 0,
    };
    playback.observe(&WorldSnapshot {
        events: vec![AiEvent::AttackFired {
            agent,
            attack: tag,
            trigger: Some("QuickJab1".to_string()),
        }],
        ..Default::default()
    });
    assert_eq!(playback.in_flight(), 2);
    assert!(playback.due(0.1).is_empty());

    // Both callbacks echo the fired step's tag
    let hit = playback.due(0.2);
    assert!(matches!(
        hit.as_slice(),
        [SimCommand::AnimationEvent {
            event: AnimationEvent::AttackHit,
            attack: Some(t),
            ..
        }] if *t == tag
    ));
    let end = playback.due(0.6);
    assert!(matches!(
        end.as_slice(),
        [SimCommand::AnimationEvent {
            event: AnimationEvent::AttackEnd,
            attack: Some(t),
            ..
        }] if *t == tag
    ));
    assert_eq!(playback.in_flight(), 0);
}

#[test]
fn test_courtyard_ambush_engages() {
    let mut run = courtyard_ambush(SimConfig::default());
    let mut attacked = false;
    let mut locked = false;
    for _ in 0..(TICK_RATE as usize * 20) {
        let snapshot = run.step();
        attacked |= snapshot.events.iter().any(|e| matches!(e, AiEvent::AttackFired { .. }));
        locked |= snapshot.lock_on.target.is_some();
    }
    assert!(attacked, "sentries should reach the player");
    assert!(locked, "combat mode should lock on to a sentry");
    assert!(run.script.is_finished());
}
