//! Scripted scenarios: timed command schedules plus a stand-in for
//! animation playback, so the AI can be exercised headless.

use glam::Vec3;
use tracing::debug;

use warden_core::commands::SimCommand;
use warden_core::config::EnemyTuning;
use warden_core::enums::AnimationEvent;
use warden_core::events::AiEvent;
use warden_core::state::WorldSnapshot;
use warden_core::types::{AgentId, AttackTag, Pose};

use crate::engine::{SimConfig, SimulationEngine};

/// Strike frame offset after an attack fires (seconds).
pub const HIT_FRAME_SECS: f64 = 0.2;
/// Attack animation length (seconds).
pub const ATTACK_CLIP_SECS: f64 = 0.5;

/// A command to queue once sim time reaches `at_secs`.
#[derive(Debug, Clone)]
pub struct ScriptedCommand {
    pub at_secs: f64,
    pub command: SimCommand,
}

/// A time-ordered command schedule.
#[derive(Debug, Clone, Default)]
pub struct Script {
    commands: Vec<ScriptedCommand>,
    cursor: usize,
}

impl Script {
    pub fn new(mut commands: Vec<ScriptedCommand>) -> Self {
        // Stable, so same-time commands keep their order
        commands.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
        Self { commands, cursor: 0 }
    }

    /// Commands whose time has come, in schedule order.
    pub fn due(&mut self, now: f64) -> Vec<SimCommand> {
        let start = self.cursor;
        while self.cursor < self.commands.len() && self.commands[self.cursor].at_secs <= now {
            self.cursor += 1;
        }
        self.commands[start..self.cursor]
            .iter()
            .map(|c| c.command.clone())
            .collect()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.commands.len()
    }
}

/// Emulates attack animations: every fired attack plays a clip that calls
/// back `AttackHit` at the strike frame and `AttackEnd` when it finishes.
///
/// Clips start on `AttackFired` rather than on `SetTrigger`, since a combo
/// may name fewer triggers than it has steps. Each callback carries the
/// fired step's tag back to the brain.
#[derive(Debug, Clone, Default)]
pub struct AnimationPlayback {
    pending: Vec<(f64, AgentId, AnimationEvent, AttackTag)>,
}

impl AnimationPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start clips for every attack fired during the snapshot's tick.
    pub fn observe(&mut self, snapshot: &WorldSnapshot) {
        let now = snapshot.time.elapsed_secs;
        for event in &snapshot.events {
            if let AiEvent::AttackFired { agent, attack, .. } = event {
                debug!(%agent, session = attack.session, step = attack.step, "attack clip started");
                self.pending
                    .push((now + HIT_FRAME_SECS, *agent, AnimationEvent::AttackHit, *attack));
                self.pending
                    .push((now + ATTACK_CLIP_SECS, *agent, AnimationEvent::AttackEnd, *attack));
            }
        }
    }

    /// Callbacks that have fired by `now`, oldest first.
    pub fn due(&mut self, now: f64) -> Vec<SimCommand> {
        let (mut ready, waiting): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|(at, ..)| *at <= now);
        self.pending = waiting;
        ready.sort_by(|a, b| a.0.total_cmp(&b.0));
        ready
            .into_iter()
            .map(|(_, agent, event, attack)| SimCommand::AnimationEvent {
                agent,
                event,
                attack: Some(attack),
            })
            .collect()
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }
}

/// Drives an engine with a script and emulated animation playback.
pub struct ScenarioRunner {
    pub engine: SimulationEngine,
    pub script: Script,
    pub playback: AnimationPlayback,
    pub player: AgentId,
    pub enemies: Vec<AgentId>,
}

impl ScenarioRunner {
    /// Queue due commands and callbacks, tick once, and watch for new clips.
    pub fn step(&mut self) -> WorldSnapshot {
        let now = self.engine.time().elapsed_secs;
        self.engine.queue_commands(self.script.due(now));
        self.engine.queue_commands(self.playback.due(now));
        let snapshot = self.engine.tick();
        self.playback.observe(&snapshot);
        snapshot
    }
}

/// Two sentries guarding a courtyard; the player walks in from the south,
/// locks on, and later backs out.
pub fn courtyard_ambush(config: SimConfig) -> ScenarioRunner {
    let mut engine = SimulationEngine::new(config);

    let start = Vec3::new(0.0, 0.0, -30.0);
    let player = engine.spawn_player(start);

    let north = engine.spawn_enemy(
        Pose::from_yaw(Vec3::new(0.0, 0.0, 6.0), 180.0),
        vec![Vec3::new(0.0, 0.0, 6.0), Vec3::new(6.0, 0.0, 6.0)],
        EnemyTuning::default(),
    );
    let east = engine.spawn_enemy(
        Pose::from_yaw(Vec3::new(8.0, 0.0, 0.0), -90.0),
        Vec::new(),
        EnemyTuning {
            waypoint_wait_secs: 4.0,
            ..Default::default()
        },
    );

    let mut commands = vec![
        scripted(0.0, SimCommand::SetCameraPosition { position: camera_behind(start) }),
    ];

    // Walk north at 3 m/s until 2 m short of the north sentry's post
    let walk_speed = 3.0;
    let stop = Vec3::new(0.0, 0.0, 4.0);
    let walk_secs = f64::from(start.distance(stop) / walk_speed);
    let mut t = 0.0;
    while t < walk_secs {
        t = (t + 0.1).min(walk_secs);
        let position = start.lerp(stop, (t / walk_secs) as f32);
        commands.push(scripted(t, SimCommand::SetPlayerPosition { position }));
        commands.push(scripted(t, SimCommand::SetCameraPosition { position: camera_behind(position) }));
    }

    commands.push(scripted(walk_secs - 2.0, SimCommand::SetCombatMode { active: true }));
    commands.push(scripted(walk_secs + 6.0, SimCommand::SetCombatMode { active: false }));
    // Retreat out of reach
    let retreat = Vec3::new(0.0, 0.0, -40.0);
    commands.push(scripted(walk_secs + 6.0, SimCommand::SetPlayerPosition { position: retreat }));
    commands.push(scripted(walk_secs + 6.0, SimCommand::SetCameraPosition { position: camera_behind(retreat) }));

    ScenarioRunner {
        engine,
        script: Script::new(commands),
        playback: AnimationPlayback::new(),
        player,
        enemies: vec![north, east],
    }
}

fn scripted(at_secs: f64, command: SimCommand) -> ScriptedCommand {
    ScriptedCommand { at_secs, command }
}

/// Third-person camera: 4 m behind (south of) and 3 m above the player.
fn camera_behind(player: Vec3) -> Vec3 {
    player + Vec3::new(0.0, 3.0, -4.0)
}
