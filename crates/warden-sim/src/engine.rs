//! Simulation engine.
//!
//! `SimulationEngine` owns the hecs ECS world and the agent registry,
//! processes queued commands, runs all systems, and produces
//! `WorldSnapshot`s. Completely headless, so runs are deterministic and
//! testable.

use std::collections::{HashMap, VecDeque};

use glam::Vec3;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use warden_core::commands::SimCommand;
use warden_core::components::{Enemy, Player};
use warden_core::config::{EnemyTuning, LockOnTuning};
use warden_core::constants::DT;
use warden_core::enums::EnemyState;
use warden_core::state::WorldSnapshot;
use warden_core::types::{AgentId, Pose, SimTime};

use warden_ai::combos::ComboTable;
use warden_ai::fsm::{EnemyBrain, Outbox};
use warden_ai::lock_on::LockOnController;

use crate::systems;
use crate::systems::enemy_ai::AiContext;
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed + same commands = same run.
    pub seed: u64,
    pub combos: ComboTable,
    pub lock_on: LockOnTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            combos: ComboTable::default(),
            lock_on: LockOnTuning::default(),
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    rng: ChaCha8Rng,
    combos: ComboTable,
    lock_on_tuning: LockOnTuning,
    lock_on: LockOnController,
    camera: Vec3,
    agents: HashMap<AgentId, Entity>,
    next_agent_id: u32,
    command_queue: VecDeque<SimCommand>,
    /// Directives and events emitted since the last snapshot.
    outbox: Outbox,
    /// How many of `outbox.directives` have already been applied.
    applied: usize,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            combos: config.combos,
            lock_on_tuning: config.lock_on,
            lock_on: LockOnController::new(),
            camera: Vec3::ZERO,
            agents: HashMap::new(),
            next_agent_id: 1,
            command_queue: VecDeque::new(),
            outbox: Outbox::new(),
            applied: 0,
        }
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SimCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance by one fixed tick and return the resulting snapshot.
    pub fn tick(&mut self) -> WorldSnapshot {
        self.step(DT)
    }

    /// Advance by `dt` seconds and return the resulting snapshot.
    pub fn step(&mut self, dt: f32) -> WorldSnapshot {
        self.process_commands(dt);
        self.run_systems(dt);
        self.time.advance(dt);

        self.applied = 0;
        let outbox = std::mem::take(&mut self.outbox);
        systems::snapshot::build_snapshot(&self.world, &self.time, &self.combos, &self.lock_on, outbox)
    }

    /// Add the player character. Only the first player is observed by the AI.
    pub fn spawn_player(&mut self, position: Vec3) -> AgentId {
        let id = self.allocate_id();
        let entity = world_setup::spawn_player(&mut self.world, id, position);
        self.agents.insert(id, entity);
        debug!(agent = %id, ?position, "player spawned");
        id
    }

    /// Add an enemy anchored at `spawn` and start it patrolling.
    pub fn spawn_enemy(&mut self, spawn: Pose, waypoints: Vec<Vec3>, tuning: EnemyTuning) -> AgentId {
        self.spawn_enemy_with(spawn, waypoints, tuning, true)
    }

    /// Add an enemy with no damageable. Hits against it are logged and skipped.
    pub fn spawn_invulnerable_enemy(&mut self, spawn: Pose, waypoints: Vec<Vec3>, tuning: EnemyTuning) -> AgentId {
        self.spawn_enemy_with(spawn, waypoints, tuning, false)
    }

    fn spawn_enemy_with(
        &mut self,
        spawn: Pose,
        waypoints: Vec<Vec3>,
        tuning: EnemyTuning,
        damageable: bool,
    ) -> AgentId {
        let id = self.allocate_id();
        let brain = EnemyBrain::new(id, spawn, waypoints, tuning);
        let entity = world_setup::spawn_enemy(&mut self.world, brain, damageable);
        self.agents.insert(id, entity);

        let ctx = AiContext {
            now: self.time.elapsed_secs,
            dt: DT,
            combos: &self.combos,
            rng: &mut self.rng,
            out: &mut self.outbox,
        };
        systems::enemy_ai::initialize(&mut self.world, entity, ctx);
        // The first update must see the patrol destination
        self.apply_pending();
        debug!(agent = %id, position = ?spawn.position, "enemy spawned");
        id
    }

    /// Chase-to-attack distance for an enemy's current combo.
    pub fn engagement_range(&self, agent: AgentId) -> Option<f32> {
        let entity = self.agents.get(&agent)?;
        let brain = self.world.get::<&EnemyBrain>(*entity).ok()?;
        Some(brain.engagement_range(&self.combos))
    }

    /// Current state of an enemy.
    pub fn enemy_state(&self, agent: AgentId) -> Option<EnemyState> {
        let entity = self.agents.get(&agent)?;
        let brain = self.world.get::<&EnemyBrain>(*entity).ok()?;
        Some(brain.state())
    }

    /// A copy of an enemy's brain, for inspection.
    pub fn brain(&self, agent: AgentId) -> Option<EnemyBrain> {
        let entity = self.agents.get(&agent)?;
        let brain = self.world.get::<&EnemyBrain>(*entity).ok()?;
        Some(EnemyBrain::clone(&brain))
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn combos(&self) -> &ComboTable {
        &self.combos
    }

    pub fn lock_on(&self) -> &LockOnController {
        &self.lock_on
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Resolve an agent handle.
    pub fn entity(&self, agent: AgentId) -> Option<Entity> {
        self.agents.get(&agent).copied()
    }

    fn allocate_id(&mut self) -> AgentId {
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;
        id
    }

    /// Process all queued commands.
    fn process_commands(&mut self, dt: f32) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command, dt);
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: SimCommand, dt: f32) {
        match command {
            SimCommand::SetPlayerPosition { position } => {
                let mut moved = false;
                for (_entity, (_player, pose)) in self.world.query_mut::<(&Player, &mut Pose)>() {
                    pose.position = position;
                    moved = true;
                }
                if !moved {
                    warn!("no player to move");
                }
            }
            SimCommand::SetCameraPosition { position } => {
                self.camera = position;
            }
            SimCommand::SetCombatMode { active } => {
                self.lock_on.set_combat_mode(active, &mut self.outbox);
            }
            SimCommand::AnimationEvent { agent, event, attack } => {
                let Some(entity) = self.enemy_entity(agent) else {
                    warn!(%agent, ?event, "animation event for unknown enemy dropped");
                    return;
                };
                let ctx = AiContext {
                    now: self.time.elapsed_secs,
                    dt,
                    combos: &self.combos,
                    rng: &mut self.rng,
                    out: &mut self.outbox,
                };
                systems::enemy_ai::deliver_animation_event(&mut self.world, entity, event, attack, ctx);
            }
            SimCommand::DamageAgent { agent, amount } => {
                let Some(&entity) = self.agents.get(&agent) else {
                    warn!(%agent, amount, "damage for unknown agent dropped");
                    return;
                };
                systems::directives::damage(&mut self.world, entity, agent, amount, &mut self.outbox.events);
            }
        }
    }

    fn enemy_entity(&self, agent: AgentId) -> Option<Entity> {
        let entity = *self.agents.get(&agent)?;
        self.world.get::<&Enemy>(entity).is_ok().then_some(entity)
    }

    /// Apply directives emitted since the last call.
    fn apply_pending(&mut self) {
        let pending = &self.outbox.directives[self.applied..];
        systems::directives::apply(&mut self.world, &self.agents, pending, &mut self.outbox.events);
        self.applied = self.outbox.directives.len();
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f32) {
        // 1. Enemy AI
        let ctx = AiContext {
            now: self.time.elapsed_secs,
            dt,
            combos: &self.combos,
            rng: &mut self.rng,
            out: &mut self.outbox,
        };
        systems::enemy_ai::run(&mut self.world, ctx);
        // 2. Capabilities react to directives from commands and AI
        self.apply_pending();
        // 3. Path following
        systems::navigation::run(&mut self.world, dt);
        // 4. Lock-on selection and highlight
        systems::lock_on::run(
            &self.world,
            &mut self.lock_on,
            self.camera,
            self.lock_on_tuning.search_radius,
            &mut self.outbox,
        );
        self.apply_pending();
    }
}
