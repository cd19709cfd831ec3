//! Simulation engine for WARDEN.
//!
//! Owns the hecs ECS world and the agent registry, applies queued commands
//! at tick boundaries, runs the enemy AI and reference capabilities, and
//! produces `WorldSnapshot`s.

pub mod engine;
pub mod scenario;
pub mod systems;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use warden_core as core;

#[cfg(test)]
mod tests;
