//! Enemy AI for WARDEN.
//!
//! Implements the enemy behavior state machine, the combo attack engine,
//! field-of-view detection, patrol cycling and lock-on target selection.
//! Everything here operates on plain data; no ECS dependency.

pub mod attack;
pub mod combos;
pub mod fsm;
pub mod geometry;
pub mod lock_on;
pub mod patrol;

pub use warden_core as core;
