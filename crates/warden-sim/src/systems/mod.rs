//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` (or `&World` for read-only).
//! They hold no state of their own; everything lives in components or is
//! passed in by the engine.

pub mod directives;
pub mod enemy_ai;
pub mod lock_on;
pub mod navigation;
pub mod snapshot;
