//! Configuration errors.
//!
//! Loading config is the only fallible surface; the simulation itself
//! recovers locally from every failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("expected {expected} combo definitions, found {found}")]
    ComboCount { expected: usize, found: usize },

    #[error("combo '{name}' has no attack steps")]
    EmptyCombo { name: String },

    #[error("combo '{name}' has invalid range {range}")]
    InvalidRange { name: String, range: f32 },
}
