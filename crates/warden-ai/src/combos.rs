//! Combo definitions: per-step timing, damage and animation cues.
//!
//! A table holds exactly four combos. An agent picks one at random on each
//! attack entry, never the same one twice in a row.

use std::collections::BTreeSet;
use std::path::Path;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use warden_core::constants::{ATTACK_TRIGGERS, COMBO_COUNT};
use warden_core::error::ConfigError;

/// One combo: an ordered sequence of timed attack steps.
///
/// The step arrays may differ in length. The combo's length is the number
/// of delays; damage and trigger lookups past their own array fall back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboDefinition {
    pub name: String,
    /// `delays[i]` is the wait after the previous attack before attack `i` fires.
    pub delays: Vec<f64>,
    pub damages: Vec<f32>,
    /// Animator trigger fired with each attack.
    pub triggers: Vec<String>,
    /// Engagement range: Chase hands over to Attack at or below this distance.
    pub range: f32,
}

impl ComboDefinition {
    pub fn len(&self) -> usize {
        self.delays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    pub fn delay(&self, index: usize) -> Option<f64> {
        self.delays.get(index).copied()
    }

    pub fn damage(&self, index: usize) -> Option<f32> {
        self.damages.get(index).copied()
    }

    pub fn trigger(&self, index: usize) -> Option<&str> {
        self.triggers.get(index).map(String::as_str)
    }
}

/// The fixed set of combos available to an enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboTable {
    pub combos: Vec<ComboDefinition>,
}

impl Default for ComboTable {
    fn default() -> Self {
        Self {
            combos: vec![
                combo("Quick Jabs", &[0.3, 0.3, 0.4], &[8.0, 8.0, 12.0], &["QuickJab1"], 1.2),
                combo("Heavy Strikes", &[0.8, 0.9, 1.2], &[15.0, 18.0, 25.0], &["HeavyStrike1"], 1.8),
                combo(
                    "Spinning Attacks",
                    &[0.6, 0.5, 0.7, 0.8],
                    &[10.0, 12.0, 14.0, 20.0],
                    &["SpinAttack1"],
                    2.0,
                ),
                combo("Uppercut Combo", &[0.5, 0.4, 1.0], &[12.0, 10.0, 30.0], &["UppercutFinish"], 1.5),
            ],
        }
    }
}

fn combo(name: &str, delays: &[f64], damages: &[f32], triggers: &[&str], range: f32) -> ComboDefinition {
    ComboDefinition {
        name: name.to_string(),
        delays: delays.to_vec(),
        damages: damages.to_vec(),
        triggers: triggers.iter().map(|t| t.to_string()).collect(),
        range,
    }
}

impl ComboTable {
    /// Parse and validate a table from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let table: ComboTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Read, parse and validate a table from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.combos.len() != COMBO_COUNT {
            return Err(ConfigError::ComboCount {
                expected: COMBO_COUNT,
                found: self.combos.len(),
            });
        }
        for c in &self.combos {
            if c.is_empty() {
                return Err(ConfigError::EmptyCombo {
                    name: c.name.clone(),
                });
            }
            if !(c.range.is_finite() && c.range > 0.0) {
                return Err(ConfigError::InvalidRange {
                    name: c.name.clone(),
                    range: c.range,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.combos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combos.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ComboDefinition> {
        self.combos.get(index)
    }

    /// Every trigger name that must be reset when clearing the animator:
    /// the canonical attack vocabulary plus anything the table names.
    pub fn all_triggers(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = ATTACK_TRIGGERS.iter().copied().collect();
        for c in &self.combos {
            names.extend(c.triggers.iter().map(String::as_str));
        }
        names
    }

    /// Pick a combo index different from `previous`, uniformly from the rest.
    ///
    /// Samples the complement directly, so it never loops. With a single
    /// combo that combo is returned; with an invalid `previous` every combo
    /// is eligible.
    pub fn select_next(&self, previous: usize, rng: &mut dyn RngCore) -> usize {
        let n = self.combos.len();
        if n <= 1 {
            return 0;
        }
        if previous >= n {
            return rng.gen_range(0..n);
        }
        let pick = rng.gen_range(0..n - 1);
        if pick >= previous {
            pick + 1
        } else {
            pick
        }
    }
}
