//! Generator Configuration
//!
//! This module provides the settings that shape a generated program.

use crate::benchmark::error::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};

/// Inclusive range for a randomly drawn count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Fields per struct
    pub field_count: CountRange,
    /// Arguments per non-entry function
    pub arg_count: CountRange,
    /// Seed for the generation RNG
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            field_count: CountRange::new(1, 10),
            arg_count: CountRange::new(1, 8),
            seed: 0,
        }
    }
}

impl GeneratorConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Validate generator configuration.
pub fn validate_config(config: &GeneratorConfig) -> BenchResult<()> {
    for (what, range) in [
        ("field_count", config.field_count),
        ("arg_count", config.arg_count),
    ] {
        if range.min == 0 {
            return Err(BenchError::config(
                format!("{what} minimum is 0"),
                "Every struct and function needs at least one member to be observable.",
            ));
        }
        if range.min > range.max {
            return Err(BenchError::config(
                format!("{what} range {}..={} is empty", range.min, range.max),
                "Set min <= max.",
            ));
        }
    }
    Ok(())
}
