//! Enumeration configuration.
//!
//! Callers choose the search strategy, the side to enumerate over and, for
//! the parallel strategy, the worker count. The configuration can be built
//! in code or parsed from a flat TOML table:
//!
//! ```toml
//! algorithm = "parallel_power_set"
//! side = "auto"
//! workers = 4
//! max_power_set_width = 24
//! ```

use crate::error::FcaError;
use crate::side::Side;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default limit on the side width a power-set search will accept.
pub const DEFAULT_MAX_POWER_SET_WIDTH: usize = 30;

/// Hard ceiling on the power-set width: subset ranks must fit in a `u64`.
pub const POWER_SET_WIDTH_CAP: usize = 63;

/// Concept search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Closure test on every subset of the chosen side. `2^k` tests.
    PowerSet,

    /// Meet-closure of the principal extents (or intents).
    #[default]
    Iteration,

    /// The power-set test split across a worker pool.
    ParallelPowerSet,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PowerSet => write!(f, "power_set"),
            Self::Iteration => write!(f, "iteration"),
            Self::ParallelPowerSet => write!(f, "parallel_power_set"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "power_set" | "powerset" | "naive" => Ok(Self::PowerSet),
            "iteration" | "incremental" | "closure" => Ok(Self::Iteration),
            "parallel_power_set" | "parallel" => Ok(Self::ParallelPowerSet),
            _ => Err(format!("unknown algorithm: {s}")),
        }
    }
}

/// How a concept search should run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumerationConfig {
    pub algorithm: Algorithm,

    pub side: Side,

    /// Worker threads for the parallel strategy; `None` uses the pool default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Largest side width a power-set strategy accepts (capped at 63).
    pub max_power_set_width: usize,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            side: Side::default(),
            workers: None,
            max_power_set_width: DEFAULT_MAX_POWER_SET_WIDTH,
        }
    }
}

impl EnumerationConfig {
    /// Parse a flat TOML table; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, FcaError> {
        Ok(toml::from_str(text)?)
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// The width limit actually enforced.
    pub fn width_limit(&self) -> usize {
        self.max_power_set_width.min(POWER_SET_WIDTH_CAP)
    }
}
