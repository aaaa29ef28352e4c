//! Power index cost tables.
//!
//! The resolved power efficiency tier becomes a discrete power index 0..3
//! used to look up operating costs:
//!
//! - index 0: no efficiency module equipped (baseline)
//! - index 1: Mk1 equipped
//! - index 2: Mk2 equipped
//! - index 3: Mk3 equipped
//!
//! An out-of-range index means the tier configuration and the tables have
//! drifted apart; lookups fail fast instead of clamping.

use serde::{Deserialize, Serialize};

/// Number of defined power index levels.
pub const POWER_INDEX_COUNT: usize = 4;

/// Operating costs derived from one power index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerCosts {
    /// Engine power rating multiplier (1.0 = baseline).
    pub engine_rating: f32,
    /// Silent running cost per tick.
    pub silent_running: f32,
    /// Sonar ping cost.
    pub sonar: f32,
    /// Shield activation cost.
    pub shield: f32,
}

/// Raised when a power index falls outside the defined tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerIndexError {
    pub index: usize,
}

impl std::fmt::Display for PowerIndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "power index {} out of range (tables define 0..{})",
            self.index, POWER_INDEX_COUNT
        )
    }
}

impl std::error::Error for PowerIndexError {}

/// Fixed cost tables indexed by power index. Stateless: the same index
/// always yields the same costs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerCostTable {
    engine_ratings: [f32; POWER_INDEX_COUNT],
    silent_running: [f32; POWER_INDEX_COUNT],
    sonar: [f32; POWER_INDEX_COUNT],
    shield: [f32; POWER_INDEX_COUNT],
}

impl PowerCostTable {
    /// Standard table set.
    pub fn standard() -> Self {
        Self {
            engine_ratings: [1.0, 3.0, 5.0, 6.0],
            silent_running: [5.0, 5.0, 4.0, 3.0],
            sonar: [10.0, 10.0, 8.0, 6.0],
            shield: [50.0, 50.0, 42.0, 35.0],
        }
    }

    /// Look up the cost tuple for `index`, failing on out-of-range values.
    pub fn costs_for(&self, index: usize) -> Result<PowerCosts, PowerIndexError> {
        if index >= POWER_INDEX_COUNT {
            return Err(PowerIndexError { index });
        }
        Ok(PowerCosts {
            engine_rating: self.engine_ratings[index],
            silent_running: self.silent_running[index],
            sonar: self.sonar[index],
            shield: self.shield[index],
        })
    }
}

impl Default for PowerCostTable {
    fn default() -> Self {
        Self::standard()
    }
}
