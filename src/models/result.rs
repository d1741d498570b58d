//! Calculation output types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Output key used for mileage outside every modeled state
pub const UNRESOLVED_KEY: &str = "unresolved";

/// Owner of a point or a stretch of route.
///
/// Ordering puts every state (by canonical code) before `Unresolved`, which
/// keeps accumulation maps and their output deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    /// Canonical state code (e.g. "CO")
    State(String),
    /// Outside all modeled states
    Unresolved,
}

impl Region {
    /// Key used in the output mapping
    pub fn key(&self) -> &str {
        match self {
            Region::State(code) => code,
            Region::Unresolved => UNRESOLVED_KEY,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Miles per state code, plus optionally [`UNRESOLVED_KEY`]
pub type StateDistanceMap = BTreeMap<String, f64>;

/// Externally visible result of a calculation.
///
/// `sum(state_distances) ≈ total_distance` holds for every successful result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub state_distances: StateDistanceMap,

    /// Reconciled total in miles
    pub total_distance: f64,

    /// Border crossings that fell back to an even split
    #[serde(default)]
    pub degraded_segments: usize,
}

impl CalculationResult {
    /// Sum of all per-state values
    pub fn sum(&self) -> f64 {
        self.state_distances.values().sum()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.state_distances.get(key).copied()
    }

    /// Miles attributed outside every modeled state (0 if omitted)
    pub fn unresolved(&self) -> f64 {
        self.get(UNRESOLVED_KEY).unwrap_or(0.0)
    }
}
