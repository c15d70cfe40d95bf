//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Loop passes through the grid per round. Not configurable.
pub const LOOPS_PER_ROUND: u32 = 2;

/// Live engine configuration.
///
/// The scheduler reads these fields at the moment it needs them, so a change
/// applies from the next scheduled beat on. Values are assumed positive;
/// callers clamp them before they reach the engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Tempo in beats per minute.
    pub bpm: f64,
    /// Beats per loop (number of active grid slots).
    pub items_in_grid: u32,
    /// Rounds in a session.
    pub total_rounds: u32,
}

impl EngineConfig {
    /// Create a configuration.
    pub const fn new(bpm: f64, items_in_grid: u32, total_rounds: u32) -> Self {
        Self { bpm, items_in_grid, total_rounds }
    }

    /// Duration of one beat in seconds.
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(90.0, 8, 5)
    }
}
