//! Game settings: TOML file plus command-line overrides.

use bg_master::EngineConfig;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const BPM_RANGE: RangeInclusive<f64> = 30.0..=300.0;
pub const GRID_RANGE: RangeInclusive<u32> = 1..=16;
pub const ROUNDS_RANGE: RangeInclusive<u32> = 1..=20;

const DEFAULT_WORDS: [&str; 17] = [
    "Monkey", "Tiger", "Giraffe", "Zebra", "Snake", "Bear", "Penguin", "Lion", "Frog", "Turtle",
    "Cat", "Dog", "Fish", "Bird", "Elephant", "Fox", "Rabbit",
];

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Everything a session needs from the outside.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bpm: f64,
    pub grid_size: u32,
    pub total_rounds: u32,
    /// Vocabulary shown in the grid
    pub words: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            bpm: engine.bpm,
            grid_size: engine.items_in_grid,
            total_rounds: engine.total_rounds,
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Read settings from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Pull every value into its supported range. The engine does not
    /// validate what it is given.
    pub fn clamped(mut self) -> Self {
        if !self.bpm.is_finite() {
            log::warn!("bpm {} is not a number, using default", self.bpm);
            self.bpm = EngineConfig::default().bpm;
        }
        self.bpm = self.bpm.clamp(*BPM_RANGE.start(), *BPM_RANGE.end());
        self.grid_size = self.grid_size.clamp(*GRID_RANGE.start(), *GRID_RANGE.end());
        self.total_rounds = self
            .total_rounds
            .clamp(*ROUNDS_RANGE.start(), *ROUNDS_RANGE.end());
        self.words.retain(|w| !w.trim().is_empty());
        self
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.bpm, self.grid_size, self.total_rounds)
    }
}
