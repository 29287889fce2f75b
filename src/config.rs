//! Tunables for the telemetry core.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tunables for decoding, analysis, and buffering.
///
/// Defaults match the documented behavior of each component; a config
/// file only needs to list the fields it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Sample capacity of each session buffer
    pub max_samples: usize,

    /// Magnitude above which a reading is flagged invalid
    pub saturation_limit: f32,

    /// Spike threshold distance from the mean, in standard deviations
    pub spike_threshold_sigma: f64,

    /// Minimum spike duration in seconds
    pub spike_min_duration_secs: f64,

    /// Acquisition sampling rate in Hz, used by spectral analysis
    pub sampling_rate: f64,

    /// Beta/alpha ratio above which stress rates High
    pub stress_high_ratio: f64,

    /// Beta/alpha ratio above which stress rates Medium
    pub stress_medium_ratio: f64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_samples: 10_000,
            saturation_limit: 10_000.0,
            spike_threshold_sigma: 3.0,
            spike_min_duration_secs: 0.1,
            sampling_rate: 256.0,
            stress_high_ratio: 1.5,
            stress_medium_ratio: 0.8,
        }
    }
}

impl CoreConfig {
    /// Load configuration from the default location, falling back to the
    /// defaults when no config file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: CoreConfig = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("neurostream")
            .join("config.json")
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
