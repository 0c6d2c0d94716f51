//! Race result prediction from pre-race signals
//!
//! Assembles qualifying pace, historical sector pace, team strength and
//! weather into a supervised dataset, fits a gradient-boosted regressor
//! with small-sample-aware validation, and quantifies outcome uncertainty
//! with a Monte Carlo rank simulation.

pub mod data;
pub mod features;
pub mod model;
pub mod sim;
pub mod training;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unique code identifying a competitor (e.g. "VER")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DriverCode(pub String);

impl DriverCode {
    pub fn new(code: impl Into<String>) -> Self {
        DriverCode(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DriverCode {
    fn from(code: &str) -> Self {
        DriverCode(code.to_string())
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum RaceError {
    #[error("missing required column: {0}")]
    SchemaMismatch(String),

    #[error("duplicate competitor code: {0}")]
    DuplicateCompetitor(DriverCode),

    #[error("trial count must be at least 1")]
    InvalidTrialCount,

    #[error("row count mismatch: {left} rows vs {right} {what}")]
    RowMismatch {
        left: usize,
        right: usize,
        what: &'static str,
    },

    #[error("invalid value for {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RaceError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub simulation: SimulationConfig,
}

/// Gradient-boosting hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub seed: u64,
}

/// Monte Carlo simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub trials: usize,
    /// Std dev of the per-trial perturbation on clean-air race pace (seconds)
    pub pace_sigma: f64,
    /// Std dev of the per-trial perturbation on pit-loss time (seconds)
    pub pit_sigma: f64,
    pub seed: u64,
    /// Overall simulation deadline; trials not dispatched by then are dropped
    pub timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model: ModelConfig {
                n_estimators: 100,
                learning_rate: 0.7,
                max_depth: 3,
                seed: 37,
            },
            simulation: SimulationConfig {
                trials: 1000,
                pace_sigma: 0.15,
                pit_sigma: 0.5,
                seed: 37,
                timeout_ms: None,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RaceError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| RaceError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RaceError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_roundtrip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.model.n_estimators, 100);
        assert_eq!(parsed.simulation.trials, 1000);
        assert!(parsed.simulation.timeout_ms.is_none());
    }

    #[test]
    fn test_driver_code_display() {
        let code = DriverCode::from("VER");
        assert_eq!(code.to_string(), "VER");
        assert_eq!(code.as_str(), "VER");
    }
}
