//! Configuration System
//!
//! Layered configuration for inference runs: built-in defaults, then an optional
//! user or workspace TOML file, then `LAZYVE_*` environment variables. Tests included.

use crate::error::InferenceError;
use crate::logging::LoggingConfig;
use crate::ve::Heuristic;
use serde::{Deserialize, Serialize};

mod facade;
mod merge_policy;
mod sources;

pub use facade::ConfigLoader;
pub use sources::{user_config_path, WORKSPACE_CONFIG_FILE};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default)]
    pub structure: StructureConfig,

    #[serde(default)]
    pub elimination: EliminationConfig,

    #[serde(default)]
    pub ranging: RangingConfig,

    #[serde(default)]
    pub iterative: IterativeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureConfig {
    /// One merged conditional factor per chain instead of one per parent value.
    /// Applied once when the algorithm initializes.
    #[serde(default = "default_true")]
    pub single_chain_factor: bool,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            single_chain_factor: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EliminationConfig {
    #[serde(default)]
    pub heuristic: Heuristic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangingConfig {
    /// Values an infinite-support element gains per unit of depth.
    #[serde(default = "default_one")]
    pub values_per_depth: usize,
}

impl Default for RangingConfig {
    fn default() -> Self {
        Self {
            values_per_depth: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterativeConfig {
    /// Depth increment used when none is given.
    #[serde(default = "default_one")]
    pub default_step: usize,
}

impl Default for IterativeConfig {
    fn default() -> Self {
        Self { default_step: 1 }
    }
}

fn default_true() -> bool {
    true
}

fn default_one() -> usize {
    1
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Ranging(String),
    Iterative(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Ranging(msg) => write!(f, "Ranging: {}", msg),
            ValidationError::Iterative(msg) => write!(f, "Iterative: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl InferenceConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.ranging.values_per_depth == 0 {
            errors.push(ValidationError::Ranging(
                "values_per_depth must be positive".to_string(),
            ));
        }
        if self.iterative.default_step == 0 {
            errors.push(ValidationError::Iterative(
                "default_step must be positive".to_string(),
            ));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// `validate` folded into a single error.
    pub fn validated(self) -> Result<Self, InferenceError> {
        self.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            InferenceError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;
        Ok(self)
    }
}
