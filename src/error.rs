//! Error types for lazy structured variable elimination.

use crate::types::{ComponentId, ElementId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InferenceError>;

/// Malformed construction arguments. Raised before any algorithm object exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("no targets")]
    NoTargets,

    #[error("targets span multiple contexts")]
    MultipleContexts,

    #[error("depth increment must be positive")]
    ZeroIncrement,
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    #[error("Component not found: {0:?}")]
    ComponentNotFound(ComponentId),

    #[error("Cyclic model definition reached through element {0}")]
    CyclicModel(ElementId),

    #[error("Evidence has zero probability under the current expansion")]
    ZeroProbabilityEvidence,

    #[error("Algorithm has terminated")]
    Terminated,

    #[error("Cannot {action} while {state}")]
    InvalidState { action: &'static str, state: String },

    #[error("No solution available yet")]
    NoSolution,

    #[error("Not a query target: {0}")]
    UnknownTarget(ElementId),

    #[error("Expansion failed: {0}")]
    ExpansionFailed(String),

    #[error("Solve failed: {0}")]
    SolveFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<config::ConfigError> for InferenceError {
    fn from(err: config::ConfigError) -> Self {
        InferenceError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for InferenceError {
    fn from(err: serde_json::Error) -> Self {
        InferenceError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for InferenceError {
    fn from(err: toml::ser::Error) -> Self {
        InferenceError::Serialization(err.to_string())
    }
}

impl InferenceError {
    /// True for the construction-time validation failures.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, InferenceError::InvalidArgument(_))
    }
}
