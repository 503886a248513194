//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::InferenceError;

/// Map inference errors to a string for CLI output.
pub fn map_error(e: &InferenceError) -> String {
    match e {
        InferenceError::ZeroProbabilityEvidence => format!(
            "{} (try a larger depth so the evidence can be satisfied)",
            e
        ),
        _ => e.to_string(),
    }
}
