//! Target validation, run once before an algorithm instance is built.

use crate::error::{ArgumentError, Result};
use crate::model::{Target, Universe};
use std::sync::Arc;

/// Check that a query is non-empty and confined to a single model context.
///
/// Returns the shared context and the targets, unchanged.
pub fn validate_targets(targets: Vec<Target>) -> Result<(Arc<Universe>, Vec<Target>)> {
    let first = targets.first().ok_or(ArgumentError::NoTargets)?;
    let universe = Arc::clone(first.universe());

    if targets.iter().any(|t| t.universe_id() != universe.id()) {
        return Err(ArgumentError::MultipleContexts.into());
    }

    Ok((universe, targets))
}
