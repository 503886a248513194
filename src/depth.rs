//! Depth control: how far the next refinement unfolds recursive structure.

use crate::error::{ArgumentError, Result};
use serde::{Deserialize, Serialize};

/// Stateful depth policy.
///
/// Depths returned by one controller never decrease, which lets refinement
/// extend the expanded structure instead of rebuilding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthController {
    /// Same depth on every request.
    Fixed { depth: usize },

    /// `step, 2*step, 3*step, ...`
    Incrementing { step: usize, current: usize },
}

impl DepthController {
    pub fn fixed(depth: usize) -> Self {
        DepthController::Fixed { depth }
    }

    /// Fails with `ZeroIncrement` unless `step > 0`.
    pub fn incrementing(step: usize) -> Result<Self> {
        if step == 0 {
            return Err(ArgumentError::ZeroIncrement.into());
        }
        Ok(DepthController::Incrementing { step, current: 0 })
    }

    /// Depth to use for the next refinement attempt.
    pub fn next_depth(&mut self) -> usize {
        match self {
            DepthController::Fixed { depth } => *depth,
            DepthController::Incrementing { step, current } => {
                *current += *step;
                *current
            }
        }
    }

    /// Depth bound for the ranging policy: the full depth when fixed, one
    /// increment when incrementing.
    pub fn range_bound(&self) -> usize {
        match self {
            DepthController::Fixed { depth } => *depth,
            DepthController::Incrementing { step, .. } => *step,
        }
    }

    /// Most recently emitted depth, if any.
    pub fn current(&self) -> Option<usize> {
        match self {
            DepthController::Fixed { depth } => Some(*depth),
            DepthController::Incrementing { current: 0, .. } => None,
            DepthController::Incrementing { current, .. } => Some(*current),
        }
    }
}
