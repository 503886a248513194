//! Ranging: finite value domains for elements under a depth bound.

use crate::types::{Extended, Value};
use serde::{Deserialize, Serialize};

/// How large a finite domain each element gets for one refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangingPolicy {
    pub depth_bound: usize,
    /// Values an infinite-support element gains per unit of depth.
    pub values_per_depth: usize,
}

impl RangingPolicy {
    /// Number of regular values an infinite-support element enumerates.
    pub fn support_size(&self) -> usize {
        (self.depth_bound + 1) * self.values_per_depth.max(1)
    }

    /// Probabilities of `k = 0..support_size()` for a geometric with success
    /// probability `p`, plus the residual tail mass.
    pub fn geometric_weights(&self, p: f64) -> (Vec<f64>, f64) {
        let n = self.support_size();
        let mut weights = Vec::with_capacity(n);
        let mut tail = 1.0;
        for _ in 0..n {
            let w = tail * p;
            weights.push(w);
            tail -= w;
        }
        (weights, tail.max(0.0))
    }

    /// Range of a geometric: regular values, then `*` if any tail mass remains.
    pub fn geometric_range(&self, p: f64) -> Vec<Extended> {
        let (weights, tail) = self.geometric_weights(p);
        let mut range: Vec<Extended> = (0..weights.len())
            .map(|k| Extended::Regular(Value::Int(k as i64)))
            .collect();
        if tail > 0.0 {
            range.push(Extended::Star);
        }
        range
    }
}

/// Supplies the ranging policy for a depth bound.
pub trait Ranger {
    fn lazy_range(&self, depth_bound: usize) -> RangingPolicy;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LazyRanger {
    pub values_per_depth: usize,
}

impl Default for LazyRanger {
    fn default() -> Self {
        LazyRanger { values_per_depth: 1 }
    }
}

impl Ranger for LazyRanger {
    fn lazy_range(&self, depth_bound: usize) -> RangingPolicy {
        RangingPolicy {
            depth_bound,
            values_per_depth: self.values_per_depth,
        }
    }
}
