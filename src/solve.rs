//! Solve driver and solution types.

use crate::error::Result;
use crate::structure::Structure;
use crate::types::{ComponentId, ElementId, Extended, Value};
use crate::ve::Solver;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Distribution over one target's range. Probabilities sum to one; mass that
/// reached unexpanded structure sits on `*`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marginal {
    entries: Vec<(Extended, f64)>,
}

impl Marginal {
    pub fn new(entries: Vec<(Extended, f64)>) -> Self {
        Marginal { entries }
    }

    pub fn probability(&self, value: &Value) -> f64 {
        self.probability_where(|v| v == value)
    }

    /// Mass of the regular values satisfying `predicate`.
    pub fn probability_where<F>(&self, predicate: F) -> f64
    where
        F: Fn(&Value) -> bool,
    {
        self.iter()
            .filter_map(|(v, p)| v.regular().filter(|v| predicate(*v)).map(|_| p))
            .sum()
    }

    /// Mass the current expansion could not resolve.
    pub fn unresolved(&self) -> f64 {
        self.iter().filter(|(v, _)| v.is_star()).map(|(_, p)| p).sum()
    }

    pub fn resolved_mass(&self) -> f64 {
        self.probability_where(|_| true)
    }

    /// Expectation of `f` over the resolved values, renormalized.
    /// `None` when nothing is resolved or `f` is undefined on a resolved value
    /// with positive mass.
    pub fn expectation<F>(&self, f: F) -> Option<f64>
    where
        F: Fn(&Value) -> Option<f64>,
    {
        let mass = self.resolved_mass();
        if mass <= 0.0 {
            return None;
        }
        let mut total = 0.0;
        for (value, p) in self.iter() {
            if let Some(v) = value.regular() {
                if p > 0.0 {
                    total += p * f(v)?;
                }
            }
        }
        Some(total / mass)
    }

    /// Regular value with the largest mass. Ties go to the smaller value.
    pub fn most_likely(&self) -> Option<(&Value, f64)> {
        self.iter()
            .filter_map(|(v, p)| v.regular().map(|v| (v, p)))
            .fold(None, |best, (v, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((v, p)),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Extended, f64)> {
        self.entries.iter().map(|(v, p)| (v, *p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Marginals over the query targets at one depth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub depth: usize,
    pub marginals: BTreeMap<ElementId, Marginal>,
}

impl Solution {
    pub fn marginal(&self, element: ElementId) -> Option<&Marginal> {
        self.marginals.get(&element)
    }
}

/// Raises the structure, then eliminates down to the targets.
#[derive(Debug, Clone)]
pub struct SolveDriver<S> {
    solver: S,
}

impl<S: Solver> SolveDriver<S> {
    pub fn new(solver: S) -> Self {
        SolveDriver { solver }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Deterministic: the same structure always yields the same solution.
    #[instrument(skip_all, fields(targets = targets.len()))]
    pub fn solve(&self, structure: &mut Structure, targets: &[ComponentId]) -> Result<Solution> {
        self.solver.raise(structure)?;
        let solution = self.solver.eliminate(structure, targets)?;
        info!(depth = solution.depth, targets = solution.marginals.len(), "Solved");
        Ok(solution)
    }
}
