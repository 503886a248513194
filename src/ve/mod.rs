//! Variable elimination over the expanded structure.
//!
//! Solving is split in two steps. [`Solver::raise`] eliminates variables that are
//! internal to nested problems, bottom-up, and leaves the resulting factors at the
//! root. [`Solver::eliminate`] then removes every remaining non-target variable and
//! reads off one marginal per target.

mod build;
mod eliminate;
mod factor;

pub use build::component_factors;
pub use eliminate::eliminate_variables;
pub use factor::{Factor, Variable};

pub(crate) use factor::for_each_assignment;

use crate::error::{InferenceError, Result};
use crate::solve::{Marginal, Solution};
use crate::structure::{Structure, ROOT};
use crate::types::{ComponentId, ElementId, ProblemId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, instrument, trace};

/// Greedy elimination order heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// Fewest neighbours first.
    #[default]
    MinDegree,
    /// Fewest fill-in edges first.
    MinFill,
}

/// Solving interface
pub trait Solver {
    /// Eliminate internal structure bottom-up, leaving the root's factor pool in
    /// the structure.
    fn raise(&self, structure: &mut Structure) -> Result<()>;

    /// Marginals over the target components from the raised pool.
    fn eliminate(&self, structure: &Structure, targets: &[ComponentId]) -> Result<Solution>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VariableElimination {
    pub heuristic: Heuristic,
}

impl VariableElimination {
    pub fn new(heuristic: Heuristic) -> Self {
        VariableElimination { heuristic }
    }
}

impl Solver for VariableElimination {
    #[instrument(skip_all, fields(problems = structure.problem_count()))]
    fn raise(&self, structure: &mut Structure) -> Result<()> {
        let mut pools: HashMap<ProblemId, Vec<Factor>> = HashMap::new();
        // Owners of every component that mentions an element.
        let mut dependents: HashMap<ElementId, Vec<ProblemId>> = HashMap::new();

        for component in structure.components().iter().filter(|c| c.is_expanded()) {
            pools
                .entry(component.owner)
                .or_default()
                .extend(component_factors(structure, component)?);
            for dep in structure.dependencies(component)? {
                dependents.entry(dep).or_default().push(component.owner);
            }
        }

        let mut order: Vec<ProblemId> = structure
            .problems()
            .iter()
            .filter(|p| !p.is_root())
            .map(|p| p.id)
            .collect();
        order.sort_by_key(|&id| (std::cmp::Reverse(structure.problems()[id.0].level), id));

        let mut eliminated = 0;
        for id in order {
            let Some(pool) = pools.remove(&id) else {
                continue;
            };
            let problem = &structure.problems()[id.0];
            let candidates: BTreeSet<ElementId> = pool
                .iter()
                .flat_map(|f| f.vars().iter().map(|v| v.element))
                .filter(|&x| {
                    Some(x) != problem.target
                        && !structure.is_pinned(x)
                        && structure.is_within(structure.owner_of(x), id)
                        && dependents
                            .get(&x)
                            .map_or(true, |owners| owners.iter().all(|&o| structure.is_within(o, id)))
                })
                .collect();
            eliminated += candidates.len();
            trace!(problem = id.0, candidates = candidates.len(), "Raising problem");

            let raised = eliminate_variables(pool, &candidates, self.heuristic);
            if let Some(parent) = problem.parent {
                pools.entry(parent).or_default().extend(raised);
            }
        }

        let root = pools.remove(&ROOT).unwrap_or_default();
        debug!(eliminated, root_factors = root.len(), "Raised structure");
        structure.set_raised(root);
        Ok(())
    }

    #[instrument(skip_all, fields(targets = targets.len()))]
    fn eliminate(&self, structure: &Structure, targets: &[ComponentId]) -> Result<Solution> {
        let pool = structure
            .raised()
            .ok_or_else(|| InferenceError::SolveFailed("structure has not been raised".into()))?;

        let target_elements: Vec<ElementId> = targets
            .iter()
            .map(|&t| structure.component(t).map(|c| c.element))
            .collect::<Result<_>>()?;
        let keep: BTreeSet<ElementId> = target_elements.iter().copied().collect();
        let candidates: BTreeSet<ElementId> = pool
            .iter()
            .flat_map(|f| f.vars().iter().map(|v| v.element))
            .filter(|x| !keep.contains(x))
            .collect();

        let remaining = eliminate_variables(pool.to_vec(), &candidates, self.heuristic);
        let joint = remaining
            .iter()
            .fold(Factor::scalar(1.0), |acc, f| acc.product(f));

        let total = joint.total();
        if !(total > 0.0) || !total.is_finite() {
            return Err(InferenceError::ZeroProbabilityEvidence);
        }

        let mut marginals = BTreeMap::new();
        for &element in &target_elements {
            let range = structure.range(element)?;
            let weights = joint.marginal(element).ok_or_else(|| {
                InferenceError::SolveFailed(format!("target {} missing from joint factor", element))
            })?;
            let entries = range
                .iter()
                .cloned()
                .zip(weights.into_iter().map(|w| w / total))
                .collect();
            marginals.insert(element, Marginal::new(entries));
        }

        debug!(
            eliminated = candidates.len(),
            joint_size = joint.len(),
            "Eliminated variables"
        );
        Ok(Solution {
            depth: structure.root().expanded_depth.unwrap_or(0),
            marginals,
        })
    }
}
