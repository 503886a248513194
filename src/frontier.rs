//! Initial frontier: the elements that must be present before expansion begins.

use crate::model::Universe;
use crate::types::ElementId;
use std::collections::HashSet;

/// `distinct(targets ++ conditioned ++ constrained)`, first occurrence wins.
pub fn initial_frontier(targets: &[ElementId], universe: &Universe) -> Vec<ElementId> {
    let mut seen = HashSet::new();
    targets
        .iter()
        .copied()
        .chain(universe.conditioned_elements())
        .chain(universe.constrained_elements())
        .filter(|id| seen.insert(*id))
        .collect()
}
