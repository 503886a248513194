//! Problems (structural regions) and components (per-element expansion state).

use crate::types::{ComponentId, ElementId, Extended, ProblemId, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// A structural region. The root holds the frontier; every other problem is the
/// sub-model a chain selects for one parent value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    pub id: ProblemId,
    pub parent: Option<ProblemId>,
    pub level: usize,
    /// Chain element and parent value this problem was created for.
    pub origin: Option<(ElementId, Value)>,
    /// Element whose value the chain takes. `None` while a placeholder.
    pub target: Option<ElementId>,
    pub expanded_depth: Option<usize>,
}

impl Problem {
    pub(crate) fn root() -> Self {
        Problem {
            id: ProblemId(0),
            parent: None,
            level: 0,
            origin: None,
            target: None,
            expanded_depth: None,
        }
    }

    pub(crate) fn placeholder(
        id: ProblemId,
        parent: ProblemId,
        level: usize,
        chain: ElementId,
        value: Value,
    ) -> Self {
        Problem {
            id,
            parent: Some(parent),
            level,
            origin: Some((chain, value)),
            target: None,
            expanded_depth: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Created but not yet opened: the chain function has not been called.
    pub fn is_placeholder(&self) -> bool {
        self.origin.is_some() && self.target.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub id: ComponentId,
    pub element: ElementId,
    pub owner: ProblemId,
    /// Sorted, without duplicates. `*` sorts last.
    pub range: Vec<Extended>,
    /// Depth of the last expansion. `None` until first expanded.
    pub depth: Option<usize>,
    /// Chain only: parent value to subproblem.
    pub subproblems: BTreeMap<Value, ProblemId>,
}

impl Component {
    pub(crate) fn new(id: ComponentId, element: ElementId, owner: ProblemId) -> Self {
        Component {
            id,
            element,
            owner,
            range: Vec::new(),
            depth: None,
            subproblems: BTreeMap::new(),
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.depth.is_some()
    }

    pub fn has_star(&self) -> bool {
        self.range.last().map_or(false, Extended::is_star)
    }

    pub fn index_of(&self, value: &Extended) -> Option<usize> {
        self.range.binary_search(value).ok()
    }
}
