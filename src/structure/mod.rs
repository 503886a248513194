//! Expanded structure: the arena of problems and components that refinement grows
//! and the solver eliminates.
//!
//! Problems and components are addressed by stable indices. Nothing is ever
//! removed, so handles stay valid for the life of the structure and a deeper
//! refinement extends what a shallower one built.

mod fingerprint;
mod problem;

pub use problem::{Component, Problem};

use crate::error::{InferenceError, Result};
use crate::model::Universe;
use crate::types::{ComponentId, ElementId, Extended, ProblemId, Value};
use crate::ve::Factor;
use std::collections::{BTreeSet, HashMap};
use std::ops::Range;
use std::sync::Arc;

/// The top-level problem holding the frontier.
pub const ROOT: ProblemId = ProblemId(0);

pub struct Structure {
    universe: Arc<Universe>,
    single_chain_factor: bool,
    problems: Vec<Problem>,
    components: Vec<Component>,
    by_element: HashMap<ElementId, ComponentId>,
    /// Elements created while opening a subproblem. Everything else belongs to the root.
    owners: HashMap<ElementId, ProblemId>,
    pinned: BTreeSet<ElementId>,
    raised: Option<Vec<Factor>>,
}

impl std::fmt::Debug for Structure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Structure")
            .field("universe", &self.universe.id())
            .field("single_chain_factor", &self.single_chain_factor)
            .field("problems", &self.problems.len())
            .field("components", &self.components.len())
            .finish()
    }
}

impl Structure {
    /// `single_chain_factor` is fixed here for the life of the structure.
    pub fn new(universe: Arc<Universe>, single_chain_factor: bool) -> Self {
        Structure {
            universe,
            single_chain_factor,
            problems: vec![Problem::root()],
            components: Vec::new(),
            by_element: HashMap::new(),
            owners: HashMap::new(),
            pinned: BTreeSet::new(),
            raised: None,
        }
    }

    pub fn universe(&self) -> &Arc<Universe> {
        &self.universe
    }

    /// Whether each chain gets one merged conditional factor.
    pub fn single_chain_factor(&self) -> bool {
        self.single_chain_factor
    }

    pub fn root(&self) -> &Problem {
        &self.problems[ROOT.0]
    }

    pub fn problem(&self, id: ProblemId) -> Option<&Problem> {
        self.problems.get(id.0)
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn problem_count(&self) -> usize {
        self.problems.len()
    }

    /// Subproblems that exist but have not been opened yet.
    pub fn placeholder_count(&self) -> usize {
        self.problems.iter().filter(|p| p.is_placeholder()).count()
    }

    pub fn max_level(&self) -> usize {
        self.problems.iter().map(|p| p.level).max().unwrap_or(0)
    }

    pub fn component(&self, id: ComponentId) -> Result<&Component> {
        self.components
            .get(id.0)
            .ok_or(InferenceError::ComponentNotFound(id))
    }

    pub fn component_id(&self, element: ElementId) -> Option<ComponentId> {
        self.by_element.get(&element).copied()
    }

    pub fn component_for(&self, element: ElementId) -> Option<&Component> {
        self.component_id(element).map(|id| &self.components[id.0])
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Elements that have a component, in ascending order.
    pub fn elements(&self) -> BTreeSet<ElementId> {
        self.by_element.keys().copied().collect()
    }

    /// Range of an expanded element.
    pub fn range(&self, element: ElementId) -> Result<&[Extended]> {
        let component = self
            .component_for(element)
            .ok_or(InferenceError::ElementNotFound(element))?;
        Ok(&component.range)
    }

    pub fn owner_of(&self, element: ElementId) -> ProblemId {
        self.owners.get(&element).copied().unwrap_or(ROOT)
    }

    /// Nesting level of the problem that owns `element`.
    pub fn level_of(&self, element: ElementId) -> usize {
        self.problems[self.owner_of(element).0].level
    }

    /// True when `problem` is `ancestor` or nested somewhere below it.
    pub fn is_within(&self, problem: ProblemId, ancestor: ProblemId) -> bool {
        let mut current = Some(problem);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.problems.get(id.0).and_then(|p| p.parent);
        }
        false
    }

    pub fn is_pinned(&self, element: ElementId) -> bool {
        self.pinned.contains(&element)
    }

    pub fn pinned(&self) -> &BTreeSet<ElementId> {
        &self.pinned
    }

    /// Pin the frontier and make sure each element has a component.
    pub fn register_frontier(&mut self, frontier: &[ElementId]) -> Vec<ComponentId> {
        frontier
            .iter()
            .map(|&element| {
                self.pinned.insert(element);
                self.ensure_component(element)
            })
            .collect()
    }

    /// Component for `element`, created unexpanded if missing.
    pub fn ensure_component(&mut self, element: ElementId) -> ComponentId {
        if let Some(id) = self.component_id(element) {
            return id;
        }
        let id = ComponentId(self.components.len());
        let owner = self.owner_of(element);
        self.components.push(Component::new(id, element, owner));
        self.by_element.insert(element, id);
        id
    }

    /// Record a new range for a component at the depth it was expanded to.
    pub fn set_expansion(&mut self, id: ComponentId, range: Vec<Extended>, depth: usize) -> Result<()> {
        let component = self
            .components
            .get_mut(id.0)
            .ok_or(InferenceError::ComponentNotFound(id))?;
        component.range = range;
        component.depth = Some(depth);
        self.raised = None;
        Ok(())
    }

    /// Placeholder subproblem for `value` of a chain component, created if missing.
    pub fn subproblem(&mut self, chain: ComponentId, value: &Value) -> Result<ProblemId> {
        let component = self.component(chain)?;
        if let Some(&existing) = component.subproblems.get(value) {
            return Ok(existing);
        }
        let parent = component.owner;
        let element = component.element;
        let id = ProblemId(self.problems.len());
        let level = self.problems[parent.0].level + 1;
        self.problems
            .push(Problem::placeholder(id, parent, level, element, value.clone()));
        self.components[chain.0]
            .subproblems
            .insert(value.clone(), id);
        self.raised = None;
        Ok(id)
    }

    /// Turn a placeholder into an opened subproblem. Elements in `created` were
    /// made while building it and become its own.
    pub fn open_subproblem(
        &mut self,
        id: ProblemId,
        target: ElementId,
        created: Range<usize>,
    ) -> Result<()> {
        let problem = self.problems.get_mut(id.0).ok_or_else(|| {
            InferenceError::ExpansionFailed(format!("no such problem {:?}", id))
        })?;
        problem.target = Some(target);
        for index in created {
            let element = ElementId(index);
            if !self.by_element.contains_key(&element) {
                self.owners.insert(element, id);
            }
        }
        self.raised = None;
        Ok(())
    }

    pub fn mark_expanded(&mut self, id: ProblemId, depth: usize) {
        if let Some(problem) = self.problems.get_mut(id.0) {
            problem.expanded_depth = Some(problem.expanded_depth.map_or(depth, |d| d.max(depth)));
        }
    }

    /// Target that a chain maps `value` to, if that subproblem is open and its
    /// target has been expanded. Otherwise the value leads to `*`.
    pub fn chain_target(&self, chain: &Component, value: &Value) -> Option<ElementId> {
        let problem = self.problem(*chain.subproblems.get(value)?)?;
        let target = problem.target?;
        self.component_for(target)
            .filter(|c| c.is_expanded())
            .map(|_| target)
    }

    /// Every element a component's factor mentions besides its own.
    pub fn dependencies(&self, component: &Component) -> Result<Vec<ElementId>> {
        let element = self.universe.element(component.element)?;
        let mut deps = element.dependencies();
        for value in component.subproblems.keys() {
            if let Some(target) = self.chain_target(component, value) {
                if !deps.contains(&target) {
                    deps.push(target);
                }
            }
        }
        Ok(deps)
    }

    pub fn set_raised(&mut self, factors: Vec<Factor>) {
        self.raised = Some(factors);
    }

    /// Root factor pool left by the last raise, if the structure has not changed since.
    pub fn raised(&self) -> Option<&[Factor]> {
        self.raised.as_deref()
    }

    /// BLAKE3 digest over problems and components. Equal digests mean
    /// observably identical structures.
    pub fn fingerprint(&self) -> [u8; 32] {
        fingerprint::compute(&self.problems, &self.components)
    }

    /// Leading hex digits of the fingerprint, for display.
    pub fn short_fingerprint(&self) -> String {
        hex::encode(&self.fingerprint()[..6])
    }
}
