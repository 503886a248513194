//! Model context: an append-only arena of elements plus the evidence placed on them.
//!
//! Element creation goes through `&Universe` so chain functions can build sub-models
//! while the structure is being expanded. The arena is guarded by a
//! `parking_lot::RwLock`; no lock is held while user functions run.

use crate::error::{InferenceError, Result};
use crate::model::element::{normalize_choices, Element, ElementKind};
use crate::types::{ElementId, UniverseId, Value};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_UNIVERSE_ID: AtomicU64 = AtomicU64::new(1);

/// Hard evidence: the element's value must satisfy the predicate.
pub type Condition = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Soft evidence: the element's value is weighted by the function.
pub type Constraint = Arc<dyn Fn(&Value) -> f64 + Send + Sync>;

#[derive(Default)]
struct Evidence {
    conditions: Vec<(ElementId, Condition)>,
    constraints: Vec<(ElementId, Constraint)>,
}

pub struct Universe {
    id: UniverseId,
    elements: RwLock<Vec<Arc<Element>>>,
    names: RwLock<HashMap<ElementId, String>>,
    evidence: RwLock<Evidence>,
}

impl fmt::Debug for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Universe")
            .field("id", &self.id)
            .field("elements", &self.len())
            .finish()
    }
}

impl Universe {
    pub fn new() -> Arc<Self> {
        Arc::new(Universe {
            id: UniverseId(NEXT_UNIVERSE_ID.fetch_add(1, Ordering::Relaxed)),
            elements: RwLock::new(Vec::new()),
            names: RwLock::new(HashMap::new()),
            evidence: RwLock::new(Evidence::default()),
        })
    }

    pub fn id(&self) -> UniverseId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.read().is_empty()
    }

    pub fn element(&self, id: ElementId) -> Result<Arc<Element>> {
        self.elements
            .read()
            .get(id.index())
            .cloned()
            .ok_or(InferenceError::ElementNotFound(id))
    }

    /// Every element that can be queried, in creation order.
    pub fn active_elements(&self) -> Vec<ElementId> {
        (0..self.len()).map(ElementId).collect()
    }

    fn push(&self, kind: ElementKind) -> ElementId {
        let mut elements = self.elements.write();
        let id = ElementId(elements.len());
        elements.push(Arc::new(Element { id, kind }));
        id
    }

    /// Attach a display name to an element. Returns the element for chaining.
    pub fn name(&self, id: ElementId, name: impl Into<String>) -> ElementId {
        self.names.write().insert(id, name.into());
        id
    }

    pub fn name_of(&self, id: ElementId) -> Option<String> {
        self.names.read().get(&id).cloned()
    }

    /// Display label: the name if one was given, otherwise the id.
    pub fn label(&self, id: ElementId) -> String {
        self.name_of(id).unwrap_or_else(|| id.to_string())
    }

    pub fn constant(&self, value: impl Into<Value>) -> ElementId {
        self.push(ElementKind::Constant(value.into()))
    }

    pub fn select(&self, choices: Vec<(f64, Value)>) -> ElementId {
        self.push(ElementKind::Select(normalize_choices(choices)))
    }

    pub fn flip(&self, p: f64) -> ElementId {
        self.select(vec![(p, Value::Bool(true)), (1.0 - p, Value::Bool(false))])
    }

    pub fn uniform(&self, values: Vec<Value>) -> ElementId {
        self.select(values.into_iter().map(|v| (1.0, v)).collect())
    }

    /// Geometric number of failures. `p` is clamped into `(0, 1]`.
    pub fn geometric(&self, p: f64) -> ElementId {
        let p = if p.is_finite() { p.clamp(f64::MIN_POSITIVE, 1.0) } else { 1.0 };
        self.push(ElementKind::Geometric { p })
    }

    pub fn apply<F>(&self, args: &[ElementId], f: F) -> ElementId
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.push(ElementKind::Apply {
            args: args.to_vec(),
            f: Arc::new(f),
        })
    }

    pub fn apply1<F>(&self, arg: ElementId, f: F) -> ElementId
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.apply(&[arg], move |vals| f(&vals[0]))
    }

    pub fn apply2<F>(&self, a: ElementId, b: ElementId, f: F) -> ElementId
    where
        F: Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    {
        self.apply(&[a, b], move |vals| f(&vals[0], &vals[1]))
    }

    pub fn chain<F>(&self, parent: ElementId, f: F) -> ElementId
    where
        F: Fn(&Value, &Universe) -> ElementId + Send + Sync + 'static,
    {
        self.push(ElementKind::Chain {
            parent,
            f: Arc::new(f),
        })
    }

    /// `if test then a else b`, as a chain over a boolean test.
    pub fn if_then_else(&self, test: ElementId, then_: ElementId, else_: ElementId) -> ElementId {
        self.chain(test, move |v, _| {
            if v.as_bool().unwrap_or(false) {
                then_
            } else {
                else_
            }
        })
    }

    pub fn observe(&self, id: ElementId, value: impl Into<Value>) {
        let value = value.into();
        self.condition(id, move |v| *v == value);
    }

    pub fn condition<F>(&self, id: ElementId, predicate: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.evidence
            .write()
            .conditions
            .push((id, Arc::new(predicate)));
    }

    pub fn constrain<F>(&self, id: ElementId, weight: F)
    where
        F: Fn(&Value) -> f64 + Send + Sync + 'static,
    {
        self.evidence
            .write()
            .constraints
            .push((id, Arc::new(weight)));
    }

    /// Remove all conditions and constraints on an element.
    pub fn clear_evidence(&self, id: ElementId) {
        let mut evidence = self.evidence.write();
        evidence.conditions.retain(|(e, _)| *e != id);
        evidence.constraints.retain(|(e, _)| *e != id);
    }

    /// Conditioned elements in order of first condition, without duplicates.
    pub fn conditioned_elements(&self) -> Vec<ElementId> {
        distinct_in_order(self.evidence.read().conditions.iter().map(|(e, _)| *e))
    }

    /// Constrained elements in order of first constraint, without duplicates.
    pub fn constrained_elements(&self) -> Vec<ElementId> {
        distinct_in_order(self.evidence.read().constraints.iter().map(|(e, _)| *e))
    }

    pub fn conditions(&self, id: ElementId) -> Vec<Condition> {
        self.evidence
            .read()
            .conditions
            .iter()
            .filter(|(e, _)| *e == id)
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn constraints(&self, id: ElementId) -> Vec<Constraint> {
        self.evidence
            .read()
            .constraints
            .iter()
            .filter(|(e, _)| *e == id)
            .map(|(_, c)| c.clone())
            .collect()
    }
}

fn distinct_in_order(ids: impl Iterator<Item = ElementId>) -> Vec<ElementId> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}
