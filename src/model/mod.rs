//! Probabilistic model representation consumed by the inference core.
//!
//! A [`Universe`] owns elements and evidence. Query targets are [`Target`]s, which
//! remember the universe they were taken from so that requests spanning several
//! contexts can be rejected before an algorithm is built.

pub mod element;
pub mod universe;

pub use element::{ApplyFn, ChainFn, Element, ElementKind};
pub use universe::{Condition, Constraint, Universe};

use crate::types::{ElementId, UniverseId};
use std::fmt;
use std::sync::Arc;

/// A query target: an element within one model context.
#[derive(Clone)]
pub struct Target {
    universe: Arc<Universe>,
    element: ElementId,
}

impl Target {
    pub fn new(universe: &Arc<Universe>, element: ElementId) -> Self {
        Target {
            universe: Arc::clone(universe),
            element,
        }
    }

    pub fn universe(&self) -> &Arc<Universe> {
        &self.universe
    }

    pub fn universe_id(&self) -> UniverseId {
        self.universe.id()
    }

    pub fn element(&self) -> ElementId {
        self.element
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("universe", &self.universe.id())
            .field("element", &self.element)
            .finish()
    }
}
