//! Element definitions.

use crate::model::Universe;
use crate::types::{ElementId, Value};
use std::fmt;
use std::sync::Arc;

/// Deterministic function of argument values.
pub type ApplyFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Builds the sub-model selected by a parent value. May create new elements
/// in the universe it is given, including further chains.
pub type ChainFn = Arc<dyn Fn(&Value, &Universe) -> ElementId + Send + Sync>;

/// How an element produces its value.
#[derive(Clone)]
pub enum ElementKind {
    /// Always the same value.
    Constant(Value),

    /// Finite distribution over weighted values. Weights are normalized.
    Select(Vec<(f64, Value)>),

    /// Number of failures before the first success, `P(k) = p (1-p)^k`.
    /// Infinite support; ranged lazily.
    Geometric { p: f64 },

    /// Deterministic function of other elements.
    Apply { args: Vec<ElementId>, f: ApplyFn },

    /// Value of the element `f(parent value)` returns.
    Chain { parent: ElementId, f: ChainFn },
}

impl fmt::Debug for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            ElementKind::Select(choices) => f.debug_tuple("Select").field(choices).finish(),
            ElementKind::Geometric { p } => f.debug_struct("Geometric").field("p", p).finish(),
            ElementKind::Apply { args, .. } => {
                f.debug_struct("Apply").field("args", args).finish_non_exhaustive()
            }
            ElementKind::Chain { parent, .. } => {
                f.debug_struct("Chain").field("parent", parent).finish_non_exhaustive()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
}

impl Element {
    /// Elements whose ranges this element's range is computed from.
    /// Chain subproblem targets are not included; they only exist after expansion.
    pub fn dependencies(&self) -> Vec<ElementId> {
        match &self.kind {
            ElementKind::Apply { args, .. } => args.clone(),
            ElementKind::Chain { parent, .. } => vec![*parent],
            _ => Vec::new(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Constant(_) => "constant",
            ElementKind::Select(_) => "select",
            ElementKind::Geometric { .. } => "geometric",
            ElementKind::Apply { .. } => "apply",
            ElementKind::Chain { .. } => "chain",
        }
    }

    pub fn is_chain(&self) -> bool {
        matches!(self.kind, ElementKind::Chain { .. })
    }
}

/// Normalize select weights. Negative weights count as zero; an all-zero
/// choice list becomes uniform.
pub(crate) fn normalize_choices(choices: Vec<(f64, Value)>) -> Vec<(f64, Value)> {
    let cleaned: Vec<(f64, Value)> = choices
        .into_iter()
        .map(|(w, v)| (if w.is_finite() && w > 0.0 { w } else { 0.0 }, v))
        .collect();
    let total: f64 = cleaned.iter().map(|(w, _)| w).sum();
    if total <= 0.0 {
        let n = cleaned.len().max(1) as f64;
        return cleaned.into_iter().map(|(_, v)| (1.0 / n, v)).collect();
    }
    cleaned.into_iter().map(|(w, v)| (w / total, v)).collect()
}
