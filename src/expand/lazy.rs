//! Depth-bounded lazy expansion.

use super::Expander;
use crate::error::{InferenceError, Result};
use crate::model::ElementKind;
use crate::ranging::RangingPolicy;
use crate::structure::{Structure, ROOT};
use crate::types::{ComponentId, ElementId, Extended, Value};
use std::collections::HashSet;
use tracing::{debug, instrument, trace};

/// Expands elements reachable from the requested components.
///
/// Depth counts nested chain openings: an element owned by a problem at level
/// `L` is expanded at `depth - L` in a pass of `depth`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LazyExpander;

impl Expander for LazyExpander {
    #[instrument(skip(self, structure, components, policy), fields(components = components.len()))]
    fn expand(
        &self,
        structure: &mut Structure,
        components: &[ComponentId],
        depth: usize,
        policy: &RangingPolicy,
    ) -> Result<()> {
        let before = (structure.component_count(), structure.problem_count());
        let mut pass = Pass {
            structure,
            depth,
            policy,
            in_progress: HashSet::new(),
            done: HashSet::new(),
            opened: 0,
        };
        for &id in components {
            let element = pass.structure.component(id)?.element;
            pass.expand_element(element)?;
        }
        let opened = pass.opened;
        structure.mark_expanded(ROOT, depth);

        debug!(
            new_components = structure.component_count() - before.0,
            new_problems = structure.problem_count() - before.1,
            opened,
            "Expansion pass complete"
        );
        Ok(())
    }
}

struct Pass<'a> {
    structure: &'a mut Structure,
    depth: usize,
    policy: &'a RangingPolicy,
    in_progress: HashSet<ElementId>,
    /// Elements already handled in this pass.
    done: HashSet<ElementId>,
    opened: usize,
}

impl Pass<'_> {
    fn expand_element(&mut self, element: ElementId) -> Result<()> {
        if self.done.contains(&element) {
            return Ok(());
        }
        if !self.in_progress.insert(element) {
            return Err(InferenceError::CyclicModel(element));
        }

        let result = self.expand_uncached(element);
        self.in_progress.remove(&element);
        result?;
        self.done.insert(element);
        Ok(())
    }

    fn expand_uncached(&mut self, element: ElementId) -> Result<()> {
        let universe = self.structure.universe().clone();
        let definition = universe.element(element)?;
        let depth = self.depth.saturating_sub(self.structure.level_of(element));
        let cid = self.structure.ensure_component(element);

        if self
            .structure
            .component(cid)?
            .depth
            .map_or(false, |d| d >= depth)
        {
            return Ok(());
        }
        trace!(%element, kind = definition.kind_name(), depth, "Expanding");

        let mut reached = depth;
        let range = match &definition.kind {
            ElementKind::Constant(v) => vec![Extended::Regular(v.clone())],
            ElementKind::Select(choices) => {
                if choices.is_empty() {
                    return Err(InferenceError::ExpansionFailed(format!(
                        "element {} has no choices",
                        element
                    )));
                }
                sorted(choices.iter().map(|(_, v)| Extended::Regular(v.clone())).collect())
            }
            ElementKind::Geometric { p } => {
                // Infinite supports grow by at most the policy bound per pass.
                let previous = self.structure.component(cid)?.depth;
                reached = match previous {
                    Some(d) => depth.min(d + self.policy.depth_bound),
                    None => depth.min(self.policy.depth_bound),
                };
                let policy = RangingPolicy {
                    depth_bound: reached,
                    ..*self.policy
                };
                policy.geometric_range(*p)
            }
            ElementKind::Apply { args, f } => {
                for &arg in args {
                    self.expand_element(arg)?;
                }
                let arg_ranges = args
                    .iter()
                    .map(|&arg| self.structure.range(arg).map(<[Extended]>::to_vec))
                    .collect::<Result<Vec<_>>>()?;
                apply_range(&arg_ranges, |values| f(values))
            }
            ElementKind::Chain { parent, f } => {
                self.expand_element(*parent)?;
                let parent_range = self.structure.range(*parent)?.to_vec();

                for value in parent_range.iter().filter_map(Extended::regular) {
                    let sub = self.structure.subproblem(cid, value)?;
                    if depth == 0 {
                        continue;
                    }
                    let target = match self.structure.problem(sub).and_then(|p| p.target) {
                        Some(target) => target,
                        None => {
                            let first = universe.len();
                            let target = f(value, universe.as_ref());
                            self.structure.open_subproblem(sub, target, first..universe.len())?;
                            self.opened += 1;
                            target
                        }
                    };
                    self.expand_element(target)?;
                    self.structure.mark_expanded(sub, depth - 1);
                }

                let component = self.structure.component(cid)?;
                let mut range = Vec::new();
                for value in &parent_range {
                    let target = value
                        .regular()
                        .and_then(|v| self.structure.chain_target(component, v));
                    match target {
                        Some(t) => range.extend_from_slice(self.structure.range(t)?),
                        None => range.push(Extended::Star),
                    }
                }
                sorted(range)
            }
        };

        self.structure.set_expansion(cid, range, reached)
    }
}

fn sorted(mut range: Vec<Extended>) -> Vec<Extended> {
    range.sort();
    range.dedup();
    range
}

/// Every value `f` can produce over the argument ranges. Any `*` argument
/// makes the result `*`.
fn apply_range<F>(arg_ranges: &[Vec<Extended>], f: F) -> Vec<Extended>
where
    F: Fn(&[Value]) -> Value,
{
    let sizes: Vec<usize> = arg_ranges.iter().map(Vec::len).collect();
    let mut range = Vec::new();
    let mut values = Vec::with_capacity(arg_ranges.len());
    crate::ve::for_each_assignment(&sizes, |assignment| {
        values.clear();
        for (arg_range, &i) in arg_ranges.iter().zip(assignment) {
            match &arg_range[i] {
                Extended::Regular(v) => values.push(v.clone()),
                Extended::Star => break,
            }
        }
        if values.len() == arg_ranges.len() {
            range.push(Extended::Regular(f(values.as_slice())));
        } else {
            range.push(Extended::Star);
        }
    });
    sorted(range)
}
