//! Refinement driver: grows the structure to a requested depth.

use crate::error::Result;
use crate::expand::Expander;
use crate::ranging::RangingPolicy;
use crate::structure::Structure;
use crate::types::ComponentId;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct RefinementDriver<E> {
    expander: E,
}

impl<E: Expander> RefinementDriver<E> {
    pub fn new(expander: E) -> Self {
        RefinementDriver { expander }
    }

    pub fn expander(&self) -> &E {
        &self.expander
    }

    /// Expand everything reachable from `frontier` to `depth`, in place.
    /// Regions already at `depth` or deeper are left as they are.
    #[instrument(skip(self, structure, frontier, policy))]
    pub fn refine(
        &self,
        structure: &mut Structure,
        frontier: &[ComponentId],
        depth: usize,
        policy: &RangingPolicy,
    ) -> Result<()> {
        self.expander.expand(structure, frontier, depth, policy)?;
        info!(
            depth,
            components = structure.component_count(),
            problems = structure.problem_count(),
            placeholders = structure.placeholder_count(),
            "Refined structure"
        );
        debug!(fingerprint = %hex::encode(structure.fingerprint()), "Structure digest");
        Ok(())
    }
}
