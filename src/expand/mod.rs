//! Expansion: unfolding the model into the structure up to a depth bound.

mod lazy;

pub use lazy::LazyExpander;

use crate::error::Result;
use crate::ranging::RangingPolicy;
use crate::structure::Structure;
use crate::types::ComponentId;

/// Expansion interface
///
/// Implementations must be idempotent for depths not exceeding what the
/// structure was already expanded to, and must only extend existing structure.
pub trait Expander {
    fn expand(
        &self,
        structure: &mut Structure,
        components: &[ComponentId],
        depth: usize,
        policy: &RangingPolicy,
    ) -> Result<()>;
}
