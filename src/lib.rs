//! lazyve: Lazy Structured Variable Elimination
//!
//! Approximate marginals for probabilistic models whose structure may be infinite
//! or recursive. The model is unfolded only to a bounded depth, unexplored parts
//! are represented by a `*` placeholder value, and the finite result is solved by
//! variable elimination. Iterative mode deepens the expansion cycle by cycle,
//! reusing everything built so far.

pub mod algorithm;
pub mod cli;
pub mod config;
pub mod demos;
pub mod depth;
pub mod error;
pub mod expand;
pub mod frontier;
pub mod logging;
pub mod model;
pub mod ranging;
pub mod refine;
pub mod solve;
pub mod structure;
pub mod types;
pub mod validate;
pub mod ve;

pub use algorithm::{AlgorithmState, ExecutionMode, LazyStructuredVe};
pub use error::{ArgumentError, InferenceError, Result};
pub use model::{Target, Universe};
pub use solve::{Marginal, Solution};
pub use types::{ElementId, Extended, Value};
