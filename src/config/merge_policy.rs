//! Merge rules: defaults first, later sources override earlier ones.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with the built-in defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("structure.single_chain_factor", true)?
        .set_default("elimination.heuristic", "min_degree")?
        .set_default("ranging.values_per_depth", 1)?
        .set_default("iterative.default_step", 1)
}
