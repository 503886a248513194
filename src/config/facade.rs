//! Configuration loader facade.

use super::merge_policy::builder_with_defaults;
use super::sources;
use super::InferenceConfig;
use config::ConfigError;
use std::path::Path;

/// Loads [`InferenceConfig`] from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then the user file, then `<root>/lazyve.toml`, then environment.
    pub fn load(root: &Path) -> Result<InferenceConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = sources::add_user_file(builder)?;
        let builder = sources::add_workspace_file(builder, root)?;
        sources::add_environment(builder).build()?.try_deserialize()
    }

    /// Defaults, then the given file (which must exist), then environment.
    pub fn load_from_file(path: &Path) -> Result<InferenceConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = sources::add_file(builder, path, true)?;
        sources::add_environment(builder).build()?.try_deserialize()
    }

    /// Built-in defaults only.
    pub fn default() -> InferenceConfig {
        InferenceConfig::default()
    }
}
