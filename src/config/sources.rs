//! Config sources: user file, workspace file, explicit file, environment.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Workspace-level config file name.
pub const WORKSPACE_CONFIG_FILE: &str = "lazyve.toml";

/// `$XDG_CONFIG_HOME/lazyve/config.toml`, else `~/.config/lazyve/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => PathBuf::from(std::env::var("HOME").ok()?).join(".config"),
    };
    Some(base.join("lazyve").join("config.toml"))
}

/// Add the user config file if it exists.
pub fn add_user_file(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match user_config_path() {
        Some(path) if path.exists() => add_file(builder, &path, false),
        Some(path) => {
            debug!(config_path = %path.display(), "No user configuration file");
            Ok(builder)
        }
        None => Ok(builder),
    }
}

/// Add `<root>/lazyve.toml` if it exists.
pub fn add_workspace_file(
    builder: ConfigBuilder<DefaultState>,
    root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = root.join(WORKSPACE_CONFIG_FILE);
    if path.exists() {
        add_file(builder, &path, false)
    } else {
        Ok(builder)
    }
}

/// Add a TOML file source.
pub fn add_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let name = path
        .to_str()
        .ok_or_else(|| ConfigError::Message(format!("Non UTF-8 config path: {:?}", path)))?;
    Ok(builder.add_source(File::new(name, FileFormat::Toml).required(required)))
}

/// `LAZYVE_RANGING__VALUES_PER_DEPTH=3` sets `ranging.values_per_depth`.
pub fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("LAZYVE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}
