use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use litgraph_core::CoreConfig;

pub const CONFIG_ENV: &str = "LITGRAPH_CONFIG";

/// Explicit path, then `$LITGRAPH_CONFIG`, then the user config file if it
/// exists, else defaults.
pub fn resolve(explicit: Option<&Path>) -> Result<CoreConfig> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .or_else(|| user_config_path().filter(|p| p.exists()));

    let Some(path) = path else {
        tracing::debug!("No configuration file, using defaults");
        return Ok(CoreConfig::default());
    };

    tracing::debug!("Loading configuration from {}", path.display());
    CoreConfig::load(&path).with_context(|| format!("invalid configuration in {}", path.display()))
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("litgraph").join("config.toml"))
}
