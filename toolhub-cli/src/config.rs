//! Configuration loading and hub construction for CLI commands

use crate::error::CliResult;
use std::path::Path;
use toolhub::{Config, ToolHub};

/// Load the configuration from `path`, or from the default search path
///
/// An explicit file must exist and parse; the search path silently falls back
/// to environment variables and defaults.
pub fn load_config(path: Option<&Path>) -> CliResult<Config> {
    match path {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            Ok(Config::from_yaml_file(path)?)
        }
        None => Ok(Config::new()),
    }
}

/// Build a hub over the built-in tools
pub fn build_hub(path: Option<&Path>) -> CliResult<ToolHub> {
    let config = load_config(path)?;
    Ok(ToolHub::with_builtins(config)?)
}
