//! Configuration management for toolhub
//!
//! Values are resolved from, in increasing precedence:
//! 1. Defaults
//! 2. `TOOLHUB_*` environment variables
//! 3. A `toolhub.yaml` file

use crate::common::env_loader::EnvLoader;
use crate::mcp::DiscoveryMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILENAME: &str = "toolhub.yaml";
const ENV_PREFIX: &str = "TOOLHUB";

/// Default number of batch operations allowed in flight at once
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 5;
/// Default upper bound on the number of operations in one batch
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;
/// Default capacity of the search response cache
pub const DEFAULT_SEARCH_CACHE_SIZE: usize = 100;
/// Default number of search results returned when no limit is given
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file from disk
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        /// Path to the configuration file that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML content from a configuration file
    #[error("Invalid YAML syntax in {path}:\n{source}\n\nHint: Check for proper indentation and YAML formatting")]
    YamlParse {
        /// Path to the configuration file with invalid YAML content
        path: PathBuf,
        /// Underlying YAML parsing error
        #[source]
        source: serde_yaml::Error,
    },

    /// Invalid configuration value for a specific field
    #[error("Invalid configuration value for '{field}': {value}\n{hint}")]
    InvalidValue {
        /// Name of the field
        field: String,
        /// The rejected value
        value: String,
        /// How to fix it
        hint: String,
    },
}

impl From<ConfigError> for crate::ToolhubError {
    fn from(error: ConfigError) -> Self {
        crate::ToolhubError::Config(error.to_string())
    }
}

/// Configuration settings for a toolhub process
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum number of batch operations in flight at once (default: 5)
    pub max_concurrent_requests: usize,
    /// Maximum number of operations accepted in one batch (default: 100)
    pub max_batch_size: usize,
    /// Capacity of the search response cache (default: 100)
    pub search_cache_size: usize,
    /// Result count used when a search gives no limit (default: 10)
    pub default_search_limit: usize,
    /// How tools are advertised to clients (default: eager)
    pub discovery_mode: DiscoveryMode,
    /// Tools advertised in lazy mode
    pub essential_tools: Vec<String>,
    /// When set, eager mode only advertises these tools
    pub include_tools: Option<Vec<String>>,
    /// Tools never advertised in eager mode
    pub exclude_tools: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            search_cache_size: DEFAULT_SEARCH_CACHE_SIZE,
            default_search_limit: DEFAULT_SEARCH_LIMIT,
            discovery_mode: DiscoveryMode::Eager,
            essential_tools: vec!["search_tools".to_string(), "batch_call".to_string()],
            include_tools: None,
            exclude_tools: Vec::new(),
        }
    }
}

impl Config {
    /// Create a configuration from defaults, environment variables and the
    /// first `toolhub.yaml` found on the search path
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_env_vars();

        match Self::find_yaml_config_file() {
            Some(path) => match YamlConfig::load_from_file(&path) {
                Ok(yaml_config) => {
                    yaml_config.apply_to_config(&mut config);
                    tracing::info!("Configuration loaded from {:?}", path);
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to load YAML configuration, falling back to env vars and defaults: {}",
                        e
                    );
                }
            },
            None => tracing::debug!("No {} found, using env vars and defaults", CONFIG_FILENAME),
        }

        config
    }

    /// Create a configuration from defaults, environment variables and an explicit YAML file
    ///
    /// Unlike [`Config::new`], a broken file is an error rather than a warning.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_vars();
        YamlConfig::load_from_file(path)?.apply_to_config(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable configuration to this config
    fn apply_env_vars(&mut self) {
        let loader = EnvLoader::new(ENV_PREFIX);

        self.max_concurrent_requests =
            loader.load_parsed("MAX_CONCURRENT_REQUESTS", self.max_concurrent_requests);
        self.max_batch_size = loader.load_parsed("MAX_BATCH_SIZE", self.max_batch_size);
        self.search_cache_size = loader.load_parsed("SEARCH_CACHE_SIZE", self.search_cache_size);
        self.default_search_limit =
            loader.load_parsed("DEFAULT_SEARCH_LIMIT", self.default_search_limit);
        self.discovery_mode = loader.load_parsed("DISCOVERY_MODE", self.discovery_mode);

        if let Some(essential) = loader.load_list("ESSENTIAL_TOOLS") {
            self.essential_tools = essential;
        }
        if let Some(include) = loader.load_list("INCLUDE_TOOLS") {
            self.include_tools = Some(include);
        }
        if let Some(exclude) = loader.load_list("EXCLUDE_TOOLS") {
            self.exclude_tools = exclude;
        }
    }

    /// Find the configuration file, searching in order:
    /// 1. `./toolhub.yaml`
    /// 2. `~/.config/toolhub/toolhub.yaml`
    /// 3. `~/toolhub.yaml`
    pub fn find_yaml_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(CONFIG_FILENAME)];

        if let Some(home_dir) = dirs::home_dir() {
            search_paths.push(home_dir.join(".config").join("toolhub").join(CONFIG_FILENAME));
            search_paths.push(home_dir.join(CONFIG_FILENAME));
        }

        search_paths.into_iter().find(|path| path.is_file())
    }

    /// Validate the current configuration settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_concurrent_requests", self.max_concurrent_requests),
            ("max_batch_size", self.max_batch_size),
            ("search_cache_size", self.search_cache_size),
            ("default_search_limit", self.default_search_limit),
        ];

        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                    hint: format!("{field} must be greater than zero"),
                });
            }
        }

        Ok(())
    }

    /// Generate an example YAML configuration file content
    pub fn example_yaml_config() -> &'static str {
        r#"# toolhub.yaml

# Batch execution limits
max_concurrent_requests: 5
max_batch_size: 100

# Tool search
search_cache_size: 100
default_search_limit: 10

# Tool advertisement: eager lists every tool, lazy only the essentials
discovery_mode: eager
essential_tools:
  - search_tools
  - batch_call
exclude_tools: []
"#
    }
}

/// YAML configuration file contents; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct YamlConfig {
    /// Maximum concurrent batch operations
    pub max_concurrent_requests: Option<usize>,
    /// Maximum batch size
    pub max_batch_size: Option<usize>,
    /// Search cache capacity
    pub search_cache_size: Option<usize>,
    /// Default search limit
    pub default_search_limit: Option<usize>,
    /// Discovery mode
    pub discovery_mode: Option<DiscoveryMode>,
    /// Tools advertised in lazy mode
    pub essential_tools: Option<Vec<String>>,
    /// Positive filter for eager mode
    pub include_tools: Option<Vec<String>>,
    /// Negative filter for eager mode
    pub exclude_tools: Option<Vec<String>>,
}

impl YamlConfig {
    /// Apply YAML configuration values to an existing Config
    pub fn apply_to_config(self, config: &mut Config) {
        if let Some(v) = self.max_concurrent_requests {
            config.max_concurrent_requests = v;
        }
        if let Some(v) = self.max_batch_size {
            config.max_batch_size = v;
        }
        if let Some(v) = self.search_cache_size {
            config.search_cache_size = v;
        }
        if let Some(v) = self.default_search_limit {
            config.default_search_limit = v;
        }
        if let Some(v) = self.discovery_mode {
            config.discovery_mode = v;
        }
        if let Some(v) = self.essential_tools {
            config.essential_tools = v;
        }
        if self.include_tools.is_some() {
            config.include_tools = self.include_tools;
        }
        if let Some(v) = self.exclude_tools {
            config.exclude_tools = v;
        }
    }

    /// Load YAML configuration from a file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::info!("Loading YAML configuration from: {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
