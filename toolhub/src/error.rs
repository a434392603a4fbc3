//! Unified error handling for the toolhub library
//!
//! Errors here are the *structural* failures: a misconfigured deployment, an
//! unknown registration token, an oversized batch. Failures that belong to a
//! single unit of work (one tool call, one batch item) never surface as a
//! `ToolhubError` out of the registry or the executor; they are reported inline.

use thiserror::Error;

/// The main error type for the toolhub library
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ToolhubError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The resolver does not know how to build a registered token
    #[error("Unknown tool token '{0}': no resolver binding registered")]
    UnknownToolToken(String),

    /// A batch was submitted with more operations than the executor accepts
    #[error("Batch size {size} exceeds maximum allowed batch size of {max}")]
    BatchTooLarge {
        /// Number of operations submitted
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// Tool not found in the registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// A tool failed while executing
    #[error("Tool '{name}' failed: {message}")]
    ToolExecution {
        /// Name of the failing tool
        name: String,
        /// Message preserved from the underlying failure
        message: String,
    },

    /// Malformed input parameters
    #[error("Validation error: {0}")]
    Validation(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl ToolhubError {
    /// Whether the error was caused by caller input rather than the system
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ToolhubError::Validation(_)
                | ToolhubError::ToolNotFound(_)
                | ToolhubError::BatchTooLarge { .. }
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ToolhubError>;
