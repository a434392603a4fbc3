//! Error handling for the toolhub CLI
//!
//! Errors keep their source chain and carry the exit code the process should
//! end with.

use crate::exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_WARNING};
use std::error::Error;
use std::fmt;
use toolhub::ToolhubError;

/// CLI-specific result type that preserves error information
pub type CliResult<T> = Result<T, CliError>;

/// A failed command: what to print and which code to exit with
#[derive(Debug)]
pub struct CliError {
    /// Printed to stderr as `Error: <message>`
    pub message: String,
    /// Process exit code
    pub exit_code: i32,
    /// Underlying error, walked by [`CliError::full_chain`]
    pub source: Option<Box<dyn Error + Send + Sync>>,
}

impl CliError {
    /// Error without an underlying cause
    pub fn new(message: impl Into<String>, exit_code: i32) -> Self {
        Self {
            message: message.into(),
            exit_code,
            source: None,
        }
    }

    /// Wrap `error`, keeping it as the source
    pub fn from_error<E: Error + Send + Sync + 'static>(error: E, exit_code: i32) -> Self {
        Self {
            message: error.to_string(),
            exit_code,
            source: Some(Box::new(error)),
        }
    }

    /// Create a CLI error with exit code 1
    pub fn general<E: Error + Send + Sync + 'static>(error: E) -> Self {
        Self::from_error(error, EXIT_WARNING)
    }

    /// Create a CLI error with exit code 2
    pub fn validation<E: Error + Send + Sync + 'static>(error: E) -> Self {
        Self::from_error(error, EXIT_ERROR)
    }

    /// The message followed by one `Caused by:` line per nested source
    pub fn full_chain(&self) -> String {
        let mut result = self.message.clone();

        let mut current_source = self.source.as_deref().and_then(|e| e.source());
        while let Some(err) = current_source {
            result.push_str(&format!("\n  Caused by: {}", err));
            current_source = err.source();
        }

        result
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

impl From<ToolhubError> for CliError {
    fn from(error: ToolhubError) -> Self {
        let exit_code = match &error {
            ToolhubError::Config(_) | ToolhubError::UnknownToolToken(_) => EXIT_ERROR,
            e if e.is_user_error() => EXIT_ERROR,
            _ => EXIT_WARNING,
        };
        Self::from_error(error, exit_code)
    }
}

impl From<toolhub::ConfigError> for CliError {
    fn from(error: toolhub::ConfigError) -> Self {
        Self::validation(error)
    }
}

/// Attach an exit code to a foreign error on the way out of a command
pub trait IntoCliResult<T> {
    /// Runtime failure, exit code 1
    fn cli_general_error(self) -> CliResult<T>;
    /// Bad input, exit code 2
    fn cli_validation_error(self) -> CliResult<T>;
}

impl<T, E: Error + Send + Sync + 'static> IntoCliResult<T> for Result<T, E> {
    fn cli_general_error(self) -> CliResult<T> {
        self.map_err(CliError::general)
    }

    fn cli_validation_error(self) -> CliResult<T> {
        self.map_err(CliError::validation)
    }
}

/// Exit code for a command result; failures are printed to stderr first
pub fn handle_cli_result<T>(result: CliResult<T>) -> i32 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed with exit code {}", e.exit_code);
            eprintln!("Error: {}", e.full_chain());
            e.exit_code
        }
    }
}
