//! MCP error conversion utilities
//!
//! Maps [`ToolhubError`] onto the protocol error type used by tools:
//! caller mistakes become `invalid_params`, everything else `internal_error`.

use crate::ToolhubError;
use rmcp::Error as McpError;

/// Common error handling patterns for MCP operations
pub struct McpErrorHandler;

impl McpErrorHandler {
    /// Convert a [`ToolhubError`] to an MCP error, logging it with the operation name
    pub fn handle_error(error: ToolhubError, operation: &str) -> McpError {
        tracing::error!("MCP operation '{}' failed: {}", operation, error);

        if error.is_user_error() {
            McpError::invalid_params(error.to_string(), None)
        } else {
            McpError::internal_error(error.to_string(), None)
        }
    }

    /// Build the validation error returned for malformed tool arguments
    pub fn validation(message: impl Into<String>) -> McpError {
        McpError::invalid_params(message.into(), None)
    }
}
