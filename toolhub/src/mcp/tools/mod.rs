//! Built-in MCP tools
//!
//! Each tool lives in `<group>/<tool>/mod.rs` next to the `description.md`
//! it advertises. Utility tools are statically registered and resolved by
//! token; discovery tools are registered late by [`ToolHub`](crate::ToolHub).

pub mod discovery;
pub mod utility;

use crate::mcp::registration::{ToolRegistration, ToolResolver};
use crate::mcp::tool_registry::McpTool;
use crate::{Result, ToolhubError};
use std::sync::Arc;

pub use discovery::batch::{BatchCallTool, BATCH_CALL};
pub use discovery::register_discovery_tools;
pub use discovery::search::{SearchToolsTool, SEARCH_TOOLS};
pub use utility::echo::{EchoTool, ECHO};
pub use utility::filter_fields::{filter_fields, FilterFieldsTool, FILTER_FIELDS};

/// Static registrations of the built-in tools
pub fn builtin_registrations() -> Vec<ToolRegistration> {
    utility::registrations()
}

/// Resolver for the tokens of [`builtin_registrations`]
pub fn builtin_resolver() -> Arc<dyn ToolResolver> {
    Arc::new(|token: &str| -> Result<Arc<dyn McpTool>> {
        utility::resolve(token).ok_or_else(|| ToolhubError::UnknownToolToken(token.to_string()))
    })
}
