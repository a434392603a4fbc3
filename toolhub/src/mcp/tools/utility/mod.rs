//! General purpose utility tools
//!
//! These tools have no dependencies and are resolved from their registration
//! tokens by [`resolve`].

pub mod echo;
pub mod filter_fields;

use crate::mcp::registration::ToolRegistration;
use crate::mcp::tool_registry::McpTool;
use std::sync::Arc;

/// Registrations of all utility tools
pub fn registrations() -> Vec<ToolRegistration> {
    vec![
        ToolRegistration::new(echo::ECHO, echo::EchoTool::metadata()),
        ToolRegistration::new(
            filter_fields::FILTER_FIELDS,
            filter_fields::FilterFieldsTool::metadata(),
        ),
    ]
}

/// Instantiate a utility tool from its token
pub fn resolve(token: &str) -> Option<Arc<dyn McpTool>> {
    match token {
        echo::ECHO => Some(Arc::new(echo::EchoTool::new())),
        filter_fields::FILTER_FIELDS => Some(Arc::new(filter_fields::FilterFieldsTool::new())),
        _ => None,
    }
}
