//! Echo tool for MCP operations

use crate::mcp::registration::{ToolMetadata, ToolPriority};
use crate::mcp::tool_registry::{BaseToolImpl, McpTool};
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;
use serde::Deserialize;

/// Registration token and name of the echo tool
pub const ECHO: &str = "echo";

#[derive(Debug, Deserialize)]
struct EchoRequest {
    message: String,
}

/// Tool returning its message unchanged
#[derive(Default)]
pub struct EchoTool;

impl EchoTool {
    /// Creates a new instance of the EchoTool
    pub fn new() -> Self {
        Self
    }

    /// Metadata the echo tool is registered with
    pub fn metadata() -> ToolMetadata {
        ToolMetadata::new("utility")
            .with_priority(ToolPriority::Low)
            .with_tags(["echo", "ping", "test"])
            .with_examples(vec![serde_json::json!({"message": "hello"})])
    }
}

#[async_trait]
impl McpTool for EchoTool {
    fn name(&self) -> &str {
        ECHO
    }

    fn description(&self) -> &str {
        include_str!("description.md")
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "Text to echo back"
                }
            },
            "required": ["message"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: EchoRequest = BaseToolImpl::parse_arguments(arguments)?;
        Ok(BaseToolImpl::create_success_response(request.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_returns_message() {
        let mut arguments = serde_json::Map::new();
        arguments.insert("message".into(), serde_json::json!("hello there"));

        let result = EchoTool::new().execute(arguments).await.unwrap();
        assert_eq!(BaseToolImpl::extract_text(&result), "hello there");
        assert_eq!(result.is_error, Some(false));
    }

    #[tokio::test]
    async fn test_echo_requires_message() {
        assert!(EchoTool::new()
            .execute(serde_json::Map::new())
            .await
            .is_err());
    }
}
