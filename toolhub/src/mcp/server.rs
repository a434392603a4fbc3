//! MCP server implementation for serving the tool hub

use crate::common::McpErrorHandler;
use crate::hub::ToolHub;
use crate::mcp::tool_registry::ToolDescriptor;
use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{Error as McpError, RoleServer, ServerHandler};
use std::sync::Arc;

const INSTRUCTIONS: &str = "A tool hub with ranked tool discovery. Use search_tools to find tools that are not listed, \
with detailLevel 'full' to get their input schema, and batch_call to run several tool calls at once.";

/// MCP server dispatching protocol requests to a [`ToolHub`]
#[derive(Clone)]
pub struct McpServer {
    hub: Arc<ToolHub>,
}

impl McpServer {
    /// Create a server over a hub
    pub fn new(hub: Arc<ToolHub>) -> Self {
        Self { hub }
    }

    /// The served hub
    pub fn hub(&self) -> &Arc<ToolHub> {
        &self.hub
    }

    /// Tools to answer `tools/list` with
    pub fn advertised_tools(&self) -> std::result::Result<Vec<Tool>, McpError> {
        let tools = self
            .hub
            .advertised_tools()
            .map_err(|e| McpErrorHandler::handle_error(e, "list_tools"))?;
        Ok(tools.iter().map(ToolDescriptor::to_mcp_tool).collect())
    }

    /// Dispatch one tool call; unknown tools come back as error results
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> std::result::Result<CallToolResult, McpError> {
        self.hub
            .call(name, arguments.unwrap_or_default())
            .await
            .map_err(|e| McpErrorHandler::handle_error(e, "call_tool"))
    }
}

impl ServerHandler for McpServer {
    async fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<InitializeResult, McpError> {
        tracing::info!(
            "MCP client connecting: {} v{}",
            request.client_info.name,
            request.client_info.version
        );
        Ok(self.get_info())
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.advertised_tools()?,
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        self.dispatch(&request.name, request.arguments).await
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities {
                prompts: None,
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                resources: None,
                logging: None,
                completions: None,
                experimental: None,
            },
            server_info: Implementation {
                name: "toolhub".into(),
                version: crate::VERSION.into(),
            },
            instructions: Some(INSTRUCTIONS.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::mcp::registration::DiscoveryMode;
    use crate::mcp::tool_registry::BaseToolImpl;

    fn server(mode: DiscoveryMode) -> McpServer {
        let config = Config {
            discovery_mode: mode,
            ..Config::default()
        };
        McpServer::new(Arc::new(ToolHub::with_builtins(config).unwrap()))
    }

    #[test]
    fn test_get_info_advertises_tools() {
        let info = server(DiscoveryMode::Eager).get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.prompts.is_none());
        assert_eq!(info.server_info.name, "toolhub");
    }

    #[test]
    fn test_lazy_listing() {
        let tools = server(DiscoveryMode::Lazy).advertised_tools().unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert_eq!(names, vec!["search_tools", "batch_call"]);
    }

    #[tokio::test]
    async fn test_unadvertised_tool_is_still_callable() {
        let server = server(DiscoveryMode::Lazy);
        let arguments = serde_json::json!({"message": "hidden"})
            .as_object()
            .cloned();
        let result = server.dispatch("echo", arguments).await.unwrap();
        assert_eq!(BaseToolImpl::extract_text(&result), "hidden");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error_result() {
        let result = server(DiscoveryMode::Eager)
            .dispatch("nope", None)
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(BaseToolImpl::extract_text(&result).contains("Available tools"));
    }
}
