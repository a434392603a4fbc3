//! Tool search tool for MCP operations
//!
//! Exposes the [`ToolSearchEngine`] as the `search_tools` tool so clients in
//! lazy discovery mode can find the tools that were not advertised.

use crate::common::McpErrorHandler;
use crate::mcp::registration::{ToolMetadata, ToolPriority};
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolRegistry};
use crate::search::{SearchParams, ToolSearchEngine};
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;
use std::sync::{Arc, Weak};

/// Name under which the search tool is registered
pub const SEARCH_TOOLS: &str = "search_tools";

/// Tool answering free-text tool searches
pub struct SearchToolsTool {
    engine: Arc<ToolSearchEngine>,
    registry: Weak<ToolRegistry>,
}

impl SearchToolsTool {
    /// Creates a search tool over `engine`; categories are read from `registry`
    pub fn new(engine: Arc<ToolSearchEngine>, registry: &Arc<ToolRegistry>) -> Self {
        Self {
            engine,
            registry: Arc::downgrade(registry),
        }
    }

    /// Metadata the search tool is registered with
    pub fn metadata() -> ToolMetadata {
        ToolMetadata::new("discovery")
            .with_priority(ToolPriority::Critical)
            .with_tags(["search", "find", "discover", "tools"])
            .helper()
            .with_examples(vec![
                serde_json::json!({"query": "issue comments", "limit": 5}),
                serde_json::json!({"query": "*", "detailLevel": "name_only"}),
            ])
    }

    fn categories(&self) -> Vec<String> {
        self.registry
            .upgrade()
            .map(|registry| registry.categories())
            .unwrap_or_default()
    }

    fn validate(&self, params: &SearchParams) -> std::result::Result<(), McpError> {
        if let Some(category) = &params.category {
            let categories = self.categories();
            if !categories.iter().any(|known| known == category) {
                return Err(McpErrorHandler::validation(format!(
                    "Unknown category '{}'. Known categories: {}",
                    category,
                    categories.join(", ")
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl McpTool for SearchToolsTool {
    fn name(&self) -> &str {
        SEARCH_TOOLS
    }

    fn description(&self) -> &str {
        include_str!("description.md")
    }

    fn schema(&self) -> serde_json::Value {
        let mut schema = serde_json::to_value(schemars::schema_for!(SearchParams))
            .unwrap_or_else(|_| serde_json::json!({"type": "object"}));

        let categories = self.categories();
        if let Some(properties) = schema
            .get_mut("properties")
            .and_then(serde_json::Value::as_object_mut)
        {
            if !categories.is_empty() {
                properties.insert(
                    "category".to_string(),
                    serde_json::json!({
                        "type": "string",
                        "description": "Restrict results to one category",
                        "enum": categories,
                    }),
                );
            }
        }
        schema
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let params: SearchParams = BaseToolImpl::parse_arguments(arguments)?;
        self.validate(&params)?;

        tracing::debug!(
            "Searching tools for '{}' (limit {:?}, detail {})",
            params.query,
            params.limit,
            params.detail_level
        );

        let response = self
            .engine
            .search(&params)
            .map_err(|e| McpErrorHandler::handle_error(e, SEARCH_TOOLS))?;

        BaseToolImpl::create_json_response(response.as_ref())
    }
}
