//! Batch call tool for MCP operations
//!
//! Fans a list of tool calls out through the registry with the
//! [`ParallelExecutor`], reporting one settled entry per call.

use crate::common::McpErrorHandler;
use crate::mcp::registration::{ToolMetadata, ToolPriority};
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolRegistry};
use crate::parallel::{BatchItem, BatchOperation, ParallelExecutor};
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};

/// Name under which the batch tool is registered
pub const BATCH_CALL: &str = "batch_call";

/// Request to run several tool calls
#[derive(Debug, Clone, Deserialize)]
pub struct BatchCallRequest {
    /// Calls to run, reported in this order
    pub calls: Vec<ToolCall>,
}

/// One call inside a batch
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    /// Name of the tool
    pub tool: String,
    /// Arguments for the tool
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

/// Aggregate answer of a batch
#[derive(Debug, Serialize)]
pub struct BatchCallResponse {
    /// Number of calls
    pub total: usize,
    /// Calls that succeeded
    pub succeeded: usize,
    /// Calls that failed
    pub failed: usize,
    /// One entry per call, in submission order
    pub results: Vec<BatchItem<String, serde_json::Value, String>>,
}

/// Tool running several tool calls concurrently
pub struct BatchCallTool {
    registry: Weak<ToolRegistry>,
    executor: ParallelExecutor,
}

impl BatchCallTool {
    /// Creates a batch tool dispatching through `registry`
    pub fn new(registry: &Arc<ToolRegistry>, executor: ParallelExecutor) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            executor,
        }
    }

    /// Metadata the batch tool is registered with
    pub fn metadata() -> ToolMetadata {
        ToolMetadata::new("discovery")
            .with_priority(ToolPriority::High)
            .with_tags(["batch", "parallel", "call", "tools"])
            .helper()
    }
}

/// Run one call, treating an error result as a failure
async fn call_tool(
    registry: Arc<ToolRegistry>,
    call: ToolCall,
) -> std::result::Result<serde_json::Value, String> {
    let result = registry
        .execute(&call.tool, call.arguments)
        .await
        .map_err(|e| e.to_string())?;

    let text = BaseToolImpl::extract_text(&result);
    if BaseToolImpl::is_error(&result) {
        Err(text)
    } else {
        Ok(result_value(text))
    }
}

/// Text of a tool result, parsed as JSON when it is JSON
fn result_value(text: String) -> serde_json::Value {
    serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
}

#[async_trait]
impl McpTool for BatchCallTool {
    fn name(&self) -> &str {
        BATCH_CALL
    }

    fn description(&self) -> &str {
        include_str!("description.md")
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "calls": {
                    "type": "array",
                    "description": "Tool calls to run",
                    "maxItems": self.executor.config().max_batch_size,
                    "items": {
                        "type": "object",
                        "properties": {
                            "tool": {
                                "type": "string",
                                "description": "Name of the tool to call"
                            },
                            "arguments": {
                                "type": "object",
                                "description": "Arguments for the tool"
                            }
                        },
                        "required": ["tool"]
                    }
                }
            },
            "required": ["calls"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: BatchCallRequest = BaseToolImpl::parse_arguments(arguments)?;

        if request.calls.iter().any(|call| call.tool == BATCH_CALL) {
            return Err(McpErrorHandler::validation(format!(
                "{BATCH_CALL} cannot be called from inside a batch"
            )));
        }

        let registry = self.registry.upgrade().ok_or_else(|| {
            McpError::internal_error("Tool registry is no longer available", None)
        })?;

        let operations = request
            .calls
            .into_iter()
            .map(|call| {
                let registry = registry.clone();
                BatchOperation::new(call.tool.clone(), move || call_tool(registry, call))
            })
            .collect();

        let results = self
            .executor
            .execute_parallel(operations, Some(BATCH_CALL))
            .await
            .map_err(|e| McpErrorHandler::handle_error(e, BATCH_CALL))?;

        let failed = ParallelExecutor::errors(&results).len();
        BaseToolImpl::create_json_response(&BatchCallResponse {
            total: results.len(),
            succeeded: results.len() - failed,
            failed,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::registration::ToolRegistration;
    use crate::parallel::ParallelConfig;
    use crate::test_utils::{mock_resolver, FailingTool, PanickingTool};

    fn setup(max_batch_size: usize) -> (Arc<ToolRegistry>, BatchCallTool) {
        let registry = Arc::new(ToolRegistry::new(
            mock_resolver(),
            vec![
                ToolRegistration::new("alpha", ToolMetadata::new("general")),
                ToolRegistration::new("beta", ToolMetadata::new("general")),
            ],
        ));
        registry
            .register_resolved(
                Arc::new(FailingTool::new("broken", "backend down")),
                ToolMetadata::new("general"),
            )
            .unwrap();
        registry
            .register_resolved(
                Arc::new(PanickingTool::new("explodes")),
                ToolMetadata::new("general"),
            )
            .unwrap();

        let executor = ParallelExecutor::new(ParallelConfig {
            max_concurrent_requests: 2,
            max_batch_size,
        });
        let tool = BatchCallTool::new(&registry, executor);
        (registry, tool)
    }

    fn calls(names: &[&str]) -> serde_json::Map<String, serde_json::Value> {
        let calls: Vec<serde_json::Value> = names
            .iter()
            .map(|name| serde_json::json!({"tool": name}))
            .collect();
        serde_json::json!({ "calls": calls })
            .as_object()
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn test_batch_reports_each_call_in_order() {
        let (_registry, tool) = setup(10);
        let result = tool
            .execute(calls(&["alpha", "broken", "missing", "explodes", "beta"]))
            .await
            .unwrap();

        let body: serde_json::Value =
            serde_json::from_str(&BaseToolImpl::extract_text(&result)).unwrap();
        assert_eq!(body["total"], 5);
        assert_eq!(body["succeeded"], 2);
        assert_eq!(body["failed"], 3);

        let results = body["results"].as_array().unwrap();
        let statuses: Vec<&str> = results
            .iter()
            .map(|r| r["status"].as_str().unwrap())
            .collect();
        assert_eq!(
            statuses,
            vec!["fulfilled", "rejected", "rejected", "rejected", "fulfilled"]
        );
        assert_eq!(results[0]["key"], "alpha");
        assert_eq!(results[0]["value"], "Mock tool alpha executed");
        assert!(results[1]["reason"].as_str().unwrap().contains("backend down"));
        assert!(results[2]["reason"].as_str().unwrap().contains("not found"));
        assert_eq!(results[4]["index"], 4);
    }

    #[tokio::test]
    async fn test_oversized_batch_is_validation_error() {
        let (_registry, tool) = setup(2);
        let err = tool
            .execute(calls(&["alpha", "beta", "alpha"]))
            .await
            .unwrap_err();
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains('3') && err.message.contains('2'));
    }

    #[tokio::test]
    async fn test_nested_batch_is_rejected() {
        let (_registry, tool) = setup(10);
        assert!(tool.execute(calls(&["batch_call"])).await.is_err());
    }

    #[tokio::test]
    async fn test_dropped_registry() {
        let (registry, tool) = setup(10);
        drop(registry);
        let err = tool.execute(calls(&["alpha"])).await.unwrap_err();
        assert_eq!(err.code, rmcp::model::ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn test_result_value_parses_json() {
        assert_eq!(result_value("{\"a\":1}".into()), serde_json::json!({"a": 1}));
        assert_eq!(result_value("plain".into()), serde_json::json!("plain"));
    }
}
