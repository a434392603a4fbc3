//! Test utilities for toolhub tests
//!
//! Shared fixtures used by unit tests and by the integration tests under
//! `tests/`: simple tool doubles, a resolver that fabricates mock tools from
//! their tokens, a strategy that counts its invocations, and a guard that
//! points `HOME` at a scratch directory.

use crate::mcp::registration::{ToolMetadata, ToolPriority, ToolRegistration, ToolResolver};
use crate::mcp::tool_registry::{BaseToolImpl, McpTool};
use crate::search::{SearchResult, SearchStrategy, StaticIndexEntry};
use crate::Result;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Tool that answers every call with a fixed success message
#[derive(Debug, Clone)]
pub struct MockTool {
    name: String,
    description: String,
}

impl MockTool {
    /// Create a mock tool
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

#[async_trait::async_trait]
impl McpTool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(
        &self,
        _arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<CallToolResult, McpError> {
        Ok(BaseToolImpl::create_success_response(format!(
            "Mock tool {} executed",
            self.name
        )))
    }
}

/// Tool whose `execute` always returns an error
#[derive(Debug, Clone)]
pub struct FailingTool {
    name: String,
    message: String,
}

impl FailingTool {
    /// Create a tool failing with `message`
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[async_trait::async_trait]
impl McpTool for FailingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }

    async fn execute(
        &self,
        _arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<CallToolResult, McpError> {
        Err(McpError::internal_error(self.message.clone(), None))
    }
}

/// Tool whose `execute` panics with the message `kaboom`
#[derive(Debug, Clone)]
pub struct PanickingTool {
    name: String,
}

impl PanickingTool {
    /// Create a panicking tool
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait::async_trait]
impl McpTool for PanickingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Always panics"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }

    async fn execute(
        &self,
        _arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<CallToolResult, McpError> {
        panic!("kaboom");
    }
}

/// Resolver turning any token into a [`MockTool`] of the same name
pub fn mock_resolver() -> Arc<dyn ToolResolver> {
    Arc::new(|token: &str| -> Result<Arc<dyn McpTool>> {
        Ok(Arc::new(MockTool::new(token, format!("Mock tool {token}"))))
    })
}

/// Registration with the given category and optional priority
pub fn registration(
    token: &str,
    category: &str,
    priority: Option<ToolPriority>,
) -> ToolRegistration {
    let metadata = ToolMetadata::new(category);
    let metadata = match priority {
        Some(priority) => metadata.with_priority(priority),
        None => metadata,
    };
    ToolRegistration::new(token, metadata)
}

/// Strategy returning a fixed score table and counting how often it runs
#[derive(Debug, Default)]
pub struct CountingStrategy {
    scores: Vec<(String, f64)>,
    calls: Arc<AtomicUsize>,
}

impl CountingStrategy {
    /// Strategy scoring the listed tool names; unlisted candidates are omitted
    pub fn with_scores<I, S>(scores: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            scores: scores.into_iter().map(|(n, s)| (n.into(), s)).collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Strategy giving every candidate a score of 0.5
    pub fn uniform() -> Self {
        Self::default()
    }

    /// Shared invocation counter
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl SearchStrategy for CountingStrategy {
    fn strategy_type(&self) -> &'static str {
        "counting"
    }

    fn search(&self, _query: &str, candidates: &[&StaticIndexEntry]) -> Vec<SearchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        candidates
            .iter()
            .filter_map(|entry| {
                let score = if self.scores.is_empty() {
                    Some(0.5)
                } else {
                    self.scores
                        .iter()
                        .find(|(name, _)| name == &entry.name)
                        .map(|(_, score)| *score)
                };
                score.map(|score| SearchResult::new(&entry.name, score, "counting"))
            })
            .collect()
    }
}

static HOME_MUTEX: Mutex<()> = Mutex::new(());

/// Points `HOME` at a directory and restores the previous value on drop
///
/// Holding the guard also serializes tests that touch `HOME`.
pub struct TestHomeGuard {
    original_home: Option<String>,
    _guard: MutexGuard<'static, ()>,
}

impl TestHomeGuard {
    /// Override `HOME` with `home`
    pub fn new(home: &Path) -> Self {
        let guard = HOME_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let original_home = std::env::var("HOME").ok();
        std::env::set_var("HOME", home);

        Self {
            original_home,
            _guard: guard,
        }
    }
}

impl Drop for TestHomeGuard {
    fn drop(&mut self) {
        match &self.original_home {
            Some(home) => std::env::set_var("HOME", home),
            None => std::env::remove_var("HOME"),
        }
    }
}
