//! Tool registry for MCP operations
//!
//! The registry owns the process-wide tool collection. It is built from a static
//! list of [`ToolRegistration`]s plus an injected [`ToolResolver`], resolves every
//! tool lazily on first use, and dispatches calls by name. A failing tool is
//! always converted into an error result here; nothing a tool does escapes
//! [`ToolRegistry::execute`] as an error or a panic.

use super::registration::{
    CategoryFilter, DiscoveryMode, ToolMetadata, ToolRegistration, ToolResolver,
};
use crate::{Result, ToolhubError};
use dashmap::DashMap;
use futures::FutureExt;
use once_cell::sync::OnceCell;
use rmcp::model::{Annotated, CallToolResult, RawContent, RawTextContent, Tool};
use rmcp::Error as McpError;
use serde::Serialize;
use std::any::Any;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Wire-level description of a tool
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Globally unique tool name
    pub name: String,
    /// Human readable description
    pub description: String,
    /// JSON Schema of the arguments
    pub input_schema: serde_json::Value,
}

impl ToolDescriptor {
    /// Convert into the protocol `Tool` type used in `list_tools` responses
    pub fn to_mcp_tool(&self) -> Tool {
        let schema_map = match &self.input_schema {
            serde_json::Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };

        Tool {
            name: self.name.clone().into(),
            description: Some(self.description.clone().into()),
            input_schema: Arc::new(schema_map),
            annotations: None,
        }
    }
}

/// Trait defining the interface for all MCP tools
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Get the tool's name
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str;

    /// Get the tool's JSON schema for arguments
    fn schema(&self) -> serde_json::Value;

    /// Full descriptor of the tool
    fn definition(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.schema(),
        }
    }

    /// Execute the tool with the given arguments
    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<CallToolResult, McpError>;
}

#[derive(Clone)]
struct RegisteredTool {
    tool: Arc<dyn McpTool>,
    metadata: ToolMetadata,
}

/// Registry for managing MCP tools
pub struct ToolRegistry {
    resolver: Arc<dyn ToolResolver>,
    registrations: Vec<ToolRegistration>,
    tools: DashMap<String, RegisteredTool>,
    initialized: OnceCell<()>,
}

impl ToolRegistry {
    /// Create a registry; no tool is resolved until the registry is first queried
    pub fn new(resolver: Arc<dyn ToolResolver>, registrations: Vec<ToolRegistration>) -> Self {
        Self {
            resolver,
            registrations,
            tools: DashMap::new(),
            initialized: OnceCell::new(),
        }
    }

    /// Resolve every registration exactly once
    ///
    /// The first caller performs the work; concurrent callers block until it is
    /// done and then observe the completed state. Tools become visible only
    /// after every registration resolved. A failed initialization leaves the
    /// registry empty and is not memoized, so the next query retries and
    /// reports the same error.
    fn ensure_initialized(&self) -> Result<()> {
        self.initialized
            .get_or_try_init(|| {
                tracing::debug!(
                    "Resolving {} tool registrations",
                    self.registrations.len()
                );

                let mut resolved: HashMap<String, RegisteredTool> =
                    HashMap::with_capacity(self.registrations.len());
                for registration in &self.registrations {
                    let tool = self.resolver.resolve(&registration.token)?;
                    let name = tool.name().to_string();

                    if resolved.contains_key(&name) {
                        return Err(ToolhubError::Config(format!(
                            "Duplicate tool name '{name}' (token '{}')",
                            registration.token
                        )));
                    }

                    resolved.insert(
                        name,
                        RegisteredTool {
                            tool,
                            metadata: registration.metadata.clone(),
                        },
                    );
                }

                for (name, registered) in resolved {
                    self.tools.insert(name, registered);
                }
                tracing::info!("Tool registry initialized with {} tools", self.tools.len());
                Ok(())
            })
            .map(|_| ())
    }

    /// Snapshot of all tools ordered by priority rank, then by name
    fn sorted_tools(&self) -> Result<Vec<(String, RegisteredTool)>> {
        self.ensure_initialized()?;

        let mut entries: Vec<(String, RegisteredTool)> = self
            .tools
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        entries.sort_by(|(a_name, a), (b_name, b)| {
            a.metadata
                .priority
                .rank()
                .cmp(&b.metadata.priority.rank())
                .then_with(|| a_name.cmp(b_name))
        });

        Ok(entries)
    }

    /// All tool descriptors sorted by priority rank, then name
    ///
    /// Recomputed on every call so late registrations are always visible.
    pub fn definitions(&self) -> Result<Vec<ToolDescriptor>> {
        Ok(self
            .sorted_tools()?
            .into_iter()
            .map(|(_, registered)| registered.tool.definition())
            .collect())
    }

    /// Descriptors of the tools passing a category filter
    ///
    /// Ordered as in [`definitions`](Self::definitions).
    pub fn definitions_by_categories(
        &self,
        filter: &CategoryFilter,
    ) -> Result<Vec<ToolDescriptor>> {
        Ok(self
            .sorted_tools()?
            .into_iter()
            .filter(|(_, registered)| filter.matches(&registered.metadata))
            .map(|(_, registered)| registered.tool.definition())
            .collect())
    }

    /// Descriptors advertised for a discovery mode
    ///
    /// Eager mode returns every tool minus `exclude`, intersected with `include`
    /// when given. Lazy mode returns exactly the tools named in `essential`.
    pub fn definitions_by_mode(
        &self,
        mode: DiscoveryMode,
        essential: &[String],
        include: Option<&[String]>,
        exclude: Option<&[String]>,
    ) -> Result<Vec<ToolDescriptor>> {
        let entries = self.sorted_tools()?;

        let selected: Vec<ToolDescriptor> = match mode {
            DiscoveryMode::Eager => {
                let include: Option<HashSet<&str>> =
                    include.map(|names| names.iter().map(String::as_str).collect());
                let exclude: HashSet<&str> = exclude
                    .unwrap_or_default()
                    .iter()
                    .map(String::as_str)
                    .collect();

                entries
                    .into_iter()
                    .filter(|(name, _)| !exclude.contains(name.as_str()))
                    .filter(|(name, _)| {
                        include
                            .as_ref()
                            .map_or(true, |allowed| allowed.contains(name.as_str()))
                    })
                    .map(|(_, registered)| registered.tool.definition())
                    .collect()
            }
            DiscoveryMode::Lazy => {
                let essential: HashSet<&str> = essential.iter().map(String::as_str).collect();
                entries
                    .into_iter()
                    .filter(|(name, _)| essential.contains(name.as_str()))
                    .map(|(_, registered)| registered.tool.definition())
                    .collect()
            }
        };

        tracing::debug!("Advertising {} tools in {} mode", selected.len(), mode);
        Ok(selected)
    }

    /// Descriptor and metadata of every tool, in [`definitions`](Self::definitions) order
    pub fn entries(&self) -> Result<Vec<(ToolDescriptor, ToolMetadata)>> {
        Ok(self
            .sorted_tools()?
            .into_iter()
            .map(|(_, registered)| (registered.tool.definition(), registered.metadata))
            .collect())
    }

    /// Get a tool by name
    pub fn get_tool(&self, name: &str) -> Result<Option<Arc<dyn McpTool>>> {
        self.ensure_initialized()?;
        Ok(self.tools.get(name).map(|entry| entry.tool.clone()))
    }

    /// Get a tool only if it is already resolved, never triggering initialization
    pub fn resolved_tool(&self, name: &str) -> Option<Arc<dyn McpTool>> {
        self.tools.get(name).map(|entry| entry.tool.clone())
    }

    /// Get the metadata of a tool by name
    pub fn get_metadata(&self, name: &str) -> Result<Option<ToolMetadata>> {
        self.ensure_initialized()?;
        Ok(self.tools.get(name).map(|entry| entry.metadata.clone()))
    }

    /// All tool instances, in [`definitions`](Self::definitions) order
    pub fn get_all_tools(&self) -> Result<Vec<Arc<dyn McpTool>>> {
        Ok(self
            .sorted_tools()?
            .into_iter()
            .map(|(_, registered)| registered.tool)
            .collect())
    }

    /// All registered tool names, sorted
    pub fn list_tool_names(&self) -> Result<Vec<String>> {
        self.ensure_initialized()?;
        let mut names: Vec<String> = self.tools.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    /// All tools as protocol `Tool` objects for a `list_tools` response
    pub fn list_tools(&self) -> Result<Vec<Tool>> {
        Ok(self
            .definitions()?
            .iter()
            .map(ToolDescriptor::to_mcp_tool)
            .collect())
    }

    /// Distinct categories declared by the registrations and late-registered tools
    ///
    /// Does not resolve any tool.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: BTreeSet<String> = self
            .registrations
            .iter()
            .map(|r| r.metadata.category.clone())
            .collect();
        categories.extend(self.tools.iter().map(|e| e.metadata.category.clone()));
        categories.into_iter().collect()
    }

    /// Add an already-resolved tool after construction
    ///
    /// Used for tools that depend on the registry or on services built after it,
    /// such as the search tool. Initialization is forced first so the static
    /// registrations are never shadowed.
    pub fn register_resolved(&self, tool: Arc<dyn McpTool>, metadata: ToolMetadata) -> Result<()> {
        self.ensure_initialized()?;

        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            tracing::warn!("Replacing already registered tool '{}'", name);
        }

        tracing::info!("Registered tool '{}' ({})", name, metadata.category);
        self.tools.insert(name, RegisteredTool { tool, metadata });
        Ok(())
    }

    /// Number of tools currently resolved
    ///
    /// Zero until the registry has been queried for the first time.
    pub fn resolved_count(&self) -> usize {
        self.tools.len()
    }

    /// Number of registered tools, initializing the registry if needed
    pub fn len(&self) -> Result<usize> {
        self.ensure_initialized()?;
        Ok(self.tools.len())
    }

    /// Whether the registry holds no tools
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Execute a tool by name
    ///
    /// Unknown names and tool failures (errors or panics) come back as results
    /// with `is_error` set. Only a failure to initialize the registry is returned
    /// as `Err`.
    pub async fn execute(
        &self,
        name: &str,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Result<CallToolResult> {
        self.ensure_initialized()?;

        let Some(tool) = self.tools.get(name).map(|entry| entry.tool.clone()) else {
            let available = self.list_tool_names()?.join(", ");
            tracing::warn!("Call to unknown tool '{}'", name);
            return Ok(BaseToolImpl::create_error_response(
                ToolhubError::ToolNotFound(name.to_string()).to_string(),
                Some(format!("Available tools: {available}")),
            ));
        };

        tracing::debug!("Executing tool '{}'", name);

        let outcome = AssertUnwindSafe(tool.execute(arguments))
            .catch_unwind()
            .await;

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(error)) => {
                tracing::warn!("Tool '{}' failed: {}", name, error.message);
                let failure = ToolhubError::ToolExecution {
                    name: name.to_string(),
                    message: error.message.to_string(),
                };
                BaseToolImpl::create_error_response(failure.to_string(), None)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!("Tool '{}' panicked: {}", name, message);
                let failure = ToolhubError::ToolExecution {
                    name: name.to_string(),
                    message,
                };
                BaseToolImpl::create_error_response(failure.to_string(), None)
            }
        };

        Ok(result)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Base implementation providing common utility methods for MCP tools
pub struct BaseToolImpl;

impl BaseToolImpl {
    /// Parse tool arguments from a JSON map into a typed struct
    pub fn parse_arguments<T: serde::de::DeserializeOwned>(
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<T, McpError> {
        serde_json::from_value(serde_json::Value::Object(arguments))
            .map_err(|e| McpError::invalid_params(format!("Invalid arguments: {e}"), None))
    }

    /// Create a success response with text content
    pub fn create_success_response<T: Into<String>>(content: T) -> CallToolResult {
        CallToolResult {
            content: vec![Annotated::new(
                RawContent::Text(RawTextContent {
                    text: content.into(),
                }),
                None,
            )],
            is_error: Some(false),
        }
    }

    /// Create a success response holding pretty-printed JSON
    pub fn create_json_response<T: Serialize>(
        value: &T,
    ) -> std::result::Result<CallToolResult, McpError> {
        let text = serde_json::to_string_pretty(value).map_err(|e| {
            McpError::internal_error(format!("Failed to serialize response: {e}"), None)
        })?;
        Ok(Self::create_success_response(text))
    }

    /// Create an error response with the given error message
    pub fn create_error_response<T: Into<String>>(
        error: T,
        details: Option<String>,
    ) -> CallToolResult {
        let error_text = match details {
            Some(details) => format!("{}: {}", error.into(), details),
            None => error.into(),
        };

        CallToolResult {
            content: vec![Annotated::new(
                RawContent::Text(RawTextContent { text: error_text }),
                None,
            )],
            is_error: Some(true),
        }
    }

    /// Concatenated text content of a result
    pub fn extract_text(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|content| match &content.raw {
                RawContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether a result reports an error
    pub fn is_error(result: &CallToolResult) -> bool {
        result.is_error.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::registration::ToolPriority;
    use crate::test_utils::{mock_resolver, registration, FailingTool, MockTool, PanickingTool};
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry_of(specs: &[(&str, Option<ToolPriority>)]) -> ToolRegistry {
        let registrations = specs
            .iter()
            .map(|(name, priority)| registration(name, "general", *priority))
            .collect();
        ToolRegistry::new(mock_resolver(), registrations)
    }

    #[test]
    fn test_construction_does_not_resolve() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let resolver = move |token: &str| -> Result<Arc<dyn McpTool>> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MockTool::new(token, "counted")))
        };

        let registry = ToolRegistry::new(
            Arc::new(resolver),
            vec![registration("a", "general", None), registration("b", "general", None)],
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(registry.resolved_count(), 0);

        registry.definitions().unwrap();
        registry.definitions().unwrap();
        registry.get_tool("a").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(registry.resolved_count(), 2);
    }

    #[test]
    fn test_definitions_sorted_by_priority_then_name() {
        let registry = registry_of(&[
            ("B", Some(ToolPriority::Low)),
            ("C", None),
            ("A", Some(ToolPriority::Critical)),
        ]);

        let names: Vec<String> = registry
            .definitions()
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["A", "C", "B"]);
    }

    #[test]
    fn test_definitions_include_late_registrations() {
        let registry = registry_of(&[("alpha", None)]);
        assert_eq!(registry.definitions().unwrap().len(), 1);

        registry
            .register_resolved(
                Arc::new(MockTool::new("search_tools", "Find tools")),
                ToolMetadata::new("discovery").with_priority(ToolPriority::Critical),
            )
            .unwrap();

        let names: Vec<String> = registry
            .definitions()
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["search_tools", "alpha"]);
    }

    #[test]
    fn test_unknown_token_is_fatal() {
        let resolver = |token: &str| -> Result<Arc<dyn McpTool>> {
            Err(ToolhubError::UnknownToolToken(token.to_string()))
        };
        let registry =
            ToolRegistry::new(Arc::new(resolver), vec![registration("ghost", "general", None)]);

        let err = registry.definitions().unwrap_err();
        assert!(matches!(err, ToolhubError::UnknownToolToken(ref t) if t == "ghost"));
    }

    #[test]
    fn test_failed_init_leaves_registry_empty_and_retries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let resolver = move |token: &str| -> Result<Arc<dyn McpTool>> {
            counter.fetch_add(1, Ordering::SeqCst);
            match token {
                "ghost" => Err(ToolhubError::UnknownToolToken(token.to_string())),
                _ => Ok(Arc::new(MockTool::new(token, "resolvable"))),
            }
        };
        let registry = ToolRegistry::new(
            Arc::new(resolver),
            vec![registration("a", "general", None), registration("ghost", "general", None)],
        );

        for attempt in 1..=2 {
            let err = registry.definitions().unwrap_err();
            assert!(
                matches!(err, ToolhubError::UnknownToolToken(ref t) if t == "ghost"),
                "attempt {attempt}: {err}"
            );
            assert_eq!(registry.resolved_count(), 0);
            assert!(registry.resolved_tool("a").is_none());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_get_all_tools_follows_definition_order() {
        let registry = registry_of(&[("zeta", None), ("alpha", Some(ToolPriority::Low))]);
        registry
            .register_resolved(
                Arc::new(MockTool::new("search_tools", "Find tools")),
                ToolMetadata::new("discovery").with_priority(ToolPriority::Critical),
            )
            .unwrap();

        let tools: Vec<String> = registry
            .get_all_tools()
            .unwrap()
            .iter()
            .map(|tool| tool.name().to_string())
            .collect();
        let definitions: Vec<String> = registry
            .definitions()
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();

        assert_eq!(tools, vec!["search_tools", "zeta", "alpha"]);
        assert_eq!(tools, definitions);
    }

    #[test]
    fn test_duplicate_tool_names_rejected() {
        let resolver =
            |_: &str| -> Result<Arc<dyn McpTool>> { Ok(Arc::new(MockTool::new("same", "dup"))) };
        let registry = ToolRegistry::new(
            Arc::new(resolver),
            vec![registration("one", "general", None), registration("two", "general", None)],
        );
        assert!(matches!(
            registry.definitions().unwrap_err(),
            ToolhubError::Config(_)
        ));
    }

    #[test]
    fn test_definitions_by_categories() {
        let registrations = vec![
            ToolRegistration::new("get_issue", ToolMetadata::new("issues")),
            ToolRegistration::new(
                "add_comment",
                ToolMetadata::new("issues").with_subcategory("comments"),
            ),
            ToolRegistration::new("get_user", ToolMetadata::new("users")),
        ];
        let registry = ToolRegistry::new(mock_resolver(), registrations);

        let all = registry
            .definitions_by_categories(&CategoryFilter::all())
            .unwrap();
        assert_eq!(all.len(), 3);

        let users = registry
            .definitions_by_categories(&CategoryFilter::default().with_category("users"))
            .unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "get_user");

        let comments = registry
            .definitions_by_categories(
                &CategoryFilter::default().with_subcategory("issues", "comments"),
            )
            .unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].name, "add_comment");
    }

    #[test]
    fn test_definitions_by_mode() {
        let registry = registry_of(&[("a", None), ("b", None), ("c", None)]);
        let names = |defs: Vec<ToolDescriptor>| -> Vec<String> {
            defs.into_iter().map(|d| d.name).collect()
        };

        let eager = registry
            .definitions_by_mode(DiscoveryMode::Eager, &[], None, None)
            .unwrap();
        assert_eq!(names(eager), vec!["a", "b", "c"]);

        let excluded = registry
            .definitions_by_mode(DiscoveryMode::Eager, &[], None, Some(&["b".to_string()]))
            .unwrap();
        assert_eq!(names(excluded), vec!["a", "c"]);

        let included = registry
            .definitions_by_mode(
                DiscoveryMode::Eager,
                &[],
                Some(&["a".to_string(), "b".to_string()]),
                Some(&["b".to_string()]),
            )
            .unwrap();
        assert_eq!(names(included), vec!["a"]);

        let lazy = registry
            .definitions_by_mode(
                DiscoveryMode::Lazy,
                &["c".to_string(), "missing".to_string()],
                None,
                None,
            )
            .unwrap();
        assert_eq!(names(lazy), vec!["c"]);
    }

    #[tokio::test]
    async fn test_execute_dispatches_by_name() {
        let registry = registry_of(&[("echo_like", None)]);
        let result = registry
            .execute("echo_like", serde_json::Map::new())
            .await
            .unwrap();

        assert!(!BaseToolImpl::is_error(&result));
        assert_eq!(
            BaseToolImpl::extract_text(&result),
            "Mock tool echo_like executed"
        );
    }

    #[tokio::test]
    async fn test_execute_unknown_tool_lists_known_names() {
        let registry = registry_of(&[("zeta", None), ("alpha", None)]);
        let result = registry
            .execute("nope", serde_json::Map::new())
            .await
            .unwrap();

        assert!(BaseToolImpl::is_error(&result));
        let text = BaseToolImpl::extract_text(&result);
        assert!(text.starts_with("Tool not found: nope"));
        assert!(text.contains("alpha, zeta"));
    }

    #[tokio::test]
    async fn test_execute_converts_tool_error() {
        let registry = registry_of(&[]);
        registry
            .register_resolved(
                Arc::new(FailingTool::new("broken", "upstream timed out")),
                ToolMetadata::new("general"),
            )
            .unwrap();

        let result = registry
            .execute("broken", serde_json::Map::new())
            .await
            .unwrap();
        assert!(BaseToolImpl::is_error(&result));
        assert!(BaseToolImpl::extract_text(&result).contains("upstream timed out"));
    }

    #[tokio::test]
    async fn test_execute_contains_panics() {
        let registry = registry_of(&[("healthy", None)]);
        registry
            .register_resolved(
                Arc::new(PanickingTool::new("explodes")),
                ToolMetadata::new("general"),
            )
            .unwrap();

        let result = registry
            .execute("explodes", serde_json::Map::new())
            .await
            .unwrap();
        assert!(BaseToolImpl::is_error(&result));
        assert!(BaseToolImpl::extract_text(&result).contains("kaboom"));

        let healthy = registry
            .execute("healthy", serde_json::Map::new())
            .await
            .unwrap();
        assert!(!BaseToolImpl::is_error(&healthy));
    }

    #[test]
    fn test_categories_do_not_resolve() {
        let registrations = vec![
            ToolRegistration::new("x", ToolMetadata::new("users")),
            ToolRegistration::new("y", ToolMetadata::new("issues")),
            ToolRegistration::new("z", ToolMetadata::new("issues")),
        ];
        let registry = ToolRegistry::new(mock_resolver(), registrations);

        assert_eq!(registry.categories(), vec!["issues", "users"]);
        assert_eq!(registry.resolved_count(), 0);
    }

    #[test]
    fn test_list_tools_converts_schema() {
        let registry = registry_of(&[("solo", None)]);
        let tools = registry.list_tools().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "solo");
        assert_eq!(
            tools[0].input_schema.get("type"),
            Some(&serde_json::json!("object"))
        );
    }

    #[test]
    fn test_concurrent_first_use_resolves_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let resolver = move |token: &str| -> Result<Arc<dyn McpTool>> {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            Ok(Arc::new(MockTool::new(token, "slow")))
        };
        let registry = Arc::new(ToolRegistry::new(
            Arc::new(resolver),
            vec![registration("a", "general", None), registration("b", "general", None)],
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.definitions().unwrap().len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_base_tool_impl_parse_arguments_error() {
        #[derive(serde::Deserialize, Debug)]
        struct TestArgs {
            #[serde(rename = "required_field")]
            _required_field: String,
        }

        let result: std::result::Result<TestArgs, McpError> =
            BaseToolImpl::parse_arguments(serde_json::Map::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_base_tool_impl_create_error_response_with_details() {
        let response = BaseToolImpl::create_error_response(
            "Error message",
            Some("Additional details".to_string()),
        );

        assert_eq!(response.is_error, Some(true));
        assert_eq!(
            BaseToolImpl::extract_text(&response),
            "Error message: Additional details"
        );
    }

    fn priority_strategy() -> impl Strategy<Value = Option<ToolPriority>> {
        prop_oneof![
            Just(None),
            Just(Some(ToolPriority::Critical)),
            Just(Some(ToolPriority::High)),
            Just(Some(ToolPriority::Normal)),
            Just(Some(ToolPriority::Low)),
        ]
    }

    proptest! {
        #[test]
        fn prop_definitions_ordered(
            specs in proptest::collection::btree_map("[a-z_]{1,12}", priority_strategy(), 0..20)
        ) {
            let registrations: Vec<ToolRegistration> = specs
                .iter()
                .map(|(name, priority)| registration(name, "general", *priority))
                .collect();
            let registry = ToolRegistry::new(mock_resolver(), registrations);
            let definitions = registry.definitions().unwrap();
            prop_assert_eq!(definitions.len(), specs.len());

            let keys: Vec<(u8, String)> = definitions
                .iter()
                .map(|d| {
                    let priority = specs[&d.name].unwrap_or_default();
                    (priority.rank(), d.name.clone())
                })
                .collect();
            for pair in keys.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }
    }
}
