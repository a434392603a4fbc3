//! Wiring of the registry, search engine and executor into one service

use crate::config::Config;
use crate::mcp::registration::{ToolRegistration, ToolResolver};
use crate::mcp::tool_registry::{ToolDescriptor, ToolRegistry};
use crate::mcp::tools::{builtin_registrations, builtin_resolver, register_discovery_tools};
use crate::parallel::{ParallelConfig, ParallelExecutor};
use crate::search::{SearchParams, SearchResponse, ToolSearchEngine};
use crate::Result;
use rmcp::model::CallToolResult;
use std::sync::Arc;

/// The registry together with the services built around it
///
/// Construction registers the `search_tools` and `batch_call` tools, which
/// resolves every static registration. An unknown token therefore fails here.
pub struct ToolHub {
    config: Config,
    registry: Arc<ToolRegistry>,
    search: Arc<ToolSearchEngine>,
    executor: ParallelExecutor,
}

impl ToolHub {
    /// Build a hub over the given registrations and resolver
    pub fn new(
        config: Config,
        registrations: Vec<ToolRegistration>,
        resolver: Arc<dyn ToolResolver>,
    ) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(ToolRegistry::new(resolver, registrations));
        let search = Arc::new(ToolSearchEngine::from_config(&registry, &config));
        let executor = ParallelExecutor::new(ParallelConfig::from(&config));

        register_discovery_tools(&registry, search.clone(), executor.clone())?;
        tracing::debug!(
            "Tool hub ready in {} mode with {} tools",
            config.discovery_mode,
            registry.resolved_count()
        );

        Ok(Self {
            config,
            registry,
            search,
            executor,
        })
    }

    /// Build a hub over the built-in tools only
    pub fn with_builtins(config: Config) -> Result<Self> {
        Self::new(config, builtin_registrations(), builtin_resolver())
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The tool registry
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// The search engine behind `search_tools`
    pub fn search_engine(&self) -> &Arc<ToolSearchEngine> {
        &self.search
    }

    /// The executor behind `batch_call`
    pub fn executor(&self) -> &ParallelExecutor {
        &self.executor
    }

    /// Tools advertised to clients under the configured discovery mode
    pub fn advertised_tools(&self) -> Result<Vec<ToolDescriptor>> {
        self.registry.definitions_by_mode(
            self.config.discovery_mode,
            &self.config.essential_tools,
            self.config.include_tools.as_deref(),
            Some(&self.config.exclude_tools),
        )
    }

    /// Search the registered tools
    pub fn search(&self, params: &SearchParams) -> Result<Arc<SearchResponse>> {
        self.search.search(params)
    }

    /// Call a tool by name
    pub async fn call(
        &self,
        name: &str,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Result<CallToolResult> {
        self.registry.execute(name, arguments).await
    }
}
