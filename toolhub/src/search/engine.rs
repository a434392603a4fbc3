//! Ranked tool search with cached responses

use super::cache::{CacheKey, SearchCache};
use super::index::StaticIndexEntry;
use super::strategy::{SearchStrategy, WeightedStrategy};
use super::types::{
    round_score, CacheStats, DetailLevel, FormattedTool, SearchParams, SearchResponse,
    SearchResult,
};
use crate::config::{Config, DEFAULT_SEARCH_CACHE_SIZE, DEFAULT_SEARCH_LIMIT};
use crate::mcp::tool_registry::ToolRegistry;
use crate::{Result, ToolhubError};
use once_cell::sync::OnceCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Query that matches every tool passing the filters
const MATCH_ALL: &str = "*";

/// Search engine over the tools of a [`ToolRegistry`]
///
/// The static index is either supplied up front or derived from the registry
/// the first time it is needed, and then never rebuilt. Responses are cached
/// per normalized request. The engine only holds a weak reference to the
/// registry, so a registry may own a tool that owns the engine.
pub struct ToolSearchEngine {
    registry: Weak<ToolRegistry>,
    strategy: Box<dyn SearchStrategy>,
    index: OnceCell<Arc<Vec<StaticIndexEntry>>>,
    cache: SearchCache,
    default_limit: usize,
}

impl ToolSearchEngine {
    /// Engine using the weighted strategy, a derived index and default sizes
    pub fn new(registry: &Arc<ToolRegistry>) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            strategy: Box::new(WeightedStrategy::default()),
            index: OnceCell::new(),
            cache: SearchCache::new(DEFAULT_SEARCH_CACHE_SIZE),
            default_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Engine sized from configuration
    pub fn from_config(registry: &Arc<ToolRegistry>, config: &Config) -> Self {
        Self::new(registry)
            .with_cache_capacity(config.search_cache_size)
            .with_default_limit(config.default_search_limit)
    }

    /// Replace the scoring strategy
    pub fn with_strategy(mut self, strategy: impl SearchStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    /// Use a prebuilt index instead of deriving one from the registry
    pub fn with_index(mut self, entries: Vec<StaticIndexEntry>) -> Self {
        self.index = OnceCell::with_value(Arc::new(entries));
        self
    }

    /// Set the number of cached responses
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = SearchCache::new(capacity);
        self
    }

    /// Set the limit used when a request has none (or zero)
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    /// The static index, deriving it from the registry on first use
    pub fn index(&self) -> Result<Arc<Vec<StaticIndexEntry>>> {
        self.index
            .get_or_try_init(|| {
                let registry = self.registry()?;
                let entries: Vec<StaticIndexEntry> = registry
                    .entries()?
                    .iter()
                    .map(|(descriptor, metadata)| StaticIndexEntry::from_tool(descriptor, metadata))
                    .collect();

                tracing::debug!("Derived search index with {} entries", entries.len());
                Ok(Arc::new(entries))
            })
            .cloned()
    }

    fn registry(&self) -> Result<Arc<ToolRegistry>> {
        self.registry
            .upgrade()
            .ok_or_else(|| ToolhubError::Other("Tool registry is no longer available".into()))
    }

    fn cache_key(&self, params: &SearchParams) -> CacheKey {
        CacheKey {
            query: params.query.trim().to_lowercase(),
            limit: params
                .limit
                .filter(|limit| *limit > 0)
                .unwrap_or(self.default_limit),
            category: params.category.clone(),
            is_helper: params.is_helper,
            detail_level: params.detail_level,
        }
    }

    /// Search the tools
    ///
    /// Requests equal after normalization (trimmed, lower-cased query; a zero
    /// limit replaced by the default) share one cached response, and a cache
    /// hit returns that very `Arc`. The cache lock is held only for lookup and
    /// insertion. Index derivation and tool resolution run unlocked, so a
    /// resolver or a tool schema may search again. When two identical misses
    /// race, the response inserted first wins and both callers receive it.
    pub fn search(&self, params: &SearchParams) -> Result<Arc<SearchResponse>> {
        let key = self.cache_key(params);

        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!("Search cache hit for '{}'", key.query);
            return Ok(hit);
        }

        tracing::debug!("Search cache miss for '{}'", key.query);
        let response = Arc::new(self.run(&key)?);

        let mut cache = self.cache.lock();
        if let Some(existing) = cache.get(&key) {
            return Ok(existing.clone());
        }
        if let Some((evicted, _)) = cache.push(key, response.clone()) {
            tracing::debug!("Evicted cached search for '{}'", evicted.query);
        }
        Ok(response)
    }

    fn run(&self, key: &CacheKey) -> Result<SearchResponse> {
        let index = self.index()?;

        let candidates: Vec<&StaticIndexEntry> = index
            .iter()
            .filter(|entry| {
                key.category
                    .as_deref()
                    .map_or(true, |category| entry.category == category)
            })
            .filter(|entry| key.is_helper.map_or(true, |helper| entry.is_helper == helper))
            .collect();

        let mut results: Vec<SearchResult> = if key.query.is_empty() || key.query == MATCH_ALL {
            candidates
                .iter()
                .map(|entry| SearchResult::new(&entry.name, 1.0, "all"))
                .collect()
        } else {
            self.strategy
                .search(&key.query, &candidates)
                .into_iter()
                .filter(|result| result.score > 0.0)
                .collect()
        };

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        let total_found = results.len();
        results.truncate(key.limit);

        let by_name: HashMap<&str, &StaticIndexEntry> = candidates
            .iter()
            .map(|entry| (entry.name.as_str(), *entry))
            .collect();
        let registry = self.registry.upgrade();

        let tools: Vec<FormattedTool> = results
            .iter()
            .filter_map(|result| {
                let entry = by_name.get(result.tool_name.as_str())?;
                Some(format_tool(entry, result, key.detail_level, registry.as_deref()))
            })
            .collect();

        Ok(SearchResponse {
            query: key.query.clone(),
            total_found,
            returned: tools.len(),
            tools,
        })
    }

    /// Drop every cached response
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Occupancy of the response cache
    pub fn get_cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Shape one result for the requested detail level
///
/// The cheap levels only consult tools the registry has already resolved;
/// `Full` may resolve, and leaves out whatever cannot be obtained.
fn format_tool(
    entry: &StaticIndexEntry,
    result: &SearchResult,
    level: DetailLevel,
    registry: Option<&ToolRegistry>,
) -> FormattedTool {
    if level == DetailLevel::NameOnly {
        return FormattedTool {
            name: entry.name.clone(),
            ..FormattedTool::default()
        };
    }

    let live = match level {
        DetailLevel::Full => registry.and_then(|r| r.get_tool(&entry.name).ok().flatten()),
        _ => registry.and_then(|r| r.resolved_tool(&entry.name)),
    };

    let mut formatted = FormattedTool {
        name: entry.name.clone(),
        description: Some(
            live.as_ref()
                .map(|tool| tool.description().to_string())
                .unwrap_or_else(|| entry.short_description.clone()),
        ),
        category: Some(entry.category.clone()),
        score: Some(round_score(result.score)),
        ..FormattedTool::default()
    };

    if level == DetailLevel::Full {
        if let Some(tool) = live {
            let metadata = registry.and_then(|r| r.get_metadata(&entry.name).ok().flatten());
            formatted.input_schema = Some(tool.schema());
            formatted.tags = metadata.as_ref().map(|m| m.tags.clone());
            formatted.examples = metadata.and_then(|m| m.examples);
        }
        formatted.match_details = result.match_details.clone();
    }

    formatted
}
