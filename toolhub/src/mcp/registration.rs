//! Registration-time descriptions of tools
//!
//! A [`ToolRegistration`] pairs an opaque resolver token with the static
//! [`ToolMetadata`] used for ordering, filtering and search. The registry never
//! builds a tool itself; it asks the injected [`ToolResolver`] for an instance the
//! first time the tool set is needed.

use super::tool_registry::McpTool;
use crate::{Result, ToolhubError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Advertisement priority of a tool; lower rank sorts first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolPriority {
    /// Always listed first
    Critical,
    /// Listed before ordinary tools
    High,
    /// Ordinary tools
    #[default]
    Normal,
    /// Listed last
    Low,
}

impl ToolPriority {
    /// Numeric rank used for ordering: critical=0, high=1, normal=2, low=3
    pub fn rank(self) -> u8 {
        match self {
            ToolPriority::Critical => 0,
            ToolPriority::High => 1,
            ToolPriority::Normal => 2,
            ToolPriority::Low => 3,
        }
    }
}

impl fmt::Display for ToolPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ToolPriority::Critical => "critical",
            ToolPriority::High => "high",
            ToolPriority::Normal => "normal",
            ToolPriority::Low => "low",
        };
        f.write_str(text)
    }
}

/// Static metadata supplied alongside each tool at registration time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolMetadata {
    /// Primary grouping, e.g. `discovery` or `utility`
    pub category: String,
    /// Optional finer grouping inside the category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Advertisement priority
    pub priority: ToolPriority,
    /// Free-form tags used by search
    pub tags: Vec<String>,
    /// Helper tools support other tools rather than doing domain work
    pub is_helper: bool,
    /// Example invocations, surfaced at the `full` search detail level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<serde_json::Value>>,
}

impl ToolMetadata {
    /// Metadata for a tool in the given category with default priority
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    /// Set the subcategory
    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: ToolPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the tags, dropping duplicates while keeping first-seen order
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        self.tags = tags
            .into_iter()
            .map(Into::into)
            .filter(|tag: &String| seen.insert(tag.clone()))
            .collect();
        self
    }

    /// Mark the tool as a helper
    pub fn helper(mut self) -> Self {
        self.is_helper = true;
        self
    }

    /// Attach example invocations
    pub fn with_examples(mut self, examples: Vec<serde_json::Value>) -> Self {
        self.examples = Some(examples);
        self
    }
}

/// One entry in the static registration list handed to the registry
#[derive(Debug, Clone)]
pub struct ToolRegistration {
    /// Token passed to the resolver to obtain the instance
    pub token: String,
    /// Metadata describing the tool
    pub metadata: ToolMetadata,
}

impl ToolRegistration {
    /// Create a registration
    pub fn new(token: impl Into<String>, metadata: ToolMetadata) -> Self {
        Self {
            token: token.into(),
            metadata,
        }
    }
}

/// Produces tool instances from registration tokens
///
/// Called lazily, at most once per registration. An unknown token is a
/// deployment defect and must be reported as [`ToolhubError::UnknownToolToken`].
pub trait ToolResolver: Send + Sync {
    /// Resolve a token into a tool instance
    fn resolve(&self, token: &str) -> Result<Arc<dyn McpTool>>;
}

impl<F> ToolResolver for F
where
    F: Fn(&str) -> Result<Arc<dyn McpTool>> + Send + Sync,
{
    fn resolve(&self, token: &str) -> Result<Arc<dyn McpTool>> {
        self(token)
    }
}

/// Category based view over the registered tools
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    /// Bypass filtering entirely
    pub include_all: bool,
    /// Categories whose tools are all included
    pub categories: HashSet<String>,
    /// Categories where only the listed subcategories are included
    pub categories_with_subcategories: HashMap<String, HashSet<String>>,
}

impl CategoryFilter {
    /// A filter that lets every tool through
    pub fn all() -> Self {
        Self {
            include_all: true,
            ..Self::default()
        }
    }

    /// Include every tool of a category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    /// Include one subcategory of a category
    pub fn with_subcategory(
        mut self,
        category: impl Into<String>,
        subcategory: impl Into<String>,
    ) -> Self {
        self.categories_with_subcategories
            .entry(category.into())
            .or_default()
            .insert(subcategory.into());
        self
    }

    /// Whether a tool with this metadata passes the filter
    pub fn matches(&self, metadata: &ToolMetadata) -> bool {
        if self.include_all || self.categories.contains(&metadata.category) {
            return true;
        }

        match (
            self.categories_with_subcategories.get(&metadata.category),
            &metadata.subcategory,
        ) {
            (Some(allowed), Some(subcategory)) => allowed.contains(subcategory),
            _ => false,
        }
    }
}

/// How the tool list is advertised to clients
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMode {
    /// Advertise every tool upfront
    #[default]
    Eager,
    /// Advertise only the essential tools and rely on search for the rest
    Lazy,
}

impl FromStr for DiscoveryMode {
    type Err = ToolhubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eager" => Ok(DiscoveryMode::Eager),
            "lazy" => Ok(DiscoveryMode::Lazy),
            other => Err(ToolhubError::Validation(format!(
                "Unknown discovery mode '{other}', expected 'eager' or 'lazy'"
            ))),
        }
    }
}

impl fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryMode::Eager => write!(f, "eager"),
            DiscoveryMode::Lazy => write!(f, "lazy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_rank_order() {
        assert!(ToolPriority::Critical.rank() < ToolPriority::High.rank());
        assert!(ToolPriority::High.rank() < ToolPriority::Normal.rank());
        assert!(ToolPriority::Normal.rank() < ToolPriority::Low.rank());
        assert_eq!(ToolPriority::default(), ToolPriority::Normal);
    }

    #[test]
    fn test_metadata_builder() {
        let metadata = ToolMetadata::new("issues")
            .with_subcategory("comments")
            .with_priority(ToolPriority::High)
            .with_tags(["read", "issue", "read"])
            .helper();

        assert_eq!(metadata.category, "issues");
        assert_eq!(metadata.subcategory.as_deref(), Some("comments"));
        assert_eq!(metadata.priority, ToolPriority::High);
        assert_eq!(metadata.tags, vec!["read", "issue"]);
        assert!(metadata.is_helper);
    }

    #[test]
    fn test_category_filter_include_all() {
        let filter = CategoryFilter::all();
        assert!(filter.matches(&ToolMetadata::new("anything")));
    }

    #[test]
    fn test_category_filter_by_category_and_subcategory() {
        let filter = CategoryFilter::default()
            .with_category("users")
            .with_subcategory("issues", "comments");

        assert!(filter.matches(&ToolMetadata::new("users")));
        assert!(filter.matches(&ToolMetadata::new("issues").with_subcategory("comments")));
        assert!(!filter.matches(&ToolMetadata::new("issues").with_subcategory("labels")));
        assert!(!filter.matches(&ToolMetadata::new("issues")));
        assert!(!filter.matches(&ToolMetadata::new("projects")));
    }

    #[test]
    fn test_discovery_mode_parsing() {
        assert_eq!("eager".parse::<DiscoveryMode>().unwrap(), DiscoveryMode::Eager);
        assert_eq!(" LAZY ".parse::<DiscoveryMode>().unwrap(), DiscoveryMode::Lazy);
        assert!("sometimes".parse::<DiscoveryMode>().is_err());
        assert_eq!(DiscoveryMode::Lazy.to_string(), "lazy");
    }

    #[test]
    fn test_priority_serde_lowercase() {
        let json = serde_json::to_string(&ToolPriority::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
        let parsed: ToolPriority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(parsed, ToolPriority::Low);
    }
}
