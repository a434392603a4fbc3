//! Static search index
//!
//! Each tool is summarized once into a [`StaticIndexEntry`] holding the
//! pre-tokenized fields the strategies score against, so queries never
//! re-tokenize tool names or descriptions.

use crate::mcp::registration::ToolMetadata;
use crate::mcp::tool_registry::ToolDescriptor;
use serde::{Deserialize, Serialize};

/// Maximum length of [`StaticIndexEntry::short_description`], in characters
pub const SHORT_DESCRIPTION_MAX_CHARS: usize = 120;

/// Immutable, tokenized summary of one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticIndexEntry {
    /// Tool name
    pub name: String,
    /// Tool category
    pub category: String,
    /// Tool tags, lower-cased
    pub tags: Vec<String>,
    /// Whether the tool is a helper
    pub is_helper: bool,
    /// Tokens of the tool name
    pub name_tokens: Vec<String>,
    /// Tokens of the full description
    pub description_tokens: Vec<String>,
    /// First sentence of the description, truncated
    pub short_description: String,
}

impl StaticIndexEntry {
    /// Build an entry from raw fields
    pub fn new(
        name: impl Into<String>,
        description: &str,
        category: impl Into<String>,
        tags: &[String],
        is_helper: bool,
    ) -> Self {
        let name = name.into();
        Self {
            name_tokens: tokenize(&name),
            description_tokens: tokenize(description),
            short_description: short_description(description),
            category: category.into(),
            tags: tags.iter().map(|t| t.to_lowercase()).collect(),
            is_helper,
            name,
        }
    }

    /// Build an entry from a registered tool
    pub fn from_tool(descriptor: &ToolDescriptor, metadata: &ToolMetadata) -> Self {
        Self::new(
            descriptor.name.clone(),
            &descriptor.description,
            metadata.category.clone(),
            &metadata.tags,
            metadata.is_helper,
        )
    }
}

/// Lower-case `text` and split it on every non-alphanumeric character
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// First sentence of a description, capped at [`SHORT_DESCRIPTION_MAX_CHARS`]
pub fn short_description(description: &str) -> String {
    let first_line = description
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .unwrap_or_default();

    let sentence = match first_line.find(". ") {
        Some(end) => &first_line[..=end],
        None => first_line,
    };

    if sentence.chars().count() <= SHORT_DESCRIPTION_MAX_CHARS {
        return sentence.to_string();
    }

    let truncated: String = sentence
        .chars()
        .take(SHORT_DESCRIPTION_MAX_CHARS - 3)
        .collect();
    format!("{}...", truncated.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_splits_on_separators() {
        assert_eq!(tokenize("get_issue-Comments"), vec!["get", "issue", "comments"]);
        assert_eq!(tokenize("  Find   tools!  "), vec!["find", "tools"]);
        assert!(tokenize("__--").is_empty());
    }

    #[test]
    fn test_short_description_first_sentence() {
        assert_eq!(
            short_description("Search tools by query. Supports filters."),
            "Search tools by query."
        );
        assert_eq!(
            short_description("# Heading\n\nEcho a message back"),
            "Echo a message back"
        );
        assert_eq!(short_description(""), "");
    }

    #[test]
    fn test_short_description_is_capped() {
        let long = "word ".repeat(60);
        let short = short_description(&long);
        assert!(short.chars().count() <= SHORT_DESCRIPTION_MAX_CHARS);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_entry_from_tool() {
        let descriptor = ToolDescriptor {
            name: "get_issue".into(),
            description: "Fetch one issue. Includes comments.".into(),
            input_schema: serde_json::json!({"type": "object"}),
        };
        let metadata = ToolMetadata::new("issues").with_tags(["Read"]).helper();

        let entry = StaticIndexEntry::from_tool(&descriptor, &metadata);
        assert_eq!(entry.name_tokens, vec!["get", "issue"]);
        assert_eq!(entry.short_description, "Fetch one issue.");
        assert_eq!(entry.tags, vec!["read"]);
        assert!(entry.is_helper);
    }
}
