//! Request, result and response types of the tool search engine

use crate::ToolhubError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How much of each matching tool a search response carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    /// Only the tool name
    NameOnly,
    /// Name, description, category and score
    #[default]
    NameAndDescription,
    /// Everything, including the input schema and examples
    Full,
}

impl FromStr for DetailLevel {
    type Err = ToolhubError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "name_only" => Ok(DetailLevel::NameOnly),
            "name_and_description" => Ok(DetailLevel::NameAndDescription),
            "full" => Ok(DetailLevel::Full),
            other => Err(ToolhubError::Validation(format!(
                "Unknown detail level '{other}', expected name_only, name_and_description or full"
            ))),
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DetailLevel::NameOnly => "name_only",
            DetailLevel::NameAndDescription => "name_and_description",
            DetailLevel::Full => "full",
        };
        f.write_str(text)
    }
}

/// Parameters of a tool search
///
/// Doubles as the request type of the `search_tools` tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Free-text query; empty or `*` matches every tool passing the filters
    pub query: String,
    /// Maximum number of tools to return (default 10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Restrict results to one category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Restrict results to helper (`true`) or non-helper (`false`) tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_helper: Option<bool>,
    /// Verbosity of each returned tool
    #[serde(default)]
    pub detail_level: DetailLevel,
}

impl SearchParams {
    /// Parameters for a plain query with every other field defaulted
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Set the limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the category filter
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the helper filter
    pub fn with_helper(mut self, is_helper: bool) -> Self {
        self.is_helper = Some(is_helper);
        self
    }

    /// Set the detail level
    pub fn with_detail_level(mut self, detail_level: DetailLevel) -> Self {
        self.detail_level = detail_level;
        self
    }
}

/// Score a strategy assigned to one tool
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Name of the scored tool
    pub tool_name: String,
    /// Relevance in `[0, 1]`
    pub score: f64,
    /// Strategy that produced the score
    pub strategy_type: String,
    /// Strategy specific explanation of the score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_details: Option<serde_json::Value>,
}

impl SearchResult {
    /// Create a result, clamping the score into `[0, 1]`
    pub fn new(tool_name: impl Into<String>, score: f64, strategy_type: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            score: score.clamp(0.0, 1.0),
            strategy_type: strategy_type.into(),
            match_details: None,
        }
    }

    /// Attach match details
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.match_details = Some(details);
        self
    }
}

/// One tool in a search response, shaped by the requested [`DetailLevel`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedTool {
    /// Tool name
    pub name: String,
    /// Live description, or the indexed short description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tool category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Score rounded to two decimals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Tags from the tool metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Argument schema of the live tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<serde_json::Value>,
    /// Example invocations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<serde_json::Value>>,
    /// Strategy explanation of the score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_details: Option<serde_json::Value>,
}

/// Ranked, truncated and formatted answer to a search
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Normalized query
    pub query: String,
    /// Matches before truncation to the limit
    pub total_found: usize,
    /// Matches actually returned
    pub returned: usize,
    /// Returned tools, best first
    pub tools: Vec<FormattedTool>,
}

/// Occupancy of the search cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Entries currently cached
    pub size: usize,
    /// Capacity of the cache
    pub max_size: usize,
}

/// Round a score to two decimals
pub(crate) fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_params_deserialize_camel_case() {
        let params: SearchParams = serde_json::from_value(serde_json::json!({
            "query": "issue",
            "limit": 3,
            "isHelper": false,
            "detailLevel": "full"
        }))
        .unwrap();

        assert_eq!(params.query, "issue");
        assert_eq!(params.limit, Some(3));
        assert_eq!(params.is_helper, Some(false));
        assert_eq!(params.detail_level, DetailLevel::Full);
    }

    #[test]
    fn test_search_params_reject_invalid_values() {
        assert!(serde_json::from_value::<SearchParams>(serde_json::json!({})).is_err());
        assert!(serde_json::from_value::<SearchParams>(
            serde_json::json!({"query": "x", "limit": -1})
        )
        .is_err());
        assert!(serde_json::from_value::<SearchParams>(
            serde_json::json!({"query": "x", "detailLevel": "verbose"})
        )
        .is_err());
    }

    #[test]
    fn test_detail_level_from_str() {
        assert_eq!("full".parse::<DetailLevel>().unwrap(), DetailLevel::Full);
        assert_eq!(
            "name-only".parse::<DetailLevel>().unwrap(),
            DetailLevel::NameOnly
        );
        assert!("everything".parse::<DetailLevel>().is_err());
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.456), 0.46);
        assert_eq!(round_score(1.0), 1.0);
        assert_eq!(round_score(0.004), 0.0);
    }

    #[test]
    fn test_formatted_tool_skips_absent_fields() {
        let tool = FormattedTool {
            name: "echo".into(),
            ..FormattedTool::default()
        };
        assert_eq!(
            serde_json::to_value(&tool).unwrap(),
            serde_json::json!({"name": "echo"})
        );
    }
}
