//! Field filtering tool for MCP operations
//!
//! Projects JSON documents down to a list of dotted field paths, the generic
//! form of trimming verbose API payloads before handing them to a model.

use crate::mcp::registration::ToolMetadata;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool};
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Registration token and name of the field filtering tool
pub const FILTER_FIELDS: &str = "filter_fields";

#[derive(Debug, Deserialize)]
struct FilterFieldsRequest {
    data: Value,
    fields: Vec<String>,
}

/// Keep only `fields` of an object, or of every element of an array
///
/// Paths use dots for nesting. A path crossing an array applies the rest of
/// the path to each element. Missing paths are skipped and scalars are
/// returned unchanged.
pub fn filter_fields(data: &Value, fields: &[String]) -> Value {
    match data {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| filter_fields(item, fields))
                .collect(),
        ),
        Value::Object(_) => {
            let mut projected = Map::new();
            for field in fields {
                let path: Vec<&str> = field.split('.').filter(|s| !s.is_empty()).collect();
                project(data, &path, &mut projected);
            }
            Value::Object(projected)
        }
        other => other.clone(),
    }
}

fn project(source: &Value, path: &[&str], target: &mut Map<String, Value>) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };
    let Some(value) = source.as_object().and_then(|object| object.get(*head)) else {
        return;
    };

    if rest.is_empty() {
        target.insert(head.to_string(), value.clone());
        return;
    }

    match value {
        Value::Object(_) => {
            let slot = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = slot {
                project(value, rest, child);
            }
        }
        Value::Array(items) => {
            let slot = target.entry(head.to_string()).or_insert_with(|| {
                Value::Array(items.iter().map(|_| Value::Object(Map::new())).collect())
            });
            if let Value::Array(children) = slot {
                for (item, child) in items.iter().zip(children.iter_mut()) {
                    if let Value::Object(child) = child {
                        project(item, rest, child);
                    }
                }
            }
        }
        _ => {}
    }
}

/// Tool projecting JSON onto selected fields
#[derive(Default)]
pub struct FilterFieldsTool;

impl FilterFieldsTool {
    /// Creates a new instance of the FilterFieldsTool
    pub fn new() -> Self {
        Self
    }

    /// Metadata the field filtering tool is registered with
    pub fn metadata() -> ToolMetadata {
        ToolMetadata::new("utility")
            .with_tags(["filter", "fields", "json", "projection"])
            .helper()
            .with_examples(vec![serde_json::json!({
                "data": {"id": 1, "user": {"login": "ann"}},
                "fields": ["user.login"]
            })])
    }
}

#[async_trait]
impl McpTool for FilterFieldsTool {
    fn name(&self) -> &str {
        FILTER_FIELDS
    }

    fn description(&self) -> &str {
        include_str!("description.md")
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "data": {
                    "description": "JSON object or array of objects to filter"
                },
                "fields": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Dotted field paths to keep"
                }
            },
            "required": ["data", "fields"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: FilterFieldsRequest = BaseToolImpl::parse_arguments(arguments)?;
        BaseToolImpl::create_json_response(&filter_fields(&request.data, &request.fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_top_level_and_nested_fields() {
        let data = json!({"id": 1, "title": "Bug", "user": {"login": "ann", "id": 9}});
        assert_eq!(
            filter_fields(&data, &fields(&["id", "user.login", "missing.path"])),
            json!({"id": 1, "user": {"login": "ann"}})
        );
    }

    #[test]
    fn test_array_of_objects() {
        let data = json!([{"id": 1, "x": true}, {"id": 2}]);
        assert_eq!(
            filter_fields(&data, &fields(&["id"])),
            json!([{"id": 1}, {"id": 2}])
        );
    }

    #[test]
    fn test_path_through_nested_array() {
        let data = json!({"labels": [{"name": "bug", "color": "red"}, {"name": "ui"}]});
        assert_eq!(
            filter_fields(&data, &fields(&["labels.name"])),
            json!({"labels": [{"name": "bug"}, {"name": "ui"}]})
        );
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(filter_fields(&json!(42), &fields(&["a"])), json!(42));
    }

    #[tokio::test]
    async fn test_execute() {
        let arguments = json!({"data": {"a": 1, "b": 2}, "fields": ["b"]})
            .as_object()
            .cloned()
            .unwrap();
        let result = FilterFieldsTool::new().execute(arguments).await.unwrap();
        let body: Value = serde_json::from_str(&BaseToolImpl::extract_text(&result)).unwrap();
        assert_eq!(body, json!({"b": 2}));
    }
}
