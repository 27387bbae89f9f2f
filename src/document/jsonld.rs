//! JSON-LD block handling

use serde_json::{Map, Value};

/// One `<script type="application/ld+json">` block
#[derive(Debug, Clone, PartialEq)]
pub enum JsonLdBlock {
    /// The block parsed as JSON
    Valid(Value),
    /// The block is not valid JSON
    Invalid { error: String },
}

impl JsonLdBlock {
    pub(crate) fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::Valid(value),
            Err(e) => Self::Invalid {
                error: e.to_string(),
            },
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Top-level schema nodes in this block (empty for invalid blocks)
    pub fn nodes(&self) -> Vec<&Map<String, Value>> {
        match self {
            Self::Valid(value) => json_ld_nodes(value),
            Self::Invalid { .. } => Vec::new(),
        }
    }
}

/// Flattens a JSON-LD value into its schema nodes
///
/// Arrays contribute each object member. An object carrying `@graph`
/// contributes its graph members, plus itself when it also has an `@type`.
pub fn json_ld_nodes(value: &Value) -> Vec<&Map<String, Value>> {
    let mut nodes = Vec::new();
    collect_nodes(value, &mut nodes);
    nodes
}

fn collect_nodes<'a>(value: &'a Value, nodes: &mut Vec<&'a Map<String, Value>>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_nodes(item, nodes);
            }
        }
        Value::Object(map) => match map.get("@graph") {
            Some(graph) => {
                if map.contains_key("@type") {
                    nodes.push(map);
                }
                collect_nodes(graph, nodes);
            }
            None => nodes.push(map),
        },
        _ => {}
    }
}

/// The `@type` values of a node; a string or an array of strings
pub fn node_types(node: &Map<String, Value>) -> Vec<String> {
    match node.get("@type") {
        Some(Value::String(t)) => vec![t.trim().to_string()],
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .map(|t| t.trim().to_string())
            .collect(),
        _ => Vec::new(),
    }
    .into_iter()
    .filter(|t| !t.is_empty())
    .collect()
}
