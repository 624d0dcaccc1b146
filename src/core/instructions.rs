//! Rich-text instructions.
//!
//! Instructions are stored as a document tree in the shape editors such as
//! ProseMirror emit: `{"type": "doc", "content": [ ...nodes ]}` where every
//! node has a string `type`, optional `content` children, and text nodes
//! carry `text` (plus optional `marks`).

use serde_json::{json, Value};

use crate::error::Error;
use crate::Result;

const MAX_DEPTH: usize = 32;

pub fn empty_document() -> Value {
    json!({ "type": "doc", "content": [] })
}

/// Build a document from plain text: blank lines separate paragraphs, single
/// newlines become hard breaks.
pub fn from_plain_text(text: &str) -> Value {
    let normalized = text.replace("\r\n", "\n");
    let paragraphs: Vec<Value> = normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|paragraph| {
            let mut content = Vec::new();
            for (i, line) in paragraph.lines().enumerate() {
                if i > 0 {
                    content.push(json!({ "type": "hardBreak" }));
                }
                if !line.is_empty() {
                    content.push(json!({ "type": "text", "text": line }));
                }
            }
            json!({ "type": "paragraph", "content": content })
        })
        .collect();

    json!({ "type": "doc", "content": paragraphs })
}

/// Flatten a document back into plain text.
pub fn to_plain_text(doc: &Value) -> String {
    let blocks: Vec<String> = doc
        .get("content")
        .and_then(Value::as_array)
        .map(|nodes| nodes.iter().map(inline_text).collect())
        .unwrap_or_default();
    blocks.join("\n\n")
}

fn inline_text(node: &Value) -> String {
    match node.get("type").and_then(Value::as_str) {
        Some("text") => node
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Some("hardBreak") => "\n".to_string(),
        Some("listItem") => format!("- {}", children_text(node, "")),
        Some("bulletList") | Some("orderedList") => children_text(node, "\n"),
        _ => children_text(node, ""),
    }
}

fn children_text(node: &Value, separator: &str) -> String {
    node.get("content")
        .and_then(Value::as_array)
        .map(|nodes| {
            nodes
                .iter()
                .map(inline_text)
                .collect::<Vec<_>>()
                .join(separator)
        })
        .unwrap_or_default()
}

/// Check that `doc` is a well-formed document tree.
pub fn validate(doc: &Value) -> Result<()> {
    if doc.get("type").and_then(Value::as_str) != Some("doc") {
        return Err(invalid("Instructions must be a document with type 'doc'"));
    }
    validate_node(doc, 0)
}

fn validate_node(node: &Value, depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(invalid("Instructions are nested too deeply"));
    }

    let obj = node
        .as_object()
        .ok_or_else(|| invalid("Every instructions node must be an object"))?;

    let node_type = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("Every instructions node needs a string 'type'"))?;

    if node_type == "text" && !obj.get("text").is_some_and(Value::is_string) {
        return Err(invalid("Text nodes need a string 'text'"));
    }

    match obj.get("content") {
        None => Ok(()),
        Some(Value::Array(children)) => children
            .iter()
            .try_for_each(|child| validate_node(child, depth + 1)),
        Some(_) => Err(invalid("Node 'content' must be an array")),
    }
}

fn invalid(problem: &str) -> Error {
    Error::validation_invalid_argument("instructions", problem, None, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_becomes_paragraphs() {
        let doc = from_plain_text("Shake with ice.\nStrain.\n\nGarnish with mint.");
        let content = doc["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["content"][1]["type"], "hardBreak");
        assert!(validate(&doc).is_ok());
    }

    #[test]
    fn plain_text_round_trip() {
        let text = "Shake with ice.\nStrain.\n\nGarnish with mint.";
        assert_eq!(to_plain_text(&from_plain_text(text)), text);
    }

    #[test]
    fn lists_flatten_to_dashes() {
        let doc = json!({
            "type": "doc",
            "content": [{
                "type": "bulletList",
                "content": [
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "2 oz gin"}]}]},
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "1 oz lime"}]}]}
                ]
            }]
        });
        assert_eq!(to_plain_text(&doc), "- 2 oz gin\n- 1 oz lime");
    }

    #[test]
    fn empty_document_is_valid() {
        assert!(validate(&empty_document()).is_ok());
        assert_eq!(to_plain_text(&empty_document()), "");
    }

    #[test]
    fn rejects_non_doc_root() {
        assert!(validate(&json!({"type": "paragraph"})).is_err());
        assert!(validate(&json!("just text")).is_err());
    }

    #[test]
    fn rejects_text_node_without_text() {
        let doc = json!({"type": "doc", "content": [{"type": "text"}]});
        assert!(validate(&doc).is_err());
    }

    #[test]
    fn rejects_non_array_content() {
        let doc = json!({"type": "doc", "content": {"type": "text", "text": "x"}});
        assert!(validate(&doc).is_err());
    }
}
