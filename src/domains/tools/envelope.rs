//! Conversion of upstream results into MCP tool results.
//!
//! A successful call always produces exactly one text content block. The
//! upstream `result` is opaque JSON, so anything that is not already a string
//! is serialized before being placed in the block.

use rmcp::model::{CallToolResult, Content};
use serde_json::Value;

/// Render an upstream value as the text of a content block.
///
/// Strings pass through untouched, `null` renders as an empty string and any
/// other value is serialized as compact JSON.
pub fn render_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Wrap an upstream value in a successful tool result.
pub fn to_envelope(value: &Value) -> CallToolResult {
    CallToolResult::success(vec![Content::text(render_text(value))])
}
