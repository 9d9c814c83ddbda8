//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of all available tools, in registration order
//! - Dispatch of tool calls by exact name
//! - Tool metadata for listing

use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject, Tool};
use serde::Deserialize;
use tracing::{info, warn};

use super::definitions::{LENS_TOOLS, ProxyTool};
use super::error::ToolError;
use crate::domains::lens::ResourceFetcher;

/// A single tool invocation as received from a client.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolRequest {
    /// Name of the tool to call.
    pub name: String,

    /// Tool arguments; absent arguments behave like an empty object.
    #[serde(default)]
    pub arguments: Option<JsonObject>,
}

impl ToolRequest {
    /// Create a request for the given tool.
    pub fn new(name: impl Into<String>, arguments: JsonObject) -> Self {
        Self {
            name: name.into(),
            arguments: Some(arguments),
        }
    }
}

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - owns the tool definitions and the upstream fetcher.
///
/// The registry is built once at startup and shared read-only afterwards.
pub struct ToolRegistry {
    tools: Vec<ProxyTool>,
    fetcher: Arc<dyn ResourceFetcher>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            tools: Vec::new(),
            fetcher,
        }
    }

    /// Create a registry holding every LENS tool.
    pub fn with_lens_tools(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            tools: LENS_TOOLS.to_vec(),
            fetcher,
        }
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: ProxyTool) -> Result<(), ToolError> {
        if self.get(tool.name()).is_some() {
            return Err(ToolError::DuplicateName(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Look up a tool by exact name.
    pub fn get(&self, name: &str) -> Option<&ProxyTool> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// All registered tools, in registration order.
    pub fn tools(&self) -> &[ProxyTool] {
        &self.tools
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(ProxyTool::name).collect()
    }

    /// Get all tools as Tool models (metadata).
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(ProxyTool::to_tool).collect()
    }

    /// Dispatch a tool request to the matching tool.
    pub async fn dispatch(&self, request: ToolRequest) -> Result<CallToolResult, ToolError> {
        let arguments = request.arguments.unwrap_or_default();
        self.call_tool(&request.name, arguments).await
    }

    /// Call a tool by name.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<CallToolResult, ToolError> {
        let Some(tool) = self.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return Err(ToolError::not_found(name));
        };

        info!("Calling tool: {}", name);
        tool.call(&arguments, self.fetcher.as_ref()).await
    }
}
