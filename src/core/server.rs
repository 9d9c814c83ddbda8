//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol by delegating to the tool registry.
//!
//! ## Tool Architecture
//!
//! Tools are declared as records in `domains/tools/definitions/catalog.rs`.
//! The registry dispatches HTTP calls; the rmcp ToolRouter used by the STDIO
//! transport is built from the same registry in `domains/tools/router.rs`.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use super::error::Result as ServerResult;
use crate::domains::lens::{ResourceFetcher, UpstreamClient};
use crate::domains::tools::{ToolError, ToolRegistry, ToolRequest, build_tool_router};

/// Instructions advertised to clients during the handshake.
pub const INSTRUCTIONS: &str = "Read-only access to LENS account data. Call get-client-list to \
     discover accounts, then pass an account's Global Ultimate DUNS number (uduns) to the \
     per-account tools.";

/// The main MCP server handler.
///
/// Cloning is cheap; the registry and configuration are shared and never
/// mutated after construction.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Registry of every tool and the upstream fetcher they use.
    registry: Arc<ToolRegistry>,

    /// Tool router for handling tool calls over rmcp.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server talking to the configured LENS API.
    pub fn new(config: Config) -> ServerResult<Self> {
        let client = UpstreamClient::new(&config.upstream.base_url, config.upstream.timeout())?;
        Ok(Self::with_fetcher(config, Arc::new(client)))
    }

    /// Create a new MCP server using the given fetcher for every tool.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        let registry = Arc::new(ToolRegistry::with_lens_tools(fetcher));
        info!("Registered tools: {}", registry.tool_names().join(", "));

        Self {
            tool_router: build_tool_router::<Self>(registry.clone()),
            config: Arc::new(config),
            registry,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.registry
            .list_tools()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Dispatch a tool call (for HTTP transport).
    pub async fn dispatch(
        &self,
        request: ToolRequest,
    ) -> std::result::Result<CallToolResult, ToolError> {
        self.registry.dispatch(request).await
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = self.name().to_string();
        server_info.version = self.version().to_string();

        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info,
            ..Default::default()
        }
    }
}
