//! LENS MCP Server Library
//!
//! Exposes read-only LENS account data (client lists, announcements,
//! activity histograms, forecasts, impact, pipeline details and insights) as
//! MCP tools. Every tool is a proxy: it validates its arguments, issues one
//! GET against the LENS API and returns the `result` field as text.
//!
//! # Architecture
//!
//! - **core**: Configuration, error handling, the MCP server handler and transports
//! - **domains**: Business logic organized by bounded contexts
//!   - **lens**: the upstream LENS API client
//!   - **tools**: tool catalog, registry and dispatch
//!
//! # Example
//!
//! ```rust,no_run
//! use lens_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
