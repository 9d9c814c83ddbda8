//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Every tool is a read-only proxy over one LENS resource.
//!
//! ## Architecture
//!
//! - `definitions/` - The tool catalog and the shared proxy implementation
//! - `registry.rs` - Central tool registry and dispatch
//! - `router.rs` - Dynamic ToolRouter builder for STDIO transport
//! - `envelope.rs` - Wrapping of upstream results into tool results
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! Add one `ProxyTool` record to `definitions/catalog.rs`. Registry, router
//! and HTTP listing all iterate the catalog.

pub mod definitions;
pub mod envelope;
mod error;
mod registry;
pub mod router;

pub use error::{INTERNAL_ERROR, INVALID_PARAMS, ToolError};
pub use registry::{ToolRegistry, ToolRequest};
pub use router::build_tool_router;
