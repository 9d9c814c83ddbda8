//! Tool definitions module.
//!
//! Every LENS tool is a proxy over one upstream resource, so tools are
//! declared as data in `catalog.rs` and share the single implementation in
//! `proxy.rs`.

pub mod catalog;
pub mod proxy;

pub use catalog::LENS_TOOLS;
pub use proxy::{AccountParams, NoParams, ProxyTool, ToolParameters};
