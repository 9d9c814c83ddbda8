//! Domains module containing business logic organized by bounded contexts.
//!
//! - **lens**: access to the upstream LENS data service
//! - **tools**: MCP tools proxying LENS resources

pub mod lens;
pub mod tools;
