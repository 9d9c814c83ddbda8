//! LENS domain module.
//!
//! This module owns the connection to the upstream LENS data service. Every
//! tool exposed by the server is a thin proxy over one of its resources, so
//! all network access goes through the [`ResourceFetcher`] seam defined here.
//!
//! ## Architecture
//!
//! - `client.rs` - `ResourcePath`, the `ResourceFetcher` trait and the reqwest-backed `UpstreamClient`
//! - `error.rs` - Upstream error types

mod client;
mod error;

pub use client::{ResourceFetcher, ResourcePath, UpstreamClient};
pub use error::UpstreamError;
