//! openHAB MCP server core in Rust
//!
//! This crate exposes an openHAB installation's resource graph (Items,
//! Things, Rules, Scripts and the Links between Items and Channels) as a
//! set of MCP tools, and keeps the exposed graph consistent while the
//! remote openHAB instance remains the sole source of truth.
//!
//! # Features
//!
//! - Paginated, multi-predicate filtered listings over Items and Things
//! - Link integrity checking with orphan detection and bulk repair
//! - Merge-patch updates for Items, Thing configurations, Rules and
//!   Rule script actions
//! - A per-call command dispatch policy (send-if-different vs always-send)
//!   for automation consumers with unreliable actuator state reporting
//! - REST client with bearer-token or basic authentication
//!
//! The MCP transport/session layer is intentionally not part of this crate;
//! the tool registry in [`tools`] is the seam an embedding transport drives.

// Core modules
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod filters;
pub mod links;
pub mod merge;
pub mod models;
pub mod pagination;
pub mod tools;

// Test support module - used by unit tests and by integration tests,
// which build the library without cfg(test)
pub mod mock;

// Re-export main types for convenience
pub use config::ServerConfig;
pub use error::{OpenHabError, Result};
