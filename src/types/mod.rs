//! Core types for the collector.
//!
//! - **Errors**: application error types with thiserror derives
//! - **Config**: server and observability configuration
//! - **Version**: the access-log protocol generations served

mod config;
mod errors;
mod version;

pub use config::{Config, ObservabilityConfig, ServerConfig, DEFAULT_PORT};
pub use errors::{Error, Result};
pub use version::ProtocolVersion;
