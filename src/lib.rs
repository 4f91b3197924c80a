//! # ALS Collector - Envoy access-log service sink
//!
//! Accepts streamed access-log records from Envoy over gRPC and prints each
//! record as one line of JSON. Both schema generations are served on a single
//! port:
//!
//! ```text
//!                  ┌──────────────── CollectorServer ────────────────┐
//!   v2 stream  →   │  AccessLogServiceV2 ─┐                          │
//!                  │                      ├→ StreamHandler → codec → │ → sink (stdout)
//!   v3 stream  →   │  AccessLogServiceV3 ─┘                          │
//!                  └─────────────────────────────────────────────────┘
//! ```
//!
//! Each stream runs its own sequential receive loop; streams share nothing but
//! the sink.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod grpc;
pub mod proto;
pub mod stream;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, ProtocolVersion, Result};
