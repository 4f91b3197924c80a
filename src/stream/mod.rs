//! Version-independent stream processing.
//!
//! - `codec`: renders an entry as JSON
//! - `handler`: the per-session receive loop
//! - `sink`: where rendered entries go

pub mod codec;
pub mod handler;
pub mod sink;

pub use codec::{EntryCodec, JsonCodec};
pub use handler::{EntrySource, Received, SessionState, SessionSummary, StreamHandler};
pub use sink::{EntrySink, MemorySink, StdoutSink};
