//! Emission targets for rendered log entries.

use std::io::Write;
use std::sync::{Arc, Mutex};

/// Destination for one rendered entry per call.
///
/// Shared by every session, so implementations must accept concurrent
/// callers; a single call must write the whole line.
#[cfg_attr(test, mockall::automock)]
pub trait EntrySink: Send + Sync {
    fn emit(&self, line: &str) -> std::io::Result<()>;
}

/// Writes each entry as a line on standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl EntrySink for StdoutSink {
    fn emit(&self, line: &str) -> std::io::Result<()> {
        // Holding the lock for the whole line keeps sessions from tearing
        // each other's output.
        let mut out = std::io::stdout().lock();
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()
    }
}

/// Collects entries in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line emitted so far, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EntrySink for MemorySink {
    fn emit(&self, line: &str) -> std::io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(line.to_string());
        Ok(())
    }
}
