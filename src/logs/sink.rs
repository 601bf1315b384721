//! Output sinks for rendered log lines.

use std::io::Write as _;
use std::sync::{Arc, Mutex};

use crate::logs::format::FormattedLine;

/// Destination for rendered log lines. Shared by all stream listeners, so
/// implementations must tolerate concurrent calls.
pub trait LogSink: Send + Sync {
    fn write_line(&self, line: &FormattedLine);
}

/// Writes each line to the process's stderr (the diagnostic stream).
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write_line(&self, line: &FormattedLine) {
        let mut err = std::io::stderr().lock();
        // Nothing sensible to do if stderr is gone.
        let _ = writeln!(err, "{line}");
    }
}

/// Collects lines in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far, in write order.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &FormattedLine) {
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push(line.as_str().to_string());
    }
}
