//! Log-stream handling for the supervised processes.
//!
//! - **severity**: the fixed severity scale, normalisation and color table.
//! - **record**: [`LogRecord`] and the [`StreamSource`] it came from.
//! - **format**: pure classify-and-render step.
//! - **sink**: where rendered lines are written.

pub mod format;
pub mod record;
pub mod severity;
pub mod sink;

pub use format::{FormattedLine, render};
pub use record::{LogEvent, LogRecord, StreamSource};
pub use severity::Severity;
pub use sink::{LogSink, MemorySink, StderrSink};
