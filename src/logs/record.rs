//! Log records as they arrive from the supervised processes.

use std::fmt;

use chrono::{DateTime, Utc};

/// Which process and which pipe a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamSource {
    KeystoreStdout,
    KeystoreStderr,
    ConductorStdout,
    ConductorStderr,
}

impl StreamSource {
    pub const ALL: [StreamSource; 4] = [
        StreamSource::KeystoreStdout,
        StreamSource::KeystoreStderr,
        StreamSource::ConductorStdout,
        StreamSource::ConductorStderr,
    ];

    /// Channel name, e.g. `"lair:stdout"`.
    pub const fn event_name(self) -> &'static str {
        match self {
            StreamSource::KeystoreStdout => "lair:stdout",
            StreamSource::KeystoreStderr => "lair:stderr",
            StreamSource::ConductorStdout => "conductor:stdout",
            StreamSource::ConductorStderr => "conductor:stderr",
        }
    }

    /// Pre-colored, column-aligned label printed in front of each line.
    /// stderr streams are bold red, stdout streams bold default.
    pub const fn prefix(self) -> &'static str {
        match self {
            StreamSource::KeystoreStdout => "\x1b[39;1m     Lair STDOUT:",
            StreamSource::KeystoreStderr => "\x1b[31;1m     Lair STDERR:",
            StreamSource::ConductorStdout => "\x1b[39;1mConductor STDOUT:",
            StreamSource::ConductorStderr => "\x1b[31;1mConductor STDERR:",
        }
    }
}

impl fmt::Display for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// One log line after parsing.
///
/// `severity` is the level as declared by the emitting process, verbatim.
/// `None` marks a raw line that could not be parsed as a structured record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub severity: Option<String>,
    pub context: String,
    pub message: String,
    pub source: StreamSource,
}

impl LogRecord {
    pub fn structured(
        source: StreamSource,
        timestamp: DateTime<Utc>,
        severity: impl Into<String>,
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            severity: Some(severity.into()),
            context: context.into(),
            message: message.into(),
            source,
        }
    }

    pub fn raw(source: StreamSource, timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            severity: None,
            context: String::new(),
            message: message.into(),
            source,
        }
    }
}

/// What a stream channel carries: the original line plus its parsed form.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub line: String,
    pub record: LogRecord,
}
