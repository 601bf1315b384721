//! Classify and render log records.
//!
//! [`render`] is pure: it decides whether a record passes the threshold and
//! builds the colored line, but never writes anything. Output goes through a
//! [`crate::logs::LogSink`].

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::logs::record::LogRecord;
use crate::logs::severity::Severity;
use crate::verbosity::Threshold;

const RESET: &str = "\x1b[0m";
const RAW_STYLE: &str = "\x1b[0;97m";
const CONTEXT_STYLE: &str = "\x1b[36m";
const DEFAULT_FG: &str = "\x1b[39m";

/// A fully rendered, colored log line (no trailing newline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedLine(String);

impl FormattedLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for FormattedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a record should be shown, before any text is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Unstructured line: always shown, no tag.
    Raw,
    /// Structured line at the given normalised severity.
    Tagged(Severity),
}

/// Decide the style for `record`, or `None` if the threshold hides it.
pub fn classify(record: &LogRecord, threshold: Threshold) -> Option<Style> {
    let Some(declared) = record.severity.as_deref() else {
        return Some(Style::Raw);
    };
    let severity = Severity::normalize(declared);
    threshold.admits(severity.rank()).then_some(Style::Tagged(severity))
}

/// Render `record` behind `prefix`, or return `None` when it is filtered out.
pub fn render(prefix: &str, record: &LogRecord, threshold: Threshold) -> Option<FormattedLine> {
    let style = classify(record, threshold)?;
    let ts = iso_timestamp(&record.timestamp);

    let line = match style {
        Style::Raw => format!("{ts} {prefix}{RAW_STYLE} {}{RESET}", record.message),
        Style::Tagged(severity) => format!(
            "{ts} {prefix}{RESET} {}{}{RESET} | {CONTEXT_STYLE}{}{DEFAULT_FG} | {}{}{RESET}",
            severity.level_color(),
            severity.tag(),
            record.context,
            severity.message_color(),
            record.message,
        ),
    };
    Some(FormattedLine(line))
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-01-02T03:04:05.678Z`.
pub fn iso_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
