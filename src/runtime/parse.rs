//! Turn a line of process output into a [`LogRecord`].
//!
//! Lines in tracing-subscriber's JSON shape become structured records:
//!
//! ```text
//! {"timestamp":"2024-01-02T03:04:05.678Z","level":"INFO","target":"holochain::conductor","fields":{"message":"started"}}
//! ```
//!
//! Everything else is kept verbatim as a raw record.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::logs::{LogRecord, StreamSource};

#[derive(Debug, Deserialize)]
struct JsonLine {
    #[serde(default)]
    timestamp: Option<String>,
    level: String,
    #[serde(default, alias = "context")]
    target: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    fields: Option<JsonFields>,
}

#[derive(Debug, Deserialize)]
struct JsonFields {
    #[serde(default)]
    message: Option<String>,
}

/// Parse `line` from `source`. `received_at` stamps raw lines and structured
/// lines whose own timestamp is missing or unreadable.
pub fn parse_line(source: StreamSource, line: &str, received_at: DateTime<Utc>) -> LogRecord {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if !trimmed.trim_start().starts_with('{') {
        return LogRecord::raw(source, received_at, trimmed);
    }

    let Ok(parsed) = serde_json::from_str::<JsonLine>(trimmed) else {
        return LogRecord::raw(source, received_at, trimmed);
    };

    let timestamp = parsed
        .timestamp
        .as_deref()
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or(received_at);

    let message = parsed
        .fields
        .and_then(|f| f.message)
        .or(parsed.message)
        .unwrap_or_default();

    LogRecord::structured(
        source,
        timestamp,
        parsed.level.trim().to_lowercase(),
        parsed.target.unwrap_or_default(),
        message,
    )
}
