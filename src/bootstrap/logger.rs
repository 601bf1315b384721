//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, after the threshold is resolved. This is
//! the CLI's own diagnostic output; supervised-process logs go through
//! [`crate::logs`] instead.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;
use crate::verbosity::Threshold;

/// Initialise the global tracing subscriber, writing to stderr.
///
/// If `prefer_level` is `true`, `level` takes precedence over `RUST_LOG`.
/// Otherwise `RUST_LOG` wins and `level` is the fallback.
pub fn init(level: LevelFilter, prefer_level: bool) -> Result<(), AppError> {
    let filter = build_filter(level, prefer_level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(())
}

/// Convenience wrapper: level derived from the filter threshold.
pub fn init_for(threshold: Threshold, prefer_level: bool) -> Result<(), AppError> {
    init(threshold.level_filter(), prefer_level)
}

fn build_filter(level: LevelFilter, prefer_level: bool) -> Result<EnvFilter, AppError> {
    let directive = level.to_string().to_lowercase();
    if prefer_level {
        return EnvFilter::try_new(&directive)
            .map_err(|e| AppError::Logger(format!("invalid log level '{directive}': {e}")));
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .map_err(|e| AppError::Logger(format!("invalid log level '{directive}': {e}")))
}
