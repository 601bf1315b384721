//! Application-wide error types.

use thiserror::Error;

use crate::runtime::RuntimeError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("bad timeout".into());
        assert!(e.to_string().contains("bad timeout"));
        assert!(e.to_string().starts_with("config error"));
    }

    #[test]
    fn logger_error_display() {
        let e = AppError::Logger("already initialized".into());
        assert!(e.to_string().contains("already initialized"));
    }

    #[test]
    fn runtime_error_converts_and_keeps_source() {
        let e: AppError = RuntimeError::Readiness("admin port never opened".into()).into();
        assert!(e.to_string().contains("admin port never opened"));
        assert!(e.source().is_some());
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
