//! Public configuration types.
//!
//! Built once at CLI entry and never mutated afterwards.

use std::path::PathBuf;
use std::time::Duration;

use crate::runtime::RuntimeOptions;
use crate::verbosity::Threshold;

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Settings for the process-backed runtime manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub keystore: CommandSpec,
    pub conductor: CommandSpec,
    /// How long `ready` may wait for the admin port to open.
    pub ready_timeout: Duration,
    /// Fixed base directory; chosen at setup time when `None`.
    pub base_dir: Option<PathBuf>,
}

/// Resolved run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub threshold: Threshold,
    /// `true` when `-v`/`-q` was given; the CLI log level then beats `RUST_LOG`.
    pub verbosity_explicit: bool,
    pub admin_port: Option<u16>,
    /// Absolute config file path.
    pub config_path: Option<PathBuf>,
    pub runtime: RuntimeSettings,
}

impl Config {
    /// The part of the configuration handed to the runtime manager's setup.
    pub fn runtime_options(&self) -> RuntimeOptions {
        RuntimeOptions {
            admin_port: self.admin_port,
            config_path: self.config_path.clone(),
        }
    }
}
