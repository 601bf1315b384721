//! Configuration resolution: CLI flags plus env-var overrides.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;
use crate::error::AppError;
use crate::verbosity::resolve_threshold;

use super::types::*;

pub const ENV_KEYSTORE_BIN: &str = "BACKDROP_KEYSTORE_BIN";
pub const ENV_KEYSTORE_ARGS: &str = "BACKDROP_KEYSTORE_ARGS";
pub const ENV_CONDUCTOR_BIN: &str = "BACKDROP_CONDUCTOR_BIN";
pub const ENV_READY_TIMEOUT_SECS: &str = "BACKDROP_READY_TIMEOUT_SECS";
pub const ENV_BASE_DIR: &str = "BACKDROP_BASE_DIR";

const DEFAULT_KEYSTORE_BIN: &str = "lair-keystore";
const DEFAULT_KEYSTORE_ARGS: &str = "server";
const DEFAULT_CONDUCTOR_BIN: &str = "holochain";
const DEFAULT_READY_TIMEOUT_SECS: u64 = 30;

/// Raw override values, usually read from the environment.
/// Tests build this directly instead of mutating env vars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeOverrides {
    pub keystore_bin: Option<String>,
    pub keystore_args: Option<String>,
    pub conductor_bin: Option<String>,
    pub ready_timeout_secs: Option<String>,
    pub base_dir: Option<String>,
}

impl RuntimeOverrides {
    pub fn from_env() -> Self {
        Self {
            keystore_bin: env::var(ENV_KEYSTORE_BIN).ok(),
            keystore_args: env::var(ENV_KEYSTORE_ARGS).ok(),
            conductor_bin: env::var(ENV_CONDUCTOR_BIN).ok(),
            ready_timeout_secs: env::var(ENV_READY_TIMEOUT_SECS).ok(),
            base_dir: env::var(ENV_BASE_DIR).ok(),
        }
    }
}

/// Resolve the run configuration from parsed flags, reading overrides from
/// the environment. Relative paths resolve against `cwd`.
pub fn load(cli: &Cli, cwd: &Path) -> Result<Config, AppError> {
    load_with(cli, cwd, &RuntimeOverrides::from_env())
}

/// Internal loader: accepts explicit overrides.
pub fn load_with(cli: &Cli, cwd: &Path, overrides: &RuntimeOverrides) -> Result<Config, AppError> {
    Ok(Config {
        threshold: resolve_threshold(cli.verbose_count(), cli.quiet),
        verbosity_explicit: cli.verbosity_explicit(),
        admin_port: cli.admin_port,
        config_path: cli
            .config
            .as_deref()
            .map(|p| resolve_path(&p.to_string_lossy(), cwd)),
        runtime: runtime_settings_from(overrides, cwd)?,
    })
}

pub fn runtime_settings_from(
    overrides: &RuntimeOverrides,
    cwd: &Path,
) -> Result<RuntimeSettings, AppError> {
    let keystore_bin = non_empty(overrides.keystore_bin.as_deref()).unwrap_or(DEFAULT_KEYSTORE_BIN);
    let keystore_args = overrides
        .keystore_args
        .as_deref()
        .unwrap_or(DEFAULT_KEYSTORE_ARGS)
        .split_whitespace();
    let conductor_bin =
        non_empty(overrides.conductor_bin.as_deref()).unwrap_or(DEFAULT_CONDUCTOR_BIN);

    let ready_timeout_secs = match non_empty(overrides.ready_timeout_secs.as_deref()) {
        None => DEFAULT_READY_TIMEOUT_SECS,
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(0) | Err(_) => {
                return Err(AppError::Config(format!(
                    "{ENV_READY_TIMEOUT_SECS} must be a positive number of seconds, got '{raw}'"
                )));
            }
            Ok(secs) => secs,
        },
    };

    Ok(RuntimeSettings {
        keystore: CommandSpec::new(keystore_bin, keystore_args),
        conductor: CommandSpec::new(conductor_bin, Vec::<String>::new()),
        ready_timeout: Duration::from_secs(ready_timeout_secs),
        base_dir: non_empty(overrides.base_dir.as_deref()).map(|d| resolve_path(d, cwd)),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Expand `~` and anchor relative paths at `cwd`.
pub fn resolve_path(path: &str, cwd: &Path) -> PathBuf {
    let expanded = expand_home(path);
    if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
