//! Run configuration.
//!
//! Built from the parsed command line, then `BACKDROP_*` env overrides for
//! the process runtime are applied.
//!
//! # Module layout
//!
//! - **types**: Resolved structs (`Config`, `RuntimeSettings`, `CommandSpec`).
//! - **load**: Resolution logic: `load`, `load_with`, `runtime_settings_from`,
//!   `resolve_path`, `expand_home`.

mod load;
mod types;

pub use load::{
    ENV_BASE_DIR, ENV_CONDUCTOR_BIN, ENV_KEYSTORE_ARGS, ENV_KEYSTORE_BIN, ENV_READY_TIMEOUT_SECS,
    RuntimeOverrides, expand_home, load, load_with, resolve_path, runtime_settings_from,
};
pub use types::*;
