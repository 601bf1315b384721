// Library root: the binary entry point is src/main.rs. Exposed as a
// library so integration tests can drive the orchestrator with fake runtimes.

mod core;

pub mod bootstrap;
pub mod cli;
pub mod logs;
pub mod runtime;
pub mod supervisor;
pub mod verbosity;

pub use crate::core::{config, error};
