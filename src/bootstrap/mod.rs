//! Bootstrap layer: process-wide setup that runs before the orchestrator.
//!
//! - **logger**: tracing-subscriber initialisation.
//! - **signals**: the OS interrupt future fed to the shutdown guard.

pub mod logger;
pub mod signals;
