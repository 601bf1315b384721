//! Runtime manager contract: the collaborator that owns the keystore and
//! conductor processes.
//!
//! # Lifecycle
//!
//! The orchestrator drives a [`RuntimeManager`] through
//! `setup → start → ready → close → stop`, each call awaited in order.
//! Log output is delivered out of band: [`RuntimeManager::subscribe`] hands
//! out a receiver on one of four per-stream channels (see [`StreamHub`]).
//!
//! # Implementations
//!
//! - [`ProcessRuntime`]: spawns the real binaries with `tokio::process`.
//! - Tests provide scripted fakes.

pub mod hub;
pub mod parse;
pub mod process;

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use thiserror::Error;
use tokio::sync::broadcast;

use crate::logs::{LogEvent, StreamSource};

pub use hub::StreamHub;
pub use process::ProcessRuntime;

/// A boxed future returned by every [`RuntimeManager`] lifecycle call.
pub type RuntimeFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, RuntimeError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("setup failed: {0}")]
    Setup(String),

    #[error("start failed: {0}")]
    Start(String),

    #[error("readiness check failed: {0}")]
    Readiness(String),

    #[error("stop failed: {0}")]
    Stop(String),

    #[error("close failed: {0}")]
    Close(String),

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// What the runtime manager needs to know from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub admin_port: Option<u16>,
    pub config_path: Option<PathBuf>,
}

/// Lifecycle contract consumed by the orchestrator.
///
/// Implementations are shared behind an `Arc` between the orchestrator and
/// the shutdown guard, so every call takes `&self`.
pub trait RuntimeManager: Send + Sync + 'static {
    /// Prepare the working directory; returns its path.
    fn setup<'a>(&'a self, options: &'a RuntimeOptions) -> RuntimeFuture<'a, PathBuf>;

    /// Launch the supervised processes.
    fn start(&self) -> RuntimeFuture<'_, ()>;

    /// Resolve once the system can accept requests.
    fn ready(&self) -> RuntimeFuture<'_, ()>;

    /// Resolve when the run is finished from the manager's point of view.
    fn close(&self) -> RuntimeFuture<'_, ()>;

    /// Terminate the supervised processes.
    fn stop(&self) -> RuntimeFuture<'_, ()>;

    /// Receiver for one of the four log streams.
    fn subscribe(&self, stream: StreamSource) -> broadcast::Receiver<LogEvent>;
}
