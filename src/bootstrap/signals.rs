//! OS interrupt handling.
//!
//! [`interrupted`] completes on SIGINT or SIGTERM (unix) or Ctrl-C
//! (elsewhere). It is handed to the shutdown guard as its signal hook.

use tracing::warn;

/// Wait for an interrupt. If listeners cannot be installed the future never
/// completes, so a broken signal setup cannot trigger a spurious shutdown.
pub async fn interrupted() {
    if let Err(e) = wait_for_interrupt().await {
        warn!(error = %e, "failed to install signal handlers; interrupt hook disabled");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_interrupt() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_interrupt() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
