//! Stream listeners: one task per log stream.
//!
//! Each task drains its broadcast receiver in arrival order and writes every
//! record that passes the threshold to the shared sink. A task ends when its
//! channel closes (the runtime manager dropped the stream after `stop`).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::logs::{LogEvent, LogSink, StreamSource, render};
use crate::runtime::RuntimeManager;
use crate::verbosity::Threshold;

/// How long listeners get to flush buffered records after stop.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Subscribe to all four streams and spawn a forwarding task for each.
pub fn attach<M: RuntimeManager + ?Sized>(
    manager: &M,
    threshold: Threshold,
    sink: &Arc<dyn LogSink>,
    tasks: &mut JoinSet<()>,
) {
    for stream in StreamSource::ALL {
        let rx = manager.subscribe(stream);
        debug!(%stream, "log listener attached");
        tasks.spawn(forward(stream, rx, threshold, Arc::clone(sink)));
    }
}

async fn forward(
    stream: StreamSource,
    mut rx: broadcast::Receiver<LogEvent>,
    threshold: Threshold,
    sink: Arc<dyn LogSink>,
) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Some(line) = render(stream.prefix(), &event.record, threshold) {
                    sink.write_line(&line);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(%stream, skipped, "log listener fell behind; records dropped");
            }
            Err(RecvError::Closed) => {
                debug!(%stream, "log stream closed");
                break;
            }
        }
    }
}

/// Wait up to `timeout` for listeners to finish on their own, then abort
/// whatever is left.
pub async fn drain(mut tasks: JoinSet<()>, timeout: Duration) {
    let finished = tokio::time::timeout(timeout, async {
        while tasks.join_next().await.is_some() {}
    })
    .await;

    if finished.is_err() {
        debug!(remaining = tasks.len(), "aborting log listeners still running");
        tasks.shutdown().await;
    }
}
