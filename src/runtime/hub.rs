//! Per-stream log channels: one broadcast channel for each [`StreamSource`].

use tokio::sync::broadcast;
use tracing::trace;

use crate::logs::{LogEvent, StreamSource};

/// Default buffer per stream before slow listeners start lagging.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Publisher side of the four log channels.
///
/// Clone freely: clones publish into the same channels.
#[derive(Clone)]
pub struct StreamHub {
    keystore_stdout: broadcast::Sender<LogEvent>,
    keystore_stderr: broadcast::Sender<LogEvent>,
    conductor_stdout: broadcast::Sender<LogEvent>,
    conductor_stderr: broadcast::Sender<LogEvent>,
}

impl StreamHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            keystore_stdout: broadcast::channel(capacity).0,
            keystore_stderr: broadcast::channel(capacity).0,
            conductor_stdout: broadcast::channel(capacity).0,
            conductor_stderr: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, stream: StreamSource) -> &broadcast::Sender<LogEvent> {
        match stream {
            StreamSource::KeystoreStdout => &self.keystore_stdout,
            StreamSource::KeystoreStderr => &self.keystore_stderr,
            StreamSource::ConductorStdout => &self.conductor_stdout,
            StreamSource::ConductorStderr => &self.conductor_stderr,
        }
    }

    pub fn subscribe(&self, stream: StreamSource) -> broadcast::Receiver<LogEvent> {
        self.sender(stream).subscribe()
    }

    /// Publish on the channel named by `event.record.source`. Events with no
    /// listener are dropped.
    pub fn publish(&self, event: LogEvent) {
        let stream = event.record.source;
        if self.sender(stream).send(event).is_err() {
            trace!(%stream, "no listeners; log event dropped");
        }
    }

    pub fn listener_count(&self, stream: StreamSource) -> usize {
        self.sender(stream).receiver_count()
    }
}

impl Default for StreamHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
