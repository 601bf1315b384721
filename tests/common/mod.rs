//! Scripted runtime manager shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use backdrop_cli::config::{CommandSpec, Config, RuntimeSettings};
use backdrop_cli::logs::{LogEvent, LogRecord, StreamSource};
use backdrop_cli::runtime::{RuntimeError, RuntimeFuture, RuntimeManager, RuntimeOptions, StreamHub};
use backdrop_cli::verbosity::Threshold;
use tokio::sync::broadcast;

/// One observed call on the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Setup(RuntimeOptions),
    Start,
    Subscribe(StreamSource),
    Ready,
    Close,
    Stop,
}

/// Which calls misbehave.
#[derive(Debug, Default, Clone)]
pub struct Script {
    pub fail_setup: bool,
    pub fail_start: bool,
    pub fail_ready: bool,
    pub fail_stop: bool,
    /// `ready` never resolves.
    pub block_ready: bool,
    /// `close` never resolves.
    pub block_close: bool,
}

pub struct FakeRuntime {
    script: Script,
    calls: Mutex<Vec<Call>>,
    hub: Mutex<Option<StreamHub>>,
    /// Published on their streams while `ready` runs.
    ready_events: Vec<LogEvent>,
    listeners_at_ready: AtomicUsize,
}

impl FakeRuntime {
    pub fn new(script: Script) -> Arc<Self> {
        Self::with_events(script, Vec::new())
    }

    pub fn with_events(script: Script, ready_events: Vec<LogEvent>) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
            hub: Mutex::new(Some(StreamHub::default())),
            ready_events,
            listeners_at_ready: AtomicUsize::new(0),
        })
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls().iter().filter(|c| *c == wanted).count()
    }

    pub fn subscriptions(&self) -> Vec<StreamSource> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Subscribe(stream) => Some(stream),
                _ => None,
            })
            .collect()
    }

    /// Receivers alive on all four streams when `ready` was entered.
    pub fn listeners_at_ready(&self) -> usize {
        self.listeners_at_ready.load(Ordering::SeqCst)
    }
}

impl RuntimeManager for FakeRuntime {
    fn setup<'a>(&'a self, options: &'a RuntimeOptions) -> RuntimeFuture<'a, PathBuf> {
        Box::pin(async move {
            self.record(Call::Setup(options.clone()));
            if self.script.fail_setup {
                return Err(RuntimeError::Setup("disk full".into()));
            }
            Ok(PathBuf::from("/tmp/backdrop-test"))
        })
    }

    fn start(&self) -> RuntimeFuture<'_, ()> {
        Box::pin(async move {
            self.record(Call::Start);
            if self.script.fail_start {
                return Err(RuntimeError::Start("keystore missing".into()));
            }
            Ok(())
        })
    }

    fn ready(&self) -> RuntimeFuture<'_, ()> {
        Box::pin(async move {
            self.record(Call::Ready);
            let hub = self.hub.lock().unwrap().clone();
            if let Some(hub) = hub {
                let listening: usize = StreamSource::ALL
                    .into_iter()
                    .map(|s| hub.listener_count(s))
                    .sum();
                self.listeners_at_ready.store(listening, Ordering::SeqCst);
                for event in &self.ready_events {
                    hub.publish(event.clone());
                }
            }
            if self.script.block_ready {
                std::future::pending::<()>().await;
            }
            if self.script.fail_ready {
                return Err(RuntimeError::Readiness("admin port never opened".into()));
            }
            Ok(())
        })
    }

    fn close(&self) -> RuntimeFuture<'_, ()> {
        Box::pin(async move {
            self.record(Call::Close);
            if self.script.block_close {
                std::future::pending::<()>().await;
            }
            Ok(())
        })
    }

    fn stop(&self) -> RuntimeFuture<'_, ()> {
        Box::pin(async move {
            self.record(Call::Stop);
            self.hub.lock().unwrap().take();
            if self.script.fail_stop {
                return Err(RuntimeError::Stop("conductor refused to die".into()));
            }
            Ok(())
        })
    }

    fn subscribe(&self, stream: StreamSource) -> broadcast::Receiver<LogEvent> {
        self.record(Call::Subscribe(stream));
        match self.hub.lock().unwrap().as_ref() {
            Some(hub) => hub.subscribe(stream),
            None => broadcast::channel(1).1,
        }
    }
}

pub fn config(admin_port: Option<u16>, threshold: u8) -> Config {
    Config {
        threshold: Threshold::new(threshold),
        verbosity_explicit: false,
        admin_port,
        config_path: None,
        runtime: RuntimeSettings {
            keystore: CommandSpec::new("lair-keystore", ["server"]),
            conductor: CommandSpec::new("holochain", Vec::<String>::new()),
            ready_timeout: Duration::from_secs(1),
            base_dir: Some(Path::new("/tmp/backdrop-test").to_path_buf()),
        },
    }
}

pub fn structured(source: StreamSource, level: &str, message: &str) -> LogEvent {
    LogEvent {
        line: message.into(),
        record: LogRecord::structured(source, chrono::Utc::now(), level, "holochain::conductor", message),
    }
}

pub fn raw(source: StreamSource, message: &str) -> LogEvent {
    LogEvent {
        line: message.into(),
        record: LogRecord::raw(source, chrono::Utc::now(), message),
    }
}
