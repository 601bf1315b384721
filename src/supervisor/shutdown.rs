//! Shutdown guard: runs the runtime manager's stop exactly once.
//!
//! Two hooks can trigger shutdown: the exit hook (the orchestrator's own
//! cleanup path) and the signal hook (a task waiting on an OS interrupt).
//! They may fire in either order or at the same time.
//!
//! # Protocol
//!
//! 1. The first [`ShutdownGuard::trigger_shutdown`] call claims the guard with
//!    an atomic swap and cancels the `requested` token so in-flight lifecycle
//!    calls are abandoned.
//! 2. It awaits `stop()`. A failure is logged, never returned.
//! 3. It deregisters both hooks unconditionally (the signal task is aborted,
//!    the exit hook disarmed) and fires the `done` token.
//!
//! Any other call does not touch the manager; it waits for `done` and
//! returns `false`.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::runtime::RuntimeManager;
use crate::supervisor::status::announce;

/// Which hook asked for shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownTrigger {
    Exit,
    Signal,
}

#[derive(Default)]
struct Hooks {
    signal: Option<JoinHandle<()>>,
    exit: bool,
}

pub struct ShutdownGuard<M: RuntimeManager + ?Sized> {
    manager: Arc<M>,
    armed: AtomicBool,
    hooks: Mutex<Hooks>,
    requested: CancellationToken,
    done: CancellationToken,
}

impl<M: RuntimeManager + ?Sized> ShutdownGuard<M> {
    pub fn new(manager: Arc<M>) -> Arc<Self> {
        Arc::new(Self {
            manager,
            armed: AtomicBool::new(true),
            hooks: Mutex::new(Hooks::default()),
            requested: CancellationToken::new(),
            done: CancellationToken::new(),
        })
    }

    fn hooks(&self) -> MutexGuard<'_, Hooks> {
        match self.hooks.lock() {
            Ok(hooks) => hooks,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Arm the exit hook. The owner calls [`Self::trigger_shutdown`] with
    /// [`ShutdownTrigger::Exit`] on its way out.
    pub fn register_exit_hook(&self) {
        self.hooks().exit = true;
    }

    /// Spawn a task that triggers shutdown once `signal` completes.
    pub fn register_signal_hook<F>(self: &Arc<Self>, signal: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = Arc::clone(self);
        let handle = tokio::spawn(async move {
            signal.await;
            info!("interrupt received; initiating shutdown");
            guard.trigger_shutdown(ShutdownTrigger::Signal).await;
        });
        if let Some(previous) = self.hooks().signal.replace(handle) {
            previous.abort();
        }
    }

    /// Run the stop sequence if nobody has yet. Returns `true` for the call
    /// that actually ran it.
    pub async fn trigger_shutdown(&self, trigger: ShutdownTrigger) -> bool {
        if !self.armed.swap(false, Ordering::AcqRel) {
            debug!(?trigger, "shutdown already claimed; waiting for it to finish");
            self.done.cancelled().await;
            return false;
        }

        self.requested.cancel();
        announce("\nStopping Holochain...");
        info!(?trigger, "stopping runtime");

        if let Err(e) = self.manager.stop().await {
            error!(error = %e, "runtime stop raised an error");
        }

        self.deregister();
        self.done.cancel();
        true
    }

    fn deregister(&self) {
        let mut hooks = self.hooks();
        if let Some(signal) = hooks.signal.take() {
            signal.abort();
        }
        hooks.exit = false;
        debug!("shutdown hooks deregistered");
    }

    /// Resolves as soon as a trigger has claimed the guard.
    pub async fn requested(&self) {
        self.requested.cancelled().await;
    }

    /// `true` once stop has run and the hooks are gone.
    pub fn is_complete(&self) -> bool {
        self.done.is_cancelled()
    }

    pub fn hooks_registered(&self) -> bool {
        let hooks = self.hooks();
        hooks.exit || hooks.signal.is_some()
    }
}
