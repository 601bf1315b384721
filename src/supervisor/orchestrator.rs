//! Lifecycle orchestrator: one end-to-end supervised run.
//!
//! ```text
//! idle → setting_up → starting → running → ready → closing → stopped
//!          setup()     start()   listeners  ready()   close()   stop()
//! ```
//!
//! Both shutdown hooks are armed before `setup`. Whatever happens in between,
//! the run ends by triggering the exit hook, so `stop` is attempted on every
//! path. A signal that arrives mid-run abandons the in-flight lifecycle call
//! and jumps straight to stop.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::AppError;
use crate::logs::LogSink;
use crate::runtime::{RuntimeError, RuntimeFuture, RuntimeManager};
use crate::supervisor::lifecycle::LifecycleState;
use crate::supervisor::listeners;
use crate::supervisor::shutdown::{ShutdownGuard, ShutdownTrigger};
use crate::supervisor::status::announce;

pub struct Orchestrator<M: RuntimeManager + ?Sized> {
    manager: Arc<M>,
    config: Config,
    sink: Arc<dyn LogSink>,
    state: watch::Sender<LifecycleState>,
}

impl<M: RuntimeManager + ?Sized> Orchestrator<M> {
    pub fn new(manager: Arc<M>, config: Config, sink: Arc<dyn LogSink>) -> Self {
        let (state, _) = watch::channel(LifecycleState::Idle);
        Self {
            manager,
            config,
            sink,
            state,
        }
    }

    /// Observe state transitions.
    pub fn state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    fn transition(&self, next: LifecycleState) {
        let previous = self.state.send_replace(next);
        debug!(from = %previous, to = %next, "lifecycle transition");
    }

    /// Run to completion. `interrupt` resolves when the operator asks to
    /// stop (see [`crate::bootstrap::signals::interrupted`]).
    ///
    /// Returns the first lifecycle error, after stop has been attempted, for
    /// the caller to report. Stop failures themselves are only logged.
    pub async fn run<F>(self, interrupt: F) -> Result<(), AppError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = ShutdownGuard::new(Arc::clone(&self.manager));
        guard.register_exit_hook();
        guard.register_signal_hook(interrupt);

        let mut tasks = JoinSet::new();
        let result = self.drive(&guard, &mut tasks).await;

        announce("Running cleanup...");
        self.transition(LifecycleState::Closing);
        guard.trigger_shutdown(ShutdownTrigger::Exit).await;
        debug_assert!(guard.is_complete() && !guard.hooks_registered());
        listeners::drain(tasks, listeners::DRAIN_TIMEOUT).await;
        self.transition(LifecycleState::Stopped);

        result.map_err(AppError::from)
    }

    async fn drive(
        &self,
        guard: &ShutdownGuard<M>,
        tasks: &mut JoinSet<()>,
    ) -> Result<(), RuntimeError> {
        let options = self.config.runtime_options();

        self.transition(LifecycleState::SettingUp);
        let Some(base_dir) = interruptible(guard, "setup", self.manager.setup(&options)).await?
        else {
            return Ok(());
        };

        announce(&format!("Starting Holochain in \"{}\"...", base_dir.display()));
        self.transition(LifecycleState::Starting);
        if interruptible(guard, "start", self.manager.start()).await?.is_none() {
            return Ok(());
        }

        listeners::attach(self.manager.as_ref(), self.config.threshold, &self.sink, tasks);
        self.transition(LifecycleState::Running);

        if interruptible(guard, "ready", self.manager.ready()).await?.is_none() {
            return Ok(());
        }
        self.transition(LifecycleState::Ready);
        announce("Holochain is ready");
        info!(base_dir = %base_dir.display(), "runtime ready");

        interruptible(guard, "close", self.manager.close()).await?;
        Ok(())
    }
}

/// Await `call` unless shutdown is requested first, in which case the call
/// is abandoned and `None` returned.
async fn interruptible<M, T>(
    guard: &ShutdownGuard<M>,
    phase: &'static str,
    call: RuntimeFuture<'_, T>,
) -> Result<Option<T>, RuntimeError>
where
    M: RuntimeManager + ?Sized,
{
    tokio::select! {
        biased;
        _ = guard.requested() => {
            info!(phase, "shutdown requested; abandoning lifecycle call");
            Ok(None)
        }
        result = call => result.map(Some),
    }
}
