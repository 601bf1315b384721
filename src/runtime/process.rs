//! Process-backed runtime manager.
//!
//! Spawns the keystore and the conductor as child processes, pumps their
//! stdout/stderr line by line into the [`StreamHub`], and polls for
//! readiness and exit.
//!
//! Config-file generation and admin-port allocation are left to the
//! conductor itself; this manager only forwards the config path and probes
//! the admin port it was given.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{CommandSpec, RuntimeSettings};
use crate::logs::{LogEvent, StreamSource};
use crate::runtime::parse::parse_line;
use crate::runtime::{RuntimeError, RuntimeFuture, RuntimeManager, RuntimeOptions, StreamHub};

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const STOP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessKind {
    Keystore,
    Conductor,
}

impl ProcessKind {
    const fn name(self) -> &'static str {
        match self {
            ProcessKind::Keystore => "keystore",
            ProcessKind::Conductor => "conductor",
        }
    }

    const fn streams(self) -> (StreamSource, StreamSource) {
        match self {
            ProcessKind::Keystore => (StreamSource::KeystoreStdout, StreamSource::KeystoreStderr),
            ProcessKind::Conductor => (StreamSource::ConductorStdout, StreamSource::ConductorStderr),
        }
    }
}

struct Supervised {
    kind: ProcessKind,
    child: Child,
}

#[derive(Default)]
struct ProcessState {
    options: RuntimeOptions,
    base_dir: Option<PathBuf>,
    children: Vec<Supervised>,
}

pub struct ProcessRuntime {
    settings: RuntimeSettings,
    /// Dropped on stop so listeners see their channels close.
    hub: Mutex<Option<StreamHub>>,
    state: tokio::sync::Mutex<ProcessState>,
}

impl ProcessRuntime {
    pub fn new(settings: RuntimeSettings) -> Self {
        Self {
            settings,
            hub: Mutex::new(Some(StreamHub::default())),
            state: tokio::sync::Mutex::new(ProcessState::default()),
        }
    }

    fn hub(&self) -> Option<StreamHub> {
        match self.hub.lock() {
            Ok(hub) => hub.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn close_streams(&self) {
        let mut hub = match self.hub.lock() {
            Ok(hub) => hub,
            Err(poisoned) => poisoned.into_inner(),
        };
        hub.take();
    }

    /// Base directory: explicit setting, else the config file's directory,
    /// else a fresh directory under the system temp dir.
    fn choose_base_dir(&self, options: &RuntimeOptions) -> PathBuf {
        if let Some(dir) = &self.settings.base_dir {
            return dir.clone();
        }
        if let Some(parent) = options
            .config_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
        {
            return parent.to_path_buf();
        }
        std::env::temp_dir().join(format!("backdrop-{}", uuid::Uuid::new_v4()))
    }

    fn command_for(&self, kind: ProcessKind, options: &RuntimeOptions) -> CommandSpec {
        match kind {
            ProcessKind::Keystore => self.settings.keystore.clone(),
            ProcessKind::Conductor => {
                let mut command = self.settings.conductor.clone();
                if let Some(path) = &options.config_path {
                    command.args.push("--config-path".into());
                    command.args.push(path.display().to_string());
                }
                command
            }
        }
    }

    fn spawn(
        &self,
        kind: ProcessKind,
        command: &CommandSpec,
        base_dir: &Path,
        hub: &StreamHub,
    ) -> Result<Supervised, RuntimeError> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(base_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RuntimeError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        let (out_stream, err_stream) = kind.streams();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(pump(out_stream, stdout, hub.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(pump(err_stream, stderr, hub.clone()));
        }

        info!(process = kind.name(), program = %command.program, pid = ?child.id(), "process spawned");
        Ok(Supervised { kind, child })
    }

    async fn do_setup(&self, options: &RuntimeOptions) -> Result<PathBuf, RuntimeError> {
        let base_dir = self.choose_base_dir(options);
        tokio::fs::create_dir_all(&base_dir).await.map_err(|e| {
            RuntimeError::Setup(format!("cannot create base directory {}: {e}", base_dir.display()))
        })?;

        let mut state = self.state.lock().await;
        state.options = options.clone();
        state.base_dir = Some(base_dir.clone());
        debug!(base_dir = %base_dir.display(), "setup complete");
        Ok(base_dir)
    }

    async fn do_start(&self) -> Result<(), RuntimeError> {
        let hub = self
            .hub()
            .ok_or_else(|| RuntimeError::Start("runtime has already been stopped".into()))?;
        let mut state = self.state.lock().await;
        let base_dir = state
            .base_dir
            .clone()
            .ok_or_else(|| RuntimeError::Start("setup has not run".into()))?;
        if !state.children.is_empty() {
            return Err(RuntimeError::Start("processes are already running".into()));
        }

        for kind in [ProcessKind::Keystore, ProcessKind::Conductor] {
            let command = self.command_for(kind, &state.options);
            let supervised = self.spawn(kind, &command, &base_dir, &hub)?;
            state.children.push(supervised);
        }
        Ok(())
    }

    async fn do_ready(&self) -> Result<(), RuntimeError> {
        let deadline = Instant::now() + self.settings.ready_timeout;
        loop {
            let admin_port = {
                let mut state = self.state.lock().await;
                if state.children.is_empty() {
                    return Err(RuntimeError::Readiness("processes have not been started".into()));
                }
                if let Some((kind, status)) = first_exited(&mut state.children)
                    .map_err(|e| RuntimeError::Readiness(e.to_string()))?
                {
                    return Err(RuntimeError::Readiness(format!(
                        "{} exited during startup ({status})",
                        kind.name()
                    )));
                }
                state.options.admin_port
            };

            let Some(port) = admin_port else {
                return Ok(());
            };
            if TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
                debug!(port, "admin port accepting connections");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(RuntimeError::Readiness(format!(
                    "admin port {port} did not open within {}s",
                    self.settings.ready_timeout.as_secs()
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn do_close(&self) -> Result<(), RuntimeError> {
        loop {
            {
                let mut state = self.state.lock().await;
                if state.children.is_empty() {
                    return Ok(());
                }
                if let Some((kind, status)) = first_exited(&mut state.children)
                    .map_err(|e| RuntimeError::Close(e.to_string()))?
                {
                    info!(process = kind.name(), %status, "supervised process exited");
                    return Ok(());
                }
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn do_stop(&self) -> Result<(), RuntimeError> {
        self.close_streams();
        let mut state = self.state.lock().await;
        let mut failures = Vec::new();

        // Conductor first: it holds a connection to the keystore.
        while let Some(mut supervised) = state.children.pop() {
            let name = supervised.kind.name();
            match supervised.child.try_wait() {
                Ok(Some(status)) => {
                    debug!(process = name, %status, "already exited");
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    failures.push(format!("{name}: {e}"));
                    continue;
                }
            }
            match tokio::time::timeout(STOP_TIMEOUT, supervised.child.kill()).await {
                Ok(Ok(())) => info!(process = name, "process stopped"),
                Ok(Err(e)) => failures.push(format!("{name}: {e}")),
                Err(_) => failures.push(format!(
                    "{name}: did not exit within {}s",
                    STOP_TIMEOUT.as_secs()
                )),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(RuntimeError::Stop(failures.join("; ")))
        }
    }
}

fn first_exited(
    children: &mut [Supervised],
) -> std::io::Result<Option<(ProcessKind, ExitStatus)>> {
    for supervised in children.iter_mut() {
        if let Some(status) = supervised.child.try_wait()? {
            return Ok(Some((supervised.kind, status)));
        }
    }
    Ok(None)
}

async fn pump<R>(stream: StreamSource, reader: R, hub: StreamHub)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let record = parse_line(stream, &line, Utc::now());
                hub.publish(LogEvent { line, record });
            }
            Ok(None) => break,
            Err(e) => {
                warn!(%stream, error = %e, "failed reading process output");
                break;
            }
        }
    }
    debug!(%stream, "process output closed");
}

impl RuntimeManager for ProcessRuntime {
    fn setup<'a>(&'a self, options: &'a RuntimeOptions) -> RuntimeFuture<'a, PathBuf> {
        Box::pin(self.do_setup(options))
    }

    fn start(&self) -> RuntimeFuture<'_, ()> {
        Box::pin(self.do_start())
    }

    fn ready(&self) -> RuntimeFuture<'_, ()> {
        Box::pin(self.do_ready())
    }

    fn close(&self) -> RuntimeFuture<'_, ()> {
        Box::pin(self.do_close())
    }

    fn stop(&self) -> RuntimeFuture<'_, ()> {
        Box::pin(self.do_stop())
    }

    fn subscribe(&self, stream: StreamSource) -> broadcast::Receiver<LogEvent> {
        match self.hub() {
            Some(hub) => hub.subscribe(stream),
            // Stopped: hand out a receiver whose sender is already gone.
            None => broadcast::channel(1).1,
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(dir: &Path, keystore: CommandSpec, conductor: CommandSpec) -> RuntimeSettings {
        RuntimeSettings {
            keystore,
            conductor,
            ready_timeout: Duration::from_secs(2),
            base_dir: Some(dir.to_path_buf()),
        }
    }

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh", ["-c", script])
    }

    #[tokio::test]
    async fn setup_creates_base_dir() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("nested/run");
        let runtime = ProcessRuntime::new(settings(&base, sh("true"), sh("true")));

        let dir = runtime.setup(&RuntimeOptions::default()).await.unwrap();

        assert_eq!(dir, base);
        assert!(base.is_dir());
    }

    #[tokio::test]
    async fn base_dir_defaults_to_config_parent() {
        let tmp = TempDir::new().unwrap();
        let mut s = settings(tmp.path(), sh("true"), sh("true"));
        s.base_dir = None;
        let runtime = ProcessRuntime::new(s);
        let options = RuntimeOptions {
            admin_port: None,
            config_path: Some(tmp.path().join("conductor.yaml")),
        };

        let dir = runtime.setup(&options).await.unwrap();
        assert_eq!(dir, tmp.path());
    }

    #[tokio::test]
    async fn start_before_setup_fails() {
        let tmp = TempDir::new().unwrap();
        let runtime = ProcessRuntime::new(settings(tmp.path(), sh("true"), sh("true")));
        let err = runtime.start().await.unwrap_err();
        assert!(matches!(err, RuntimeError::Start(_)));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let tmp = TempDir::new().unwrap();
        let runtime = ProcessRuntime::new(settings(
            tmp.path(),
            CommandSpec::new("/nonexistent/lair-keystore", Vec::<String>::new()),
            sh("true"),
        ));
        runtime.setup(&RuntimeOptions::default()).await.unwrap();

        let err = runtime.start().await.unwrap_err();
        assert!(matches!(err, RuntimeError::Spawn { .. }), "{err}");
    }

    #[tokio::test]
    async fn output_lines_reach_their_streams() {
        let tmp = TempDir::new().unwrap();
        let runtime = ProcessRuntime::new(settings(
            tmp.path(),
            sh("echo lair-ready; exec sleep 5"),
            sh(r#"echo '{"level":"ERROR","target":"conductor","message":"boom"}' 1>&2; exec sleep 5"#),
        ));
        let mut lair = runtime.subscribe(StreamSource::KeystoreStdout);
        let mut conductor = runtime.subscribe(StreamSource::ConductorStderr);

        runtime.setup(&RuntimeOptions::default()).await.unwrap();
        runtime.start().await.unwrap();
        runtime.ready().await.unwrap();

        let lair_event = tokio::time::timeout(Duration::from_secs(2), lair.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(lair_event.record.message, "lair-ready");
        assert_eq!(lair_event.record.severity, None);

        let conductor_event = tokio::time::timeout(Duration::from_secs(2), conductor.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conductor_event.record.severity.as_deref(), Some("error"));
        assert_eq!(conductor_event.record.message, "boom");

        runtime.stop().await.unwrap();
    }

    #[tokio::test]
    async fn ready_fails_when_a_process_dies() {
        let tmp = TempDir::new().unwrap();
        let runtime = ProcessRuntime::new(settings(tmp.path(), sh("exec sleep 5"), sh("exit 3")));
        let options = RuntimeOptions {
            // Nothing listens here, so ready keeps polling until the exit is seen.
            admin_port: Some(9),
            config_path: None,
        };
        runtime.setup(&options).await.unwrap();
        runtime.start().await.unwrap();

        let err = runtime.ready().await.unwrap_err();
        assert!(matches!(err, RuntimeError::Readiness(_)), "{err}");
        runtime.stop().await.unwrap();
    }

    #[tokio::test]
    async fn ready_waits_for_admin_port() {
        let tmp = TempDir::new().unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let runtime = ProcessRuntime::new(settings(tmp.path(), sh("exec sleep 5"), sh("exec sleep 5")));
        let options = RuntimeOptions {
            admin_port: Some(port),
            config_path: None,
        };

        runtime.setup(&options).await.unwrap();
        runtime.start().await.unwrap();
        runtime.ready().await.unwrap();
        runtime.stop().await.unwrap();
    }

    #[tokio::test]
    async fn close_resolves_when_a_process_exits() {
        let tmp = TempDir::new().unwrap();
        let runtime = ProcessRuntime::new(settings(tmp.path(), sh("exec sleep 5"), sh("sleep 0.1")));
        runtime.setup(&RuntimeOptions::default()).await.unwrap();
        runtime.start().await.unwrap();

        tokio::time::timeout(Duration::from_secs(3), runtime.close())
            .await
            .expect("close should resolve after the conductor exits")
            .unwrap();
        runtime.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stop_closes_streams() {
        let tmp = TempDir::new().unwrap();
        let runtime = ProcessRuntime::new(settings(tmp.path(), sh("exec sleep 5"), sh("exec sleep 5")));
        let mut rx = runtime.subscribe(StreamSource::ConductorStdout);
        runtime.setup(&RuntimeOptions::default()).await.unwrap();
        runtime.start().await.unwrap();

        runtime.stop().await.unwrap();

        let closed = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        assert!(matches!(closed, Err(broadcast::error::RecvError::Closed)));
        assert!(matches!(
            runtime.subscribe(StreamSource::KeystoreStdout).try_recv(),
            Err(broadcast::error::TryRecvError::Closed)
        ));
    }
}
