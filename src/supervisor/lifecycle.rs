//! Lifecycle states of one supervised run.

use std::fmt;

/// Where the orchestrator is in its run. States only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    Idle,
    SettingUp,
    Starting,
    Running,
    Ready,
    Closing,
    Stopped,
}

impl LifecycleState {
    pub const fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::SettingUp => "setting_up",
            LifecycleState::Starting => "starting",
            LifecycleState::Running => "running",
            LifecycleState::Ready => "ready",
            LifecycleState::Closing => "closing",
            LifecycleState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
