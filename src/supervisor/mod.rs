//! Supervisor: drives the runtime manager through one run and owns the
//! shutdown path.
//!
//! - **lifecycle**: [`LifecycleState`] and its ordering.
//! - **shutdown**: [`ShutdownGuard`]: exactly-once stop across racing triggers.
//! - **listeners**: one task per log stream, rendering into a sink.
//! - **orchestrator**: the ordered `setup → start → listen → ready → close → stop` run.
//! - **status**: operator-facing status lines on stdout.

pub mod lifecycle;
pub mod listeners;
pub mod orchestrator;
pub mod shutdown;
pub mod status;

pub use lifecycle::LifecycleState;
pub use orchestrator::Orchestrator;
pub use shutdown::{ShutdownGuard, ShutdownTrigger};
