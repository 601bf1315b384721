//! hc-backdrop: supervises a keystore and a conductor for local development.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse flags and resolve config (CLI > `BACKDROP_*` env > defaults)
//!   3. Init logger once, at the level implied by the filter threshold
//!   4. Build the process runtime
//!   5. Run the orchestrator until close, error, or SIGINT/SIGTERM

use std::error::Error as _;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use backdrop_cli::bootstrap::{logger, signals};
use backdrop_cli::cli::Cli;
use backdrop_cli::config;
use backdrop_cli::error::AppError;
use backdrop_cli::logs::StderrSink;
use backdrop_cli::runtime::ProcessRuntime;
use backdrop_cli::supervisor::Orchestrator;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present: ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let config = config::load(&cli, &cwd)?;

    logger::init_for(config.threshold, config.verbosity_explicit)?;

    info!(
        threshold = %config.threshold,
        admin_port = ?config.admin_port,
        config_path = ?config.config_path,
        keystore = %config.runtime.keystore.program,
        conductor = %config.runtime.conductor.program,
        "config loaded"
    );

    let runtime = Arc::new(ProcessRuntime::new(config.runtime.clone()));
    Orchestrator::new(runtime, config, Arc::new(StderrSink))
        .run(signals::interrupted())
        .await
}
