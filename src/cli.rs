//! Command-line surface.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Run a Holochain keystore + conductor pair and stream their logs.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "hc-backdrop", version, about)]
pub struct Cli {
    /// Increase logging verbosity (repeat for more).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all printing except for the final result.
    #[arg(short, long)]
    pub quiet: bool,

    /// Admin port that will be saved in the conductor's config.
    #[arg(short = 'p', long, value_name = "PORT")]
    pub admin_port: Option<u16>,

    /// Config path (generated if the file does not exist).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Number of `-v` occurrences, or `None` when the flag was not given.
    pub fn verbose_count(&self) -> Option<u8> {
        (self.verbose > 0).then_some(self.verbose)
    }

    /// `true` when the operator picked a verbosity explicitly.
    pub fn verbosity_explicit(&self) -> bool {
        self.verbose > 0 || self.quiet
    }
}
