//! CLI command definitions and handlers.

pub mod baseline;
pub mod replay;

use clap::{Parser, Subcommand};

/// Vigil - Eye strain, fatigue and posture monitoring over recorded landmark sessions
#[derive(Parser)]
#[command(name = "vigil")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared replay arguments (paths, thresholds, flags).
    #[command(flatten)]
    pub replay: replay::ReplayArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Replay recorded sessions through the monitor
    Replay(replay::ReplayArgs),
    /// Manage the persisted calibration baseline
    Baseline(baseline::BaselineArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// No alerts surfaced.
    Success = 0,
    /// At least one alert surfaced.
    AlertsRaised = 1,
    /// Invalid invocation or runtime failure.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
