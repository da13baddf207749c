//! Vigil CLI - Eye strain, fatigue and posture monitoring over recorded sessions.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::replay::ReplayArgs;
use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load();

    let exit_code = match cli.command {
        Some(Commands::Replay(args)) => replay(ReplayArgs::with_config(args, &config)),
        Some(Commands::Baseline(ref args)) => match commands::baseline::run(args, &config) {
            Ok(()) => ExitCode::Success,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::Error
            }
        },
        None => {
            // Default behavior: replay with flattened args
            if cli.replay.paths.is_empty() {
                eprintln!("error: No paths specified. Use --help for usage information.");
                return ExitCode::Error.into();
            }
            replay(ReplayArgs::with_config(cli.replay, &config))
        }
    };

    exit_code.into()
}

fn replay(args: ReplayArgs) -> ExitCode {
    match commands::replay::run(&args) {
        Ok(report) => report.exit_code(),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    }
}
