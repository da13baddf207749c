//! Baseline command - inspect or reset the persisted calibration baseline.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use vigil_adapters::JsonBaselineStore;
use vigil_core::BaselineStore;

use crate::config::AppConfig;

/// Arguments for the baseline command
#[derive(Args)]
pub struct BaselineArgs {
    #[command(subcommand)]
    pub command: BaselineCommand,

    /// Baseline file (overrides config and the default location)
    #[arg(long, value_name = "FILE", global = true)]
    pub file: Option<PathBuf>,
}

/// Baseline subcommands
#[derive(Subcommand)]
pub enum BaselineCommand {
    /// Print the stored baseline as JSON
    Show,
    /// Print the baseline file path
    Path,
    /// Delete the stored baseline
    Clear,
}

/// Run the baseline command.
pub fn run(args: &BaselineArgs, config: &AppConfig) -> Result<()> {
    let path = args
        .file
        .clone()
        .or_else(|| config.baseline.path.clone())
        .unwrap_or_else(vigil_adapters::default_baseline_path);
    let store = JsonBaselineStore::new(path);

    match args.command {
        BaselineCommand::Show => show(&store),
        BaselineCommand::Path => {
            println!("{}", store.path().display());
            Ok(())
        }
        BaselineCommand::Clear => {
            if store.clear()? {
                println!("Removed {}", store.path().display());
            } else {
                println!("No baseline at {}", store.path().display());
            }
            Ok(())
        }
    }
}

fn show(store: &JsonBaselineStore) -> Result<()> {
    match store.load()? {
        Some(baseline) => {
            println!("{}", serde_json::to_string_pretty(&baseline)?);
        }
        None => {
            eprintln!("No baseline stored at {}", store.path().display());
        }
    }
    Ok(())
}
