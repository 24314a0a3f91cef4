//! Sonar CLI
//!
//! Command-line entry point for byte-to-tone sonification and reconstruction.

use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use sonar::cli::{commands, Cli};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Sonar v{}", env!("CARGO_PKG_VERSION"));

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            if let Some(sonar_err) = e.downcast_ref::<sonar::SonarError>() {
                eprintln!("Hint: {}", sonar_err.recovery_hint());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = commands::resolve_config(cli).context("invalid configuration")?;
    commands::run(cli, &config)
        .with_context(|| format!("{} failed for {}", cli.module, cli.filename.display()))?;
    Ok(())
}
