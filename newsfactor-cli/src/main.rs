//! Newsfactor CLI
//!
//! Runs the news pipeline and the interactive sessions from the terminal.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

mod cli;
mod commands;
mod config;
mod console;
mod error;
mod providers;

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::error::Result;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env file loaded");
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "newsfactor={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let path = cli.config.unwrap_or_else(config::config_path);
    let app_config = config::load_config_from(&path).await?;

    match cli.command {
        Commands::Run(args) => commands::run(args, &app_config).await,
        Commands::Crawl(args) => commands::crawl(args, &app_config).await,
        Commands::Assistant => commands::assistant(&app_config).await,
        Commands::Chat => commands::chat(&app_config).await,
        Commands::Draft => commands::draft(&app_config).await,
        Commands::Config(command) => commands::config(command, path, &app_config).await,
    }
}
