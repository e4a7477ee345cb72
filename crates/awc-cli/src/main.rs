use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use awc_cli::commands::{batch, clean, show_config};
use awc_cli::{Cli, Config, Overrides};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr; stdout carries only JSON
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref(), &Overrides::from_cli(&cli))
        .context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.show_config {
        show_config::run(&config, &mut out)?;
    } else if let Some(dir) = &cli.directory {
        let written = batch::run(dir, &config, &mut out)?;
        tracing::info!(files = written, "directory cleaned");
    } else {
        clean::run(cli.input.as_deref(), &config, &mut out)?;
    }

    Ok(())
}
