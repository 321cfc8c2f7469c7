//! scenebridge - module sync and development server.

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use scenebridge::cli::{self, Cli, Commands};
use scenebridge::config::BridgeConfig;
use scenebridge::{core, logger};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();
    logger::set_verbose(cli.verbose);

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let mut config = BridgeConfig::load(&cli.config)?;
    cli::apply_overrides(&mut config, &cli.command);
    config.validate()?;

    match cli.command {
        Commands::Serve { .. } => cli::serve::serve(&config),
        Commands::Sync { out, watch, .. } => {
            let out = config.get_root().join(out);
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .context("failed to create tokio runtime")?
                .block_on(cli::sync::sync(config, &out, watch))
        }
    }
}
