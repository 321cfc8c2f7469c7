//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Scene bridge CLI: module sync and development server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: scenebridge.toml)
    #[arg(short = 'C', long, global = true, default_value = "scenebridge.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the module directory and push `update` on changes
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Port of the notification WebSocket
        #[arg(short, long)]
        ws_port: Option<u16>,
    },

    /// Fetch and stage the module manifest into a directory
    #[command(visible_alias = "y")]
    Sync {
        /// Directory backing the runtime filesystem
        #[arg(short, long, default_value = ".scenebridge", value_hint = clap::ValueHint::DirPath)]
        out: PathBuf,

        /// Override `modules.base_url`
        #[arg(short, long)]
        base_url: Option<String>,

        /// Keep a live channel open and resync on every notification
        #[arg(short, long)]
        watch: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["scenebridge", "serve", "--port", "9000", "-w", "9001"]);
        assert_eq!(cli.config, PathBuf::from("scenebridge.toml"));
        match cli.command {
            Commands::Serve { port, ws_port, interface } => {
                assert_eq!(port, Some(9000));
                assert_eq!(ws_port, Some(9001));
                assert_eq!(interface, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_sync_with_globals() {
        let cli = Cli::parse_from(["scenebridge", "y", "--watch", "-v", "-C", "alt.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        match cli.command {
            Commands::Sync { out, base_url, watch } => {
                assert!(watch);
                assert_eq!(out, PathBuf::from(".scenebridge"));
                assert_eq!(base_url, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
