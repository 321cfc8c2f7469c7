//! Command-line entry points.

pub mod args;
pub mod serve;
pub mod sync;

pub use args::{Cli, Commands};

use crate::config::BridgeConfig;

/// Apply command-line overrides on top of the loaded configuration.
pub fn apply_overrides(config: &mut BridgeConfig, command: &Commands) {
    match command {
        Commands::Serve {
            interface,
            port,
            ws_port,
        } => {
            if let Some(interface) = interface {
                config.serve.interface = *interface;
            }
            if let Some(port) = port {
                config.serve.port = *port;
            }
            if let Some(ws_port) = ws_port {
                config.serve.ws_port = *ws_port;
            }
        }
        Commands::Sync { base_url, .. } => {
            if let Some(base_url) = base_url {
                config.modules.base_url = base_url.clone();
            }
        }
    }
}
