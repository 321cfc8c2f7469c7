//! `[serve]` section configuration.
//!
//! Development server: serves the module directory with caching disabled and
//! pushes `update` to live channels whenever a watched file changes.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"   # Network interface (127.0.0.1 = localhost only)
//! port = 8000               # HTTP port number
//! ws_port = 6789            # Notification WebSocket port
//! root = "."                # Directory served over HTTP
//! watch = "webgpu"          # Directory watched for changes
//! debounce_ms = 100
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::super::ConfigDiagnostics;

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Notification WebSocket port.
    pub ws_port: u16,

    /// Directory served over HTTP, relative to the config file.
    pub root: PathBuf,

    /// Directory watched for changes, relative to the config file.
    pub watch: PathBuf,

    /// Quiet period before a burst of changes is reported.
    pub debounce_ms: u64,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8000,
            ws_port: 6789,
            root: PathBuf::from("."),
            watch: PathBuf::from("webgpu"),
            debounce_ms: 100,
        }
    }
}

impl ServeConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port != 0 && self.port == self.ws_port {
            diag.error("serve.ws_port", "must differ from serve.port");
        }
    }
}
