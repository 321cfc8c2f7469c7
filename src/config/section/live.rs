//! `[live]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [live]
//! enabled = true
//! url = "ws://localhost:6789"
//! ```

use serde::{Deserialize, Serialize};

use super::super::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Connect to the push channel after the startup reload.
    pub enabled: bool,
    pub url: String,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "ws://localhost:6789".into(),
        }
    }
}

impl LiveConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.enabled {
            return;
        }
        match url::Url::parse(&self.url) {
            Ok(url) if matches!(url.scheme(), "ws" | "wss") => {}
            Ok(url) => diag.error_with_hint(
                "live.url",
                format!("unsupported scheme `{}`", url.scheme()),
                "use a ws:// or wss:// url",
            ),
            Err(e) => diag.error("live.url", format!("`{}` is not a valid url: {e}", self.url)),
        }
    }
}
