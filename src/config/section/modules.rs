//! `[modules]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [modules]
//! base_url = "http://localhost:8000/webgpu/"   # Where module files are fetched from
//! staging_dir = "webgpu"                       # Directory inside the runtime's filesystem
//! files = ["__init__.py", "main.py"]           # Manifest, staged in this order
//! fetch_timeout_ms = 10000
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::super::ConfigDiagnostics;
use crate::reload::DEFAULT_MANIFEST;
use crate::runtime::is_safe_relative;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    pub base_url: String,
    pub staging_dir: String,
    pub files: Vec<String>,
    pub fetch_timeout_ms: u64,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/webgpu/".into(),
            staging_dir: "webgpu".into(),
            files: DEFAULT_MANIFEST.iter().map(|f| f.to_string()).collect(),
            fetch_timeout_ms: 10_000,
        }
    }
}

impl ModulesConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if url::Url::parse(&self.base_url).is_err() {
            diag.error("modules.base_url", format!("`{}` is not a valid url", self.base_url));
        }
        if !is_safe_relative(&self.staging_dir) {
            diag.error(
                "modules.staging_dir",
                "must be a relative path without `..`",
            );
        }
        if self.files.is_empty() {
            diag.error_with_hint(
                "modules.files",
                "manifest is empty",
                "list at least one module file, or remove the key to use the default set",
            );
        }

        let mut seen = rustc_hash::FxHashSet::default();
        for file in &self.files {
            if !is_safe_relative(file) {
                diag.error(
                    "modules.files",
                    format!("`{file}` must be a relative path without `..`"),
                );
            } else if !seen.insert(file.as_str()) {
                diag.error("modules.files", format!("`{file}` is listed twice"));
            }
        }

        if self.fetch_timeout_ms == 0 {
            diag.error("modules.fetch_timeout_ms", "must be greater than zero");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{BridgeConfig, test_parse_config};

    #[test]
    fn test_modules_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.modules.staging_dir, "webgpu");
        assert_eq!(config.modules.files.len(), 12);
        assert_eq!(config.modules.files[0], "__init__.py");
        assert_eq!(config.modules.files[11], "pyodide_code.py");
        assert_eq!(config.modules.fetch_timeout().as_secs(), 10);
    }

    #[test]
    fn test_modules_config_override() {
        let config = test_parse_config(
            "[modules]\nbase_url = \"http://127.0.0.1:9000/pkg\"\nfiles = [\"a.py\", \"shaders/b.wgsl\"]",
        );

        assert_eq!(config.modules.base_url, "http://127.0.0.1:9000/pkg");
        assert_eq!(config.modules.files, vec!["a.py", "shaders/b.wgsl"]);
        // Nested paths are staged with their parent directories created.
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_modules_config_rejects_bad_manifest() {
        let config = test_parse_config("[modules]\nfiles = []");
        assert!(config.validate().is_err());

        let config = test_parse_config("[modules]\nfiles = [\"a.py\", \"a.py\"]");
        assert!(config.validate().is_err());

        let config = test_parse_config("[modules]\nfiles = [\"../escape.py\"]");
        assert!(config.validate().is_err());

        let config = test_parse_config("[modules]\nfiles = [\"/abs.py\"]");
        assert!(config.validate().is_err());

        let config = test_parse_config("[modules]\nfetch_timeout_ms = 0");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(BridgeConfig::default().validate().is_ok());
    }
}
