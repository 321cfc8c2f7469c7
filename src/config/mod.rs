//! Bridge configuration management for `scenebridge.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── modules    # [modules]
//! │   ├── runtime    # [runtime]
//! │   ├── live       # [live]
//! │   └── serve      # [serve]
//! ├── error          # ConfigError, ConfigDiagnostics
//! └── mod.rs         # BridgeConfig (this file)
//! ```
//!
//! Every section is optional; a missing file means all defaults.

mod error;
pub mod section;
mod util;

pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};
pub use section::{LiveConfig, ModulesConfig, RuntimeConfig, ServeConfig};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::log;
use crate::reload::{ModuleStore, ReloadSettings};
use crate::render::RenderEntries;
use util::find_config_file;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing scenebridge.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub modules: ModulesConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub live: LiveConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl BridgeConfig {
    /// Locate and load the configuration.
    ///
    /// Searches upward from the current directory for `config_name`. Without
    /// a file, the defaults apply and the current directory is the root.
    pub fn load(config_name: &Path) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cwd, config_name) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = path;
                config
            }
            None => {
                crate::debug!("config"; "{} not found, using defaults", config_name.display());
                Self {
                    config_path: cwd.join(config_name),
                    ..Self::default()
                }
            }
        };

        config.finalize(&cwd);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Resolve the root and make serve paths absolute.
    fn finalize(&mut self, cwd: &Path) {
        self.root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.to_path_buf());
        self.serve.root = self.root.join(&self.serve.root);
        self.serve.watch = self.root.join(&self.serve.watch);
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Validate all sections, collecting every error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.modules.validate(&mut diag);
        self.runtime.validate(&mut diag);
        self.live.validate(&mut diag);
        self.serve.validate(&mut diag);

        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    // ========================================================================
    // component settings
    // ========================================================================

    pub fn module_store(&self) -> ModuleStore {
        ModuleStore::new(self.modules.staging_dir.clone(), self.modules.files.clone())
    }

    pub fn reload_settings(&self) -> ReloadSettings {
        ReloadSettings {
            reload_entry: self.runtime.reload_entry.clone(),
            fetch_timeout: self.modules.fetch_timeout(),
            call_timeout: self.runtime.call_timeout(),
        }
    }

    pub fn render_entries(&self) -> RenderEntries {
        RenderEntries {
            canvas_id: self.runtime.canvas_id.clone(),
            draw_module: self.runtime.draw_module.clone(),
            default_draw: self.runtime.default_draw.clone(),
            user_function: self.runtime.user_function.clone(),
            call_timeout: self.runtime.call_timeout(),
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> BridgeConfig {
    let (parsed, ignored) = BridgeConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unknown_fields_are_collected() {
        let (config, ignored) =
            BridgeConfig::parse_with_ignored("[serve]\nprot = 1\n[extra]\nx = 1").unwrap();
        assert_eq!(config.serve.port, 8000);
        assert_eq!(ignored, vec!["serve.prot", "extra"]);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            BridgeConfig::from_str("[serve\nport = 1"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_from_path_and_finalize() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scenebridge.toml");
        fs::write(&path, "[serve]\nwatch = \"pkg\"\n").unwrap();

        let mut config = BridgeConfig::from_path(&path).unwrap();
        config.config_path = path;
        config.finalize(Path::new("/elsewhere"));

        assert_eq!(config.get_root(), temp.path());
        assert_eq!(config.serve.watch, temp.path().join("pkg"));
        assert_eq!(config.serve.root, temp.path().join("."));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            BridgeConfig::from_path(&temp.path().join("nope.toml")),
            Err(ConfigError::Io(..))
        ));
    }

    #[test]
    fn test_component_settings() {
        let config = test_parse_config(
            "[modules]\nstaging_dir = \"pkg\"\nfiles = [\"a.py\"]\n[runtime]\ncall_timeout_ms = 500",
        );

        let store = config.module_store();
        assert_eq!(store.staging_dir(), "pkg");
        assert_eq!(store.manifest(), ["a.py".to_string()]);

        let settings = config.reload_settings();
        assert_eq!(settings.call_timeout.as_millis(), 500);
        assert_eq!(config.render_entries().call_timeout.as_millis(), 500);
    }
}
