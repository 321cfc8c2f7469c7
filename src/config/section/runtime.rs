//! `[runtime]` section configuration.
//!
//! Names of the embedded runtime's entry points.
//!
//! # Example
//!
//! ```toml
//! [runtime]
//! canvas_id = "canvas"
//! reload_entry = "webgpu.main.reload"
//! draw_module = "webgpu.pyodide_code"   # `run_function` is resolved in here
//! default_draw = "draw_mesh"
//! user_function = "webgpu.main.user_function"
//! call_timeout_ms = 30000
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::super::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub canvas_id: String,
    pub reload_entry: String,
    pub draw_module: String,
    pub default_draw: String,
    pub user_function: String,
    pub call_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            canvas_id: "canvas".into(),
            reload_entry: "webgpu.main.reload".into(),
            draw_module: "webgpu.pyodide_code".into(),
            default_draw: "draw_mesh".into(),
            user_function: "webgpu.main.user_function".into(),
            call_timeout_ms: 30_000,
        }
    }
}

impl RuntimeConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, value) in [
            ("runtime.canvas_id", &self.canvas_id),
            ("runtime.reload_entry", &self.reload_entry),
            ("runtime.draw_module", &self.draw_module),
            ("runtime.default_draw", &self.default_draw),
            ("runtime.user_function", &self.user_function),
        ] {
            if value.trim().is_empty() {
                diag.error(field, "must not be empty");
            }
        }
        if self.call_timeout_ms == 0 {
            diag.error("runtime.call_timeout_ms", "must be greater than zero");
        }
    }
}
