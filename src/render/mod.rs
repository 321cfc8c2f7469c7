//! Render Bridge
//!
//! Forwards draw and user-function requests to the embedded runtime.
//!
//! A draw resolves its entry point from the request's `run_function`
//! selector (falling back to the configured default) inside the draw module,
//! and passes the host data together with a `scene` frame: the viewport and
//! every visible object with its world matrix.

mod frame;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::time::timeout;

pub use frame::{Frame, FrameObject, Viewport};

use crate::runtime::{EmbeddedRuntime, RuntimeError, RuntimeGate};
use crate::scene::ObjectRegistry;

/// Key in draw data selecting the draw function.
pub const RUN_FUNCTION_KEY: &str = "run_function";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("`{entry}` did not finish within {after:?}")]
    Timeout { entry: String, after: Duration },

    #[error("invalid draw function name `{0}`")]
    InvalidSelector(String),
}

/// Entry-point names used by the render bridge.
#[derive(Debug, Clone)]
pub struct RenderEntries {
    pub canvas_id: String,
    pub draw_module: String,
    pub default_draw: String,
    pub user_function: String,
    pub call_timeout: Duration,
}

pub struct RenderBridge<R> {
    runtime: Arc<R>,
    gate: RuntimeGate,
    entries: RenderEntries,
}

impl<R: EmbeddedRuntime> RenderBridge<R> {
    pub fn new(runtime: Arc<R>, gate: RuntimeGate, entries: RenderEntries) -> Self {
        Self {
            runtime,
            gate,
            entries,
        }
    }

    pub fn entries(&self) -> &RenderEntries {
        &self.entries
    }

    /// Fully qualified draw entry for `data`.
    pub fn draw_entry(&self, data: &Value) -> Result<String, RenderError> {
        let selector = match data.get(RUN_FUNCTION_KEY) {
            None | Some(Value::Null) => self.entries.default_draw.as_str(),
            Some(Value::String(name)) if is_identifier(name) => name.as_str(),
            Some(other) => return Err(RenderError::InvalidSelector(other.to_string())),
        };
        Ok(format!("{}.{}", self.entries.draw_module, selector))
    }

    /// Invoke the draw entry with `(canvas_id, payload)`.
    ///
    /// The frame is captured before the call suspends, so later registry
    /// mutations don't leak into this draw.
    pub async fn draw(
        &self,
        data: Value,
        registry: &ObjectRegistry,
        viewport: Viewport,
    ) -> Result<(), RenderError> {
        let entry = self.draw_entry(&data)?;
        let frame = Frame::capture(registry, viewport);
        crate::debug!("render"; "{} with {} objects", entry, frame.objects.len());

        let payload = with_scene(data, &frame);
        let args = vec![Value::String(self.entries.canvas_id.clone()), payload];
        self.invoke(&entry, args).await
    }

    /// Invoke the user-registered entry with the host data unchanged.
    pub async fn run_user_function(&self, data: Value) -> Result<(), RenderError> {
        let entry = self.entries.user_function.clone();
        self.invoke(&entry, vec![data]).await
    }

    async fn invoke(&self, entry: &str, args: Vec<Value>) -> Result<(), RenderError> {
        let _shared = self.gate.shared().await;
        match timeout(self.entries.call_timeout, self.runtime.call(entry, args)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(RenderError::Timeout {
                entry: entry.to_string(),
                after: self.entries.call_timeout,
            }),
        }
    }
}

/// Attach the frame under `scene`; non-object data is wrapped as `data`.
fn with_scene(data: Value, frame: &Frame) -> Value {
    let scene = serde_json::to_value(frame).unwrap_or(Value::Null);
    let mut map = match data {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("data".into(), other);
            map
        }
    };
    map.insert("scene".into(), scene);
    Value::Object(map)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests;
