//! Runtime without an interpreter.
//!
//! Backs `scenebridge sync`: modules are staged into a real directory and the
//! reload entry point is acknowledged without executing anything, so the
//! staged tree can be inspected or served to a browser-side runtime.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use super::{EmbeddedRuntime, RuntimeError, VirtualFs};

#[derive(Debug)]
pub struct HeadlessRuntime<F> {
    fs: F,
    calls: AtomicU64,
}

impl<F: VirtualFs> HeadlessRuntime<F> {
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            calls: AtomicU64::new(0),
        }
    }

    /// Number of entry-point calls acknowledged so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<F: VirtualFs + 'static> EmbeddedRuntime for HeadlessRuntime<F> {
    type Fs = F;

    fn fs(&self) -> &F {
        &self.fs
    }

    async fn call(&self, entry: &str, args: Vec<Value>) -> Result<(), RuntimeError> {
        if entry.is_empty() {
            return Err(RuntimeError::UnknownEntryPoint(String::new()));
        }
        self.calls.fetch_add(1, Ordering::Relaxed);
        crate::debug!("runtime"; "{}({} args) acknowledged", entry, args.len());
        Ok(())
    }
}
