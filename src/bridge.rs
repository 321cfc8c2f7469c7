//! Bridge
//!
//! Owns the runtime handle and hands it to everything that talks to the
//! runtime: the reload synchronizer, the live channel and one command
//! dispatcher per mounted scene component.
//!
//! ```text
//!            +--> ReloadSynchronizer <-- LiveChannel
//! Arc<R> ----+
//!            +--> RenderBridge <-- CommandDispatcher (per component)
//! ```

use std::sync::Arc;

use crate::command::{CommandDispatcher, Surface};
use crate::config::BridgeConfig;
use crate::live::{LiveChannel, LiveHandle};
use crate::reload::{ModuleSource, ReloadError, ReloadOutcome, ReloadSynchronizer};
use crate::render::RenderBridge;
use crate::runtime::{EmbeddedRuntime, RuntimeGate};

pub struct Bridge<R, S> {
    config: Arc<BridgeConfig>,
    runtime: Arc<R>,
    sync: Arc<ReloadSynchronizer<R, S>>,
    render: Arc<RenderBridge<R>>,
    live: Option<LiveHandle>,
}

impl<R: EmbeddedRuntime, S: ModuleSource> Bridge<R, S> {
    pub fn new(config: BridgeConfig, runtime: Arc<R>, source: S) -> Self {
        let gate = RuntimeGate::new();
        let sync = Arc::new(ReloadSynchronizer::new(
            Arc::clone(&runtime),
            source,
            gate.clone(),
            config.module_store(),
            config.reload_settings(),
        ));
        let render = Arc::new(RenderBridge::new(
            Arc::clone(&runtime),
            gate,
            config.render_entries(),
        ));

        Self {
            config: Arc::new(config),
            runtime,
            sync,
            render,
            live: None,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn runtime(&self) -> &Arc<R> {
        &self.runtime
    }

    pub fn synchronizer(&self) -> &Arc<ReloadSynchronizer<R, S>> {
        &self.sync
    }

    pub fn is_live(&self) -> bool {
        self.live.as_ref().is_some_and(LiveHandle::is_running)
    }

    /// Run the startup reload, then open the live channel if enabled.
    ///
    /// A failed startup reload is returned but leaves the bridge usable; a
    /// failed live connect is logged and the bridge stays startup-only.
    pub async fn start(&mut self) -> Result<ReloadOutcome, ReloadError> {
        let outcome = self.sync.reload().await;

        if self.config.live.enabled && self.live.is_none() {
            let url = self.config.live.url.clone();
            let connected = tokio::task::spawn_blocking(move || LiveChannel::connect(&url)).await;
            match connected {
                Ok(Ok(channel)) => self.live = Some(channel.spawn(Arc::clone(&self.sync))),
                Ok(Err(e)) => crate::log!(
                    "live";
                    "{}, continuing without live reload",
                    crate::reload::synchronizer::error_chain(&e)
                ),
                Err(e) => crate::log!("error"; "live connect task failed: {}", e),
            }
        }

        outcome
    }

    /// Dispatcher for a newly mounted scene component.
    pub fn component(&self, surface: impl Surface + 'static) -> CommandDispatcher<R> {
        let mut dispatcher = CommandDispatcher::new(Arc::clone(&self.render), surface);
        dispatcher.mount();
        dispatcher
    }

    /// Stop the live channel without blocking the async worker.
    pub async fn shutdown(&mut self) {
        if let Some(live) = self.live.take() {
            live.close().await;
            crate::debug!("live"; "stopped");
        }
    }
}
