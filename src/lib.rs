//! Scene bridge: a scene command protocol and module hot-reload bridge for an
//! embedded WebGPU scripting runtime.
//!
//! # Module Structure
//!
//! ```text
//! scene/     # ObjectRegistry: the scene graph commands mutate
//! command/   # host calls -> Command -> CommandDispatcher
//! render/    # RenderBridge: draw and user-function calls into the runtime
//! reload/    # ReloadSynchronizer: fetch, stage, reinitialize
//! live/      # LiveChannel: push notifications that trigger reloads
//! runtime/   # EmbeddedRuntime and VirtualFs seams, RuntimeGate
//! config/    # scenebridge.toml
//! bridge     # wires the above around one shared runtime
//! cli/       # serve and sync commands
//! ```

pub mod bridge;
pub mod cli;
pub mod command;
pub mod config;
pub mod core;
pub mod live;
pub mod logger;
pub mod reload;
pub mod render;
pub mod runtime;
pub mod scene;

#[cfg(test)]
mod testing;

pub use bridge::Bridge;
