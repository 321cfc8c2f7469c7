//! Embedded Runtime Seam
//!
//! The scripting runtime is opaque to this crate. It is reached only through:
//!
//! - [`VirtualFs`] - its private staging filesystem for module source text
//! - [`EmbeddedRuntime::call`] - invoke a named entry point asynchronously
//!
//! ```text
//! ReloadSynchronizer --mkdir/write_file--> VirtualFs
//!         |                                    |
//!         +--call(reload_entry)--> EmbeddedRuntime <--call(draw)-- RenderBridge
//! ```
//!
//! Both the synchronizer and the render bridge hold the same `Arc<R>` handle;
//! the [`RuntimeGate`] keeps draws out while modules are re-executed.

mod directory;
mod gate;
mod headless;
mod memory;

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

pub use directory::DirectoryFs;
pub use gate::RuntimeGate;
pub use headless::HeadlessRuntime;
pub use memory::MemoryFs;

/// Errors of the virtual filesystem.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("`{0}` already exists")]
    AlreadyExists(String),

    #[error("`{0}` not found")]
    NotFound(String),

    #[error("invalid path `{0}`")]
    InvalidPath(String),

    #[error("IO error at `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors reported by the embedded runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("unknown entry point `{0}`")]
    UnknownEntryPoint(String),

    #[error("entry point `{entry}` failed: {message}")]
    Failed { entry: String, message: String },
}

/// The runtime's private staging filesystem.
///
/// Paths are `/`-separated and relative to the runtime's working directory.
pub trait VirtualFs: Send + Sync {
    /// Create a directory. Fails with [`FsError::AlreadyExists`] if present.
    fn mkdir(&self, path: &str) -> Result<(), FsError>;

    /// Create or overwrite a file. The parent directory must exist.
    fn write_file(&self, path: &str, content: &str) -> Result<(), FsError>;

    fn read_file(&self, path: &str) -> Result<String, FsError>;
}

/// Handle to the embedded scripting runtime.
pub trait EmbeddedRuntime: Send + Sync + 'static {
    type Fs: VirtualFs;

    fn fs(&self) -> &Self::Fs;

    /// Resolve `entry` (a dotted name such as `webgpu.main.reload`) and await it.
    ///
    /// The runtime's own scheduling is opaque; the returned future is one
    /// suspension point for the caller.
    fn call(
        &self,
        entry: &str,
        args: Vec<Value>,
    ) -> impl Future<Output = Result<(), RuntimeError>> + Send;
}

/// Join a staging directory and a manifest path.
pub fn join_path(dir: &str, path: &str) -> String {
    let dir = dir.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if dir.is_empty() {
        path.to_string()
    } else {
        format!("{dir}/{path}")
    }
}

/// Parent directory of a `/`-separated path (`""` for top-level entries).
pub(crate) fn parent_path(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

/// Reject absolute paths and `..` components.
pub(crate) fn is_safe_relative(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && path.split('/').all(|c| !c.is_empty() && c != "." && c != "..")
}
