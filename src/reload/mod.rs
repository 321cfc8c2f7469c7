//! Module Hot Reload
//!
//! Keeps the embedded runtime's modules in sync with an external source.
//!
//! # Architecture
//!
//! ```text
//! ModuleSource --fetch--> ReloadSynchronizer --write--> VirtualFs
//!                               |
//!                               +--call(reload_entry)--> EmbeddedRuntime
//! ```
//!
//! # Modules
//!
//! - `store` - manifest and last staged text per module file
//! - `source` - module fetching (`HttpSource` for the dev server)
//! - `synchronizer` - reload passes and their queueing
//! - `error` - `ReloadError`

mod error;
pub mod source;
pub mod store;
pub mod synchronizer;


pub use error::ReloadError;
pub use source::{FetchError, HttpSource, ModuleSource};
pub use store::{DEFAULT_MANIFEST, ModuleFile, ModuleStore};
pub use synchronizer::{ReloadOutcome, ReloadReport, ReloadSettings, ReloadSynchronizer};
