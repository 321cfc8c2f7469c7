use std::time::Duration;

use thiserror::Error;

use super::source::FetchError;
use crate::runtime::{FsError, RuntimeError};

/// Failure of one reload pass.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("failed to fetch `{path}`")]
    Fetch {
        path: String,
        #[source]
        cause: FetchError,
    },

    #[error("failed to stage `{path}`")]
    Stage {
        path: String,
        #[source]
        cause: FsError,
    },

    #[error("module reload failed")]
    Runtime(#[source] RuntimeError),

    #[error("timed out after {after:?} while {stage}")]
    Timeout {
        stage: String,
        /// Manifest path being fetched; `None` for the reload entry call.
        path: Option<String>,
        after: Duration,
    },
}

impl ReloadError {
    /// Manifest path the pass failed on, if the failure is file-specific.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Fetch { path, .. } | Self::Stage { path, .. } => Some(path),
            Self::Timeout { path, .. } => path.as_deref(),
            Self::Runtime(_) => None,
        }
    }
}
