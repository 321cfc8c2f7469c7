use thiserror::Error;

use crate::render::RenderError;
use crate::scene::SceneError;

/// A host call that couldn't be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown method `{0}`")]
    UnknownMethod(String),

    #[error("`{method}` is missing argument `{name}`")]
    MissingArgument {
        method: &'static str,
        name: &'static str,
    },

    #[error("`{method}` argument `{name}`: {reason}")]
    InvalidArgument {
        method: &'static str,
        name: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
