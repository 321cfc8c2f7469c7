//! Scene registry error types.

use thiserror::Error;

use super::ObjectId;

/// Structural errors of the object registry.
///
/// All of these are local: the registry is left exactly as it was before the
/// failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("object `{0}` already exists or was deleted in this session")]
    DuplicateId(ObjectId),

    #[error("unknown object `{0}`")]
    UnknownId(ObjectId),

    #[error("unknown parent `{parent}` for object `{id}`")]
    UnknownParent { id: ObjectId, parent: ObjectId },

    #[error("attaching `{id}` under `{parent}` would create a cycle")]
    Cycle { id: ObjectId, parent: ObjectId },
}
