use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::transform::Transform;

/// Host-chosen identifier of a scene object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A node of the render tree.
///
/// `kind` is interpreted by the embedded runtime only; the registry never
/// looks at it. `args` holds the extra positional arguments of the `create`
/// call verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    pub kind: String,
    pub parent_id: Option<ObjectId>,
    pub name: String,
    pub visible: bool,
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    #[serde(skip)]
    pub(crate) child_ids: Vec<ObjectId>,
}

impl SceneObject {
    pub fn new(id: ObjectId, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            parent_id: None,
            name: String::new(),
            visible: true,
            transform: Transform::IDENTITY,
            args: Vec::new(),
            child_ids: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: Option<ObjectId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Direct children, in attach order.
    pub fn children(&self) -> &[ObjectId] {
        &self.child_ids
    }
}
