//! Scene Command Protocol
//!
//! The host UI talks to a scene component through positional method calls:
//!
//! ```text
//! {"method": "create", "args": ["mesh", "m1", "g1", {...}]}
//! {"method": "move",   "args": ["m1", 1.0, 2.0, 3.0]}
//! {"method": "draw",   "args": [{"run_function": "draw_mesh", ...}]}
//! ```
//!
//! [`Command::from_call`] turns a call into a typed [`Command`];
//! [`CommandDispatcher`] routes it to the registry or the render bridge.

mod decode;
mod dispatcher;
mod error;


use glam::{Mat3, Vec3};
use serde::Deserialize;
use serde_json::Value;

pub use dispatcher::{CommandDispatcher, Lifecycle, Surface};
pub use error::{CommandError, DispatchError};

use crate::scene::ObjectId;

/// Positional host call, as received over the component channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HostCall {
    pub method: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl HostCall {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Create {
        kind: String,
        id: ObjectId,
        parent_id: Option<ObjectId>,
        args: Vec<Value>,
    },
    Name {
        id: ObjectId,
        name: String,
    },
    Move {
        id: ObjectId,
        position: Vec3,
    },
    Scale {
        id: ObjectId,
        scale: Vec3,
    },
    Rotate {
        id: ObjectId,
        rotation: Mat3,
    },
    Visible {
        id: ObjectId,
        visible: bool,
    },
    Delete {
        id: ObjectId,
    },
    /// Re-parent `id`; `None` makes it a root.
    Attach {
        id: ObjectId,
        parent_id: Option<ObjectId>,
    },
    Resize,
    InitObjects {
        data: Value,
    },
    RunUserFunction {
        data: Value,
    },
    Draw {
        data: Value,
    },
}

impl Command {
    /// Wire name of the command.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Name { .. } => "name",
            Self::Move { .. } => "move",
            Self::Scale { .. } => "scale",
            Self::Rotate { .. } => "rotate",
            Self::Visible { .. } => "visible",
            Self::Delete { .. } => "delete",
            Self::Attach { .. } => "attach",
            Self::Resize => "resize",
            Self::InitObjects { .. } => "init_objects",
            Self::RunUserFunction { .. } => "run_user_function",
            Self::Draw { .. } => "draw",
        }
    }

    /// Commands that mutate the object registry.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Create { .. }
                | Self::Name { .. }
                | Self::Move { .. }
                | Self::Scale { .. }
                | Self::Rotate { .. }
                | Self::Visible { .. }
                | Self::Delete { .. }
                | Self::Attach { .. }
        )
    }
}

/// Result of a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Done,
    /// Dropped because the component isn't ready.
    Ignored,
    /// Previous name, from `name`.
    Name(String),
}
