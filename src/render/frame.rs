use serde::Serialize;
use serde_json::Value;

use crate::scene::{ObjectId, ObjectRegistry};

/// Drawable area of the host surface, in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Scene state handed to a draw call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub viewport: Viewport,
    pub objects: Vec<FrameObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameObject {
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    /// Column-major 4x4 world matrix.
    pub world: [f32; 16],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

impl Frame {
    /// Every effectively visible object, in creation order.
    pub fn capture(registry: &ObjectRegistry, viewport: Viewport) -> Self {
        let objects = registry
            .snapshot()
            .into_iter()
            .filter(|object| registry.is_effectively_visible(&object.id))
            .filter_map(|object| {
                let world = registry.world_matrix(&object.id)?.to_cols_array();
                Some(FrameObject {
                    id: object.id,
                    kind: object.kind,
                    name: object.name,
                    world,
                    args: object.args,
                })
            })
            .collect();
        Self { viewport, objects }
    }
}
