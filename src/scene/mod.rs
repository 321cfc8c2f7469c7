//! Scene Object Registry
//!
//! Host-addressable tree of renderable objects:
//!
//! ```text
//! g1 (group)
//! ├── m1 (mesh)
//! └── m2 (mesh)
//!     └── l1 (label)
//! ```
//!
//! # Module Structure
//!
//! - `object` - `ObjectId` and `SceneObject`
//! - `transform` - position / scale / rotation of one object
//! - `registry` - `ObjectRegistry`, the tree and its invariants
//! - `error` - `SceneError`

mod error;
mod object;
mod registry;
mod transform;


pub use error::SceneError;
pub use object::{ObjectId, SceneObject};
pub use registry::ObjectRegistry;
pub use transform::Transform;
