use glam::{Mat3, Mat4, Vec3};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde_json::Value;

use super::{ObjectId, SceneError, SceneObject};

/// Tree of scene objects keyed by host id.
///
/// Objects are kept in creation order; `snapshot` returns them in that order.
/// Ids removed by `delete` are retired and rejected by later `create` calls.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: IndexMap<ObjectId, SceneObject>,
    retired: FxHashSet<ObjectId>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Create a new object, optionally under an existing parent.
    pub fn create(
        &mut self,
        id: ObjectId,
        kind: impl Into<String>,
        parent_id: Option<ObjectId>,
        args: Vec<Value>,
    ) -> Result<&SceneObject, SceneError> {
        if self.objects.contains_key(&id) || self.retired.contains(&id) {
            return Err(SceneError::DuplicateId(id));
        }

        if let Some(parent) = &parent_id {
            let Some(parent_object) = self.objects.get_mut(parent) else {
                return Err(SceneError::UnknownParent {
                    id,
                    parent: parent.clone(),
                });
            };
            parent_object.child_ids.push(id.clone());
        }

        let object = SceneObject::new(id.clone(), kind)
            .with_parent(parent_id)
            .with_args(args);
        let (index, _) = self.objects.insert_full(id, object);

        Ok(&self.objects[index])
    }

    /// Move an object under a new parent (or to the root with `None`).
    pub fn attach(
        &mut self,
        id: &ObjectId,
        parent_id: Option<ObjectId>,
    ) -> Result<(), SceneError> {
        let old_parent = self.require(id)?.parent_id.clone();

        if let Some(parent) = &parent_id {
            if !self.objects.contains_key(parent) {
                return Err(SceneError::UnknownParent {
                    id: id.clone(),
                    parent: parent.clone(),
                });
            }
            if parent == id || self.ancestors(parent).any(|a| a == id) {
                return Err(SceneError::Cycle {
                    id: id.clone(),
                    parent: parent.clone(),
                });
            }
        }

        if old_parent == parent_id {
            return Ok(());
        }

        if let Some(old) = old_parent
            && let Some(old_object) = self.objects.get_mut(&old)
        {
            old_object.child_ids.retain(|child| child != id);
        }

        if let Some(parent) = &parent_id
            && let Some(parent_object) = self.objects.get_mut(parent)
        {
            parent_object.child_ids.push(id.clone());
        }

        self.require_mut(id)?.parent_id = parent_id;
        Ok(())
    }

    /// Replace the display name, returning the previous one.
    pub fn rename(&mut self, id: &ObjectId, name: impl Into<String>) -> Result<String, SceneError> {
        let object = self.require_mut(id)?;
        Ok(std::mem::replace(&mut object.name, name.into()))
    }

    pub fn move_to(&mut self, id: &ObjectId, position: Vec3) -> Result<(), SceneError> {
        self.require_mut(id)?.transform.set_position(position);
        Ok(())
    }

    pub fn scale(&mut self, id: &ObjectId, scale: Vec3) -> Result<(), SceneError> {
        self.require_mut(id)?.transform.set_scale(scale);
        Ok(())
    }

    pub fn rotate(&mut self, id: &ObjectId, rotation: Mat3) -> Result<(), SceneError> {
        self.require_mut(id)?.transform.set_rotation(rotation);
        Ok(())
    }

    pub fn set_visible(&mut self, id: &ObjectId, visible: bool) -> Result<(), SceneError> {
        self.require_mut(id)?.visible = visible;
        Ok(())
    }

    /// Remove an object together with its whole subtree.
    ///
    /// Returns the removed ids, the deleted object first.
    pub fn delete(&mut self, id: &ObjectId) -> Result<Vec<ObjectId>, SceneError> {
        let parent = self.require(id)?.parent_id.clone();

        if let Some(parent) = parent
            && let Some(parent_object) = self.objects.get_mut(&parent)
        {
            parent_object.child_ids.retain(|child| child != id);
        }

        let subtree = self.subtree(id);
        for removed in &subtree {
            self.objects.shift_remove(removed);
            self.retired.insert(removed.clone());
        }

        Ok(subtree)
    }

    /// Current objects in creation order.
    pub fn snapshot(&self) -> Vec<SceneObject> {
        self.objects.values().cloned().collect()
    }

    /// Composed transform from the root down to `id`.
    pub fn world_matrix(&self, id: &ObjectId) -> Option<Mat4> {
        let object = self.objects.get(id)?;
        let mut matrix = object.transform.local_matrix();
        for ancestor in self.ancestors(id) {
            let parent = self.objects.get(ancestor)?;
            matrix = parent.transform.local_matrix() * matrix;
        }
        Some(matrix)
    }

    /// An object is rendered only if it and all its ancestors are visible.
    pub fn is_effectively_visible(&self, id: &ObjectId) -> bool {
        let Some(object) = self.objects.get(id) else {
            return false;
        };
        object.visible
            && self
                .ancestors(id)
                .all(|a| self.objects.get(a).is_some_and(|o| o.visible))
    }

    /// Iterate parent, grandparent, ... of `id` (not including `id`).
    pub fn ancestors<'a>(&'a self, id: &ObjectId) -> impl Iterator<Item = &'a ObjectId> + use<'a> {
        let mut current = self.objects.get(id).and_then(|o| o.parent_id.as_ref());
        std::iter::from_fn(move || {
            let id = current?;
            current = self.objects.get(id).and_then(|o| o.parent_id.as_ref());
            Some(id)
        })
    }

    fn subtree(&self, root: &ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut stack = vec![root.clone()];
        while let Some(id) = stack.pop() {
            if let Some(object) = self.objects.get(&id) {
                stack.extend(object.child_ids.iter().rev().cloned());
                out.push(id);
            }
        }
        out
    }

    fn require(&self, id: &ObjectId) -> Result<&SceneObject, SceneError> {
        self.objects
            .get(id)
            .ok_or_else(|| SceneError::UnknownId(id.clone()))
    }

    fn require_mut(&mut self, id: &ObjectId) -> Result<&mut SceneObject, SceneError> {
        self.objects
            .get_mut(id)
            .ok_or_else(|| SceneError::UnknownId(id.clone()))
    }
}
