use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use super::{FsError, VirtualFs, parent_path};

/// In-process virtual filesystem.
///
/// Mirrors the semantics of an interpreter's in-memory filesystem: `mkdir`
/// fails on existing directories and files can only be written into existing
/// directories.
#[derive(Debug, Default)]
pub struct MemoryFs {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    dirs: FxHashSet<String>,
    files: FxHashMap<String, String>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// All files, sorted by path.
    pub fn files(&self) -> Vec<(String, String)> {
        let inner = self.inner.lock();
        let mut files: Vec<_> = inner
            .files
            .iter()
            .map(|(path, content)| (path.clone(), content.clone()))
            .collect();
        files.sort();
        files
    }

    pub fn contains(&self, path: &str) -> bool {
        self.inner.lock().files.contains_key(path)
    }
}

impl VirtualFs for MemoryFs {
    fn mkdir(&self, path: &str) -> Result<(), FsError> {
        let mut inner = self.inner.lock();
        let parent = parent_path(path);
        if !parent.is_empty() && !inner.dirs.contains(parent) {
            return Err(FsError::NotFound(parent.to_string()));
        }
        if !inner.dirs.insert(path.to_string()) {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        Ok(())
    }

    fn write_file(&self, path: &str, content: &str) -> Result<(), FsError> {
        let mut inner = self.inner.lock();
        let parent = parent_path(path);
        if !parent.is_empty() && !inner.dirs.contains(parent) {
            return Err(FsError::NotFound(parent.to_string()));
        }
        inner.files.insert(path.to_string(), content.to_string());
        Ok(())
    }

    fn read_file(&self, path: &str) -> Result<String, FsError> {
        self.inner
            .lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| FsError::NotFound(path.to_string()))
    }
}
