use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{FsError, VirtualFs, is_safe_relative};

/// Virtual filesystem rooted at a real directory.
///
/// Used by `scenebridge sync` to mirror the staged module set on disk.
#[derive(Debug, Clone)]
pub struct DirectoryFs {
    root: PathBuf,
}

impl DirectoryFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, FsError> {
        if !is_safe_relative(path) {
            return Err(FsError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(path))
    }
}

fn io_error(path: &str, source: std::io::Error) -> FsError {
    match source.kind() {
        ErrorKind::AlreadyExists => FsError::AlreadyExists(path.to_string()),
        ErrorKind::NotFound => FsError::NotFound(path.to_string()),
        _ => FsError::Io {
            path: path.to_string(),
            source,
        },
    }
}

impl VirtualFs for DirectoryFs {
    fn mkdir(&self, path: &str) -> Result<(), FsError> {
        let target = self.resolve(path)?;
        fs::create_dir(&target).map_err(|e| io_error(path, e))
    }

    fn write_file(&self, path: &str, content: &str) -> Result<(), FsError> {
        let target = self.resolve(path)?;
        fs::write(&target, content).map_err(|e| io_error(path, e))
    }

    fn read_file(&self, path: &str) -> Result<String, FsError> {
        let target = self.resolve(path)?;
        fs::read_to_string(&target).map_err(|e| io_error(path, e))
    }
}
