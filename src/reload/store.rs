//! Module Store
//!
//! The fixed manifest of module files plus the text last staged for each.

use indexmap::IndexMap;

use crate::runtime::join_path;

/// Module files of the `webgpu` package, in staging order.
pub const DEFAULT_MANIFEST: &[&str] = &[
    "__init__.py",
    "colormap.py",
    "compute.wgsl",
    "eval.wgsl",
    "gpu.py",
    "input_handler.py",
    "main.py",
    "mesh.py",
    "shader.wgsl",
    "uniforms.py",
    "utils.py",
    "pyodide_code.py",
];

/// One module file as last staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct ModuleStore {
    staging_dir: String,
    manifest: Vec<String>,
    files: IndexMap<String, ModuleFile>,
}

impl ModuleStore {
    pub fn new(staging_dir: impl Into<String>, manifest: Vec<String>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            manifest,
            files: IndexMap::new(),
        }
    }

    pub fn staging_dir(&self) -> &str {
        &self.staging_dir
    }

    pub fn manifest(&self) -> &[String] {
        &self.manifest
    }

    /// Location of `path` inside the virtual filesystem.
    pub fn staged_path(&self, path: &str) -> String {
        join_path(&self.staging_dir, path)
    }

    /// Replace the cached text of `path`. Returns whether the content changed.
    pub fn record(&mut self, path: &str, content: String) -> bool {
        match self.files.get_mut(path) {
            Some(file) if file.content == content => false,
            Some(file) => {
                file.content = content;
                true
            }
            None => {
                self.files.insert(
                    path.to_string(),
                    ModuleFile {
                        path: path.to_string(),
                        content,
                    },
                );
                true
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&ModuleFile> {
        self.files.get(path)
    }

    /// Files staged so far, in first-staged order.
    pub fn files(&self) -> impl Iterator<Item = &ModuleFile> {
        self.files.values()
    }
}
