//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`.
/// Absolute paths are returned as-is when they exist.
///
/// # Example
/// ```text
/// /home/user/app/webgpu/        ← start
/// /home/user/app/scenebridge.toml ← found!
/// ```
pub fn find_config_file(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_file_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("webgpu/shaders");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("scenebridge.toml"), "").unwrap();

        let found = find_config_file(&nested, Path::new("scenebridge.toml")).unwrap();
        assert_eq!(found, temp.path().join("scenebridge.toml"));
    }

    #[test]
    fn test_find_config_file_missing() {
        let temp = TempDir::new().unwrap();
        assert_eq!(
            find_config_file(temp.path(), Path::new("definitely-not-here-4e1b.toml")),
            None
        );
    }
}
