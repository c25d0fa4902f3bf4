//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<bool> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
        return Ok(true);
    }
    Ok(false)
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Lazily list the regular files directly inside `dir`, in file-name order.
///
/// Subdirectories are not descended into and dotfiles are skipped.
pub fn list_files_shallow(dir: &Path) -> impl Iterator<Item = walkdir::Result<PathBuf>> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => {
                let hidden = entry.file_name().to_string_lossy().starts_with('.');
                if entry.file_type().is_file() && !hidden {
                    Some(Ok(entry.into_path()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_shallow() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.frag"), "").unwrap();
        fs::write(tmp.path().join("a.vert"), "").unwrap();
        fs::write(tmp.path().join(".hidden"), "").unwrap();
        fs::create_dir(tmp.path().join("include")).unwrap();
        fs::write(tmp.path().join("include").join("common.glsl"), "").unwrap();

        let files: Vec<_> = list_files_shallow(tmp.path())
            .map(|f| f.unwrap().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files, vec!["a.vert", "b.frag"]);
    }

    #[test]
    fn test_list_files_missing_dir_yields_error() {
        let tmp = TempDir::new().unwrap();
        let mut files = list_files_shallow(&tmp.path().join("nope"));
        assert!(files.next().unwrap().is_err());
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("build").join("debug");
        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_remove_dir_all_if_exists() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("build");
        fs::create_dir_all(dir.join("release")).unwrap();

        assert!(remove_dir_all_if_exists(&dir).unwrap());
        assert!(!dir.exists());
        assert!(!remove_dir_all_if_exists(&dir).unwrap());
    }
}
