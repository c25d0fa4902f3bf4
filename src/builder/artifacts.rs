//! Output directory ownership.
//!
//! [`ArtifactStore`] is the only component that creates a variant's output
//! directory or deletes files from it.

use std::path::{Path, PathBuf};

use glob::{glob, Pattern};

use crate::builder::error::BuildError;
use crate::core::artifact::{is_object_file, OBJECT_EXTENSIONS};
use crate::util::fs::ensure_dir;

/// Result of removing transient object files.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    /// Files that were deleted
    pub removed: Vec<PathBuf>,
    /// Files that could not be deleted, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The output directory of one build variant.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ArtifactStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a file inside the store.
    pub fn path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Whether a file exists in the store.
    pub fn contains(&self, file_name: impl AsRef<Path>) -> bool {
        self.path(file_name).is_file()
    }

    /// Create the output directory if it is missing.
    pub fn ensure_dir(&self) -> Result<(), BuildError> {
        ensure_dir(&self.dir).map_err(|source| BuildError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    /// Delete transient object files directly inside the output directory.
    ///
    /// Best-effort: a file that cannot be removed is logged and recorded,
    /// and the remaining files are still processed.
    pub fn cleanup(&self) -> CleanupReport {
        let mut report = CleanupReport::default();

        // The directory itself may contain glob metacharacters
        let dir = Pattern::escape(&self.dir.to_string_lossy());

        for ext in OBJECT_EXTENSIONS {
            let pattern = Path::new(&dir).join(format!("*.{}", ext));
            let pattern_str = pattern.to_string_lossy();

            let entries = match glob(&pattern_str) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("invalid cleanup pattern {}: {}", pattern_str, e);
                    continue;
                }
            };

            for entry in entries {
                match entry {
                    Ok(path) if path.is_file() && is_object_file(&path) => {
                        match std::fs::remove_file(&path) {
                            Ok(()) => {
                                tracing::debug!("removed {}", path.display());
                                report.removed.push(path);
                            }
                            Err(e) => {
                                tracing::warn!("failed to remove {}: {}", path.display(), e);
                                report.failed.push((path, e.to_string()));
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("glob error: {}", e);
                        report.failed.push((e.path().to_path_buf(), e.error().to_string()));
                    }
                }
            }
        }

        report.removed.sort();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_creates_nested() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path().join("build").join("debug"));
        store.ensure_dir().unwrap();
        store.ensure_dir().unwrap();
        assert!(store.dir().is_dir());
    }

    #[test]
    fn test_ensure_dir_over_file_fails() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("build");
        fs::write(&blocker, "").unwrap();

        let store = ArtifactStore::new(blocker.join("debug"));
        let err = store.ensure_dir().unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }

    #[test]
    fn test_cleanup_removes_only_objects() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());
        for name in [
            "ty.obj",
            "ty_dependencies_only.obj",
            "extra.o",
            "ty.lib",
            "ty_dependencies_only.lib",
            "stdafx_d.hpp.pch",
            "ty.exe",
        ] {
            fs::write(store.path(name), "x").unwrap();
        }
        fs::create_dir(store.path("nested")).unwrap();
        fs::write(store.path("nested").join("keep.obj"), "x").unwrap();

        let report = store.cleanup();

        assert!(report.is_clean());
        assert_eq!(report.removed.len(), 3);
        assert!(!store.contains("ty.obj"));
        assert!(!store.contains("ty_dependencies_only.obj"));
        assert!(!store.contains("extra.o"));
        assert!(store.contains("ty.lib"));
        assert!(store.contains("ty_dependencies_only.lib"));
        assert!(store.contains("stdafx_d.hpp.pch"));
        assert!(store.contains("ty.exe"));
        assert!(store.path("nested").join("keep.obj").exists());
    }

    #[test]
    fn test_cleanup_missing_dir_is_noop() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path().join("never-built"));
        let report = store.cleanup();
        assert!(report.removed.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_cleanup_dir_with_glob_metacharacters() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path().join("out[1]").join("debug"));
        store.ensure_dir().unwrap();
        fs::write(store.path("ty.obj"), "x").unwrap();
        fs::write(store.path("ty.lib"), "x").unwrap();

        let report = store.cleanup();

        assert_eq!(report.removed.len(), 1);
        assert!(report.removed[0].ends_with("ty.obj"));
        assert!(!store.contains("ty.obj"));
        assert!(store.contains("ty.lib"));
    }

    #[cfg(unix)]
    #[test]
    fn test_cleanup_continues_past_failures() {
        // Entries of a read-only directory cannot be unlinked
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path().join("out"));
        store.ensure_dir().unwrap();
        fs::write(store.path("a.obj"), "x").unwrap();
        fs::write(store.path("b.obj"), "x").unwrap();
        fs::set_permissions(store.dir(), fs::Permissions::from_mode(0o555)).unwrap();

        let report = store.cleanup();

        fs::set_permissions(store.dir(), fs::Permissions::from_mode(0o755)).unwrap();
        // Running as root ignores directory permissions
        if report.removed.is_empty() {
            assert_eq!(report.failed.len(), 2);
        } else {
            assert_eq!(report.removed.len(), 2);
        }
    }
}
