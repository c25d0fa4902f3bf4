//! Build artifacts and stage kinds.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Extensions of transient object files, removed after a successful link.
pub const OBJECT_EXTENSIONS: &[&str] = &["obj", "o"];

/// The kind of file a stage produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    PrecompiledHeader,
    Object,
    Archive,
    Library,
    ShaderBinary,
}

/// A file produced by exactly one stage invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, path: impl Into<PathBuf>) -> Self {
        Artifact {
            kind,
            path: path.into(),
        }
    }
}

/// Check whether a path names a transient object file.
pub fn is_object_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| OBJECT_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// The fixed stages of the main build chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageKind {
    Pch,
    Dependencies,
    MainCompile,
    Link,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Pch => "pch",
            StageKind::Dependencies => "dependencies",
            StageKind::MainCompile => "main-compile",
            StageKind::Link => "link",
        }
    }

    /// Human description used in status lines.
    pub fn description(&self) -> &'static str {
        match self {
            StageKind::Pch => "precompiled header",
            StageKind::Dependencies => "engine dependencies",
            StageKind::MainCompile => "engine",
            StageKind::Link => "engine library",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
