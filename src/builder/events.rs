//! Build event types for JSON output.
//!
//! These events are emitted one JSON object per line when using
//! `--message-format json`.
//!
//! # Event Types
//!
//! - `build-started`: The main chain or the shader pass started
//! - `stage-finished`: One stage ran (success or failure)
//! - `shader-compiled`: One shader source was compiled (success or failure)
//! - `cleanup`: Transient object files were removed
//! - `build-finished`: The run completed (success or failure)

use std::path::PathBuf;

use serde::Serialize;

use crate::core::{BuildVariant, StageKind};

/// A build event emitted during the build process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    #[serde(rename = "build-started")]
    BuildStarted {
        /// "build" or "shaders"
        pipeline: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        variant: Option<BuildVariant>,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        full: bool,
    },

    #[serde(rename = "stage-finished")]
    StageFinished {
        stage: StageKind,
        success: bool,
        /// `None` when the tool could not be launched or was killed
        exit_code: Option<i32>,
        duration_ms: u64,
        /// The failing command line
        #[serde(skip_serializing_if = "Option::is_none")]
        command: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        artifact: Option<PathBuf>,
    },

    #[serde(rename = "shader-compiled")]
    ShaderCompiled {
        source: PathBuf,
        output: PathBuf,
        success: bool,
        exit_code: Option<i32>,
        duration_ms: u64,
    },

    #[serde(rename = "cleanup")]
    Cleanup {
        removed: usize,
        failed: usize,
    },

    #[serde(rename = "build-finished")]
    BuildFinished {
        success: bool,
        duration_ms: u64,
        /// Number of failed units (stages or shader files)
        #[serde(skip_serializing_if = "Option::is_none")]
        failures: Option<usize>,
    },
}

impl BuildEvent {
    /// Create a build finished event.
    pub fn finished(success: bool, duration_ms: u64) -> Self {
        BuildEvent::BuildFinished {
            success,
            duration_ms,
            failures: None,
        }
    }
}
