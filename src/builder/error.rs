//! Build error types.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::core::StageKind;
use crate::util::config::ConfigError;
use crate::util::shell::format_duration;

/// Error raised while running the build chain.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(
        "{stage} stage failed: `{command}` exited with {} after {}",
        describe_exit(.exit_code),
        describe_elapsed(.elapsed)
    )]
    ToolFailure {
        stage: StageKind,
        command: String,
        exit_code: Option<i32>,
        elapsed: Duration,
    },

    #[error("{stage} stage failed: could not run `{}`", program.display())]
    Launch {
        stage: StageKind,
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no build variant selected; pass -d, -r or -p")]
    NoVariant,
}

impl BuildError {
    /// The stage this error is tagged with, if any.
    pub fn stage(&self) -> Option<StageKind> {
        match self {
            BuildError::ToolFailure { stage, .. } | BuildError::Launch { stage, .. } => {
                Some(*stage)
            }
            _ => None,
        }
    }

    /// Process exit status to report for this error.
    ///
    /// A failing tool's own exit code is passed through; usage errors
    /// exit with 2 like clap does.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::ToolFailure { exit_code, .. } => failure_exit_code(*exit_code),
            BuildError::NoVariant => 2,
            _ => 1,
        }
    }
}

/// Map a tool exit code onto a nonzero process exit status.
pub fn failure_exit_code(code: Option<i32>) -> i32 {
    match code {
        Some(code) if (1..=255).contains(&code) => code,
        _ => 1,
    }
}

fn describe_elapsed(elapsed: &Duration) -> String {
    format_duration(*elapsed)
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}
