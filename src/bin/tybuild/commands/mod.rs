//! Command implementations

use std::path::PathBuf;

use anyhow::Result;

use tybuild::util::config::{load_config, Config};
use tybuild::util::Shell;

pub mod build;
pub mod clean;
pub mod doctor;
pub mod flags;
pub mod shaders;

/// State shared by every command.
pub struct CommandContext {
    pub shell: Shell,
    /// Explicit `--config` path
    pub config_path: Option<PathBuf>,
}

impl CommandContext {
    /// Load the configuration once for this invocation.
    pub fn config(&self) -> Result<Config> {
        Ok(load_config(self.config_path.as_deref())?)
    }
}
