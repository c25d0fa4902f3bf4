//! Shared utilities

pub mod config;
pub mod fs;
pub mod process;
pub mod shell;

pub use config::{Config, ConfigError};
pub use process::{CommandRunner, Invocation, ProcessBuilder, SystemRunner};
pub use shell::{Shell, Status};
