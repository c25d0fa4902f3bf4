//! High-level operations.
//!
//! This module contains the implementation of tybuild commands.

pub mod clean;
pub mod doctor;
pub mod flags;
pub mod tybuild_build;
pub mod tybuild_shaders;

pub use clean::clean;
pub use doctor::{doctor, CheckResult, DoctorReport};
pub use flags::show_flags;
pub use tybuild_build::{build, load_flags, BuildOptions, BuildOutcome};
pub use tybuild_shaders::compile_shaders;
