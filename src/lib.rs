//! tybuild - build pipeline orchestrator for the Typheus engine
//!
//! This crate sequences precompiled-header generation, dependency-archive
//! compilation, main compilation and linking for a build variant, and
//! compiles GLSL shaders to SPIR-V. The compiler, librarian and shader
//! compiler are external tools reached through [`util::CommandRunner`].

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for tybuild unit tests.
///
/// Only available when compiling tests. Provides a recording fake for the
/// external toolchain and a scratch project layout.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildError, BuildOrchestrator, FlagSet, ShaderCompiler};
pub use core::{BuildRequest, BuildVariant};
pub use util::{Config, Shell};
