//! Compiler flag composition.
//!
//! Base flags come from the project's flags file (one token per line, the
//! same `compile_flags.txt` clangd reads) and are loaded once per
//! invocation. Everything a stage adds is appended after them, so a stage
//! flag always overrides a base flag in the compiler.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::builder::toolchain::path_arg;
use crate::core::BuildVariant;
use crate::util::config::{CompileConfig, ConfigError};

/// Aggressive optimization used for release code and dependencies.
pub const OPTIMIZED: &str = "-Ofast";
/// No optimization.
pub const UNOPTIMIZED: &str = "-O0";

/// The compile stages that take compiler flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStage {
    Pch,
    Dependencies,
    Main,
}

impl FromStr for CompileStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pch" => Ok(CompileStage::Pch),
            "dependencies" | "deps" => Ok(CompileStage::Dependencies),
            "main" => Ok(CompileStage::Main),
            _ => Err(format!(
                "invalid stage '{}'; expected 'pch', 'dependencies', or 'main'",
                s
            )),
        }
    }
}

impl fmt::Display for CompileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompileStage::Pch => "pch",
            CompileStage::Dependencies => "dependencies",
            CompileStage::Main => "main",
        })
    }
}

/// Flags a variant adds to the main compile.
pub fn variant_flags(variant: BuildVariant) -> &'static [&'static str] {
    match variant {
        BuildVariant::Debug => &["-g", UNOPTIMIZED, "-DTY_DEBUG=1"],
        BuildVariant::Release => &[OPTIMIZED, "-DTY_NDEBUG=1"],
        BuildVariant::Profile => &[OPTIMIZED, "-DTY_NDEBUG=1", "-DTY_PROFILE=1"],
    }
}

fn optimization(optimized: bool) -> &'static str {
    if optimized {
        OPTIMIZED
    } else {
        UNOPTIMIZED
    }
}

/// Immutable base flags plus configured additions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    base: Vec<String>,
    extra: Vec<String>,
    dependency: Vec<String>,
}

impl FlagSet {
    /// Create a flag set from base tokens only.
    pub fn new(base: Vec<String>) -> Self {
        FlagSet {
            base,
            extra: Vec::new(),
            dependency: Vec::new(),
        }
    }

    /// Parse flags-file contents: one token per line, blank lines skipped.
    pub fn parse(contents: &str) -> Self {
        let base = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        FlagSet::new(base)
    }

    /// Read the flags file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Flags {
            path: path.to_path_buf(),
            source,
        })?;
        let flags = Self::parse(&contents);
        tracing::debug!("loaded {} base flags from {}", flags.base.len(), path.display());
        Ok(flags)
    }

    /// Attach the configured compile additions.
    pub fn with_compile_config(mut self, compile: &CompileConfig) -> Self {
        self.extra = compile.extra_flags.clone();
        self.dependency = compile.dependency_flags.clone();
        self
    }

    pub fn base(&self) -> &[String] {
        &self.base
    }

    /// Compose the ordered flags for one compile stage.
    ///
    /// `pch` is the precompiled header the stage depends on; it is only
    /// included for the main compile of a variant that consumes one.
    pub fn compose(
        &self,
        variant: BuildVariant,
        stage: CompileStage,
        pch: Option<&Path>,
    ) -> Vec<String> {
        let profile = variant.profile();
        let mut flags: Vec<String> = self.base.iter().chain(&self.extra).cloned().collect();

        match stage {
            CompileStage::Pch => {
                flags.push(optimization(profile.pch_optimized).to_string());
            }
            CompileStage::Dependencies => {
                flags.push(optimization(profile.dependencies_optimized).to_string());
                flags.extend(self.dependency.iter().cloned());
            }
            CompileStage::Main => {
                flags.extend(variant_flags(variant).iter().map(|f| f.to_string()));
                if let Some(pch) = pch.filter(|_| profile.uses_pch) {
                    flags.push("-include-pch".to_string());
                    flags.push(path_arg(pch));
                }
            }
        }

        flags
    }
}
