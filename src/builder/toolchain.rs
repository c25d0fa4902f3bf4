//! Command templates for the external tools.
//!
//! This module turns composed flags and artifact paths into concrete
//! compiler, librarian and shader-compiler command lines. It never runs
//! anything itself.

use std::path::{Path, PathBuf};

use crate::util::config::{ArchiverFlavor, Config};

/// A command to execute: program plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The program to run (e.g., "clang", "lib")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
    /// Whether the tool's stdout is thrown away
    pub discard_stdout: bool,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            discard_stdout: false,
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Discard the tool's stdout.
    pub fn quiet(mut self) -> Self {
        self.discard_stdout = true;
        self
    }

    /// The command line as a single string, for logs and errors.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    /// Check whether any argument equals `arg`.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

/// The configured set of external tools.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub compiler: PathBuf,
    pub librarian: PathBuf,
    pub archiver: ArchiverFlavor,
    pub shader_compiler: PathBuf,
}

impl Toolchain {
    pub fn from_config(config: &Config) -> Self {
        Toolchain {
            compiler: config.toolchain.compiler.clone(),
            librarian: config.toolchain.librarian.clone(),
            archiver: config.toolchain.archiver,
            shader_compiler: config.toolchain.shader_compiler.clone(),
        }
    }

    /// Compile a header into a precompiled header.
    ///
    /// `clang <flags> -c <header> -emit-pch --output=<pch>`
    pub fn emit_pch(&self, flags: &[String], header: &Path, output: &Path) -> CommandSpec {
        CommandSpec::new(&self.compiler)
            .args(flags.iter().cloned())
            .arg("-c")
            .arg(path_arg(header))
            .arg("-emit-pch")
            .arg(format!("--output={}", path_arg(output)))
            .quiet()
    }

    /// Compile one translation unit into an object file.
    ///
    /// `clang <flags> -c <source> --output=<object>`
    pub fn compile(&self, flags: &[String], source: &Path, output: &Path) -> CommandSpec {
        CommandSpec::new(&self.compiler)
            .args(flags.iter().cloned())
            .arg("-c")
            .arg(path_arg(source))
            .arg(format!("--output={}", path_arg(output)))
    }

    /// Combine inputs into a static library.
    ///
    /// Trailing `flags` are only passed to MSVC `lib`; `ar` has no
    /// equivalent for them.
    pub fn archive(&self, output: &Path, inputs: &[String], flags: &[String]) -> CommandSpec {
        match self.archiver {
            ArchiverFlavor::Msvc => CommandSpec::new(&self.librarian)
                .arg(format!("/OUT:{}", path_arg(output)))
                .args(inputs.iter().cloned())
                .args(flags.iter().cloned()),
            ArchiverFlavor::Ar => CommandSpec::new(&self.librarian)
                .arg("rcs")
                .arg(path_arg(output))
                .args(inputs.iter().cloned()),
        }
    }

    /// Compile one GLSL source to SPIR-V.
    ///
    /// `glslc <source> <flags> -o <output>`
    pub fn compile_shader(&self, source: &Path, flags: &[&str], output: &Path) -> CommandSpec {
        CommandSpec::new(&self.shader_compiler)
            .arg(path_arg(source))
            .args(flags.iter().copied())
            .arg("-o")
            .arg(path_arg(output))
    }
}

/// Render a path as a tool argument with forward slashes.
///
/// clang and `lib` both accept `/` on Windows, and flag-file paths are
/// written that way.
pub fn path_arg(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
