//! Subprocess execution.
//!
//! Every external tool (compiler, librarian, shader compiler) is reached
//! through the [`CommandRunner`] trait so the build chain can be driven by a
//! fake in tests.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::builder::toolchain::CommandSpec;

/// Outcome of one finished tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Wall time from spawn to exit.
    pub elapsed: Duration,
}

impl Invocation {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes commands synchronously.
///
/// An `Err` means the program could not be launched at all; a tool that ran
/// and failed is an `Ok` with a nonzero exit code.
pub trait CommandRunner {
    fn run(&mut self, cmd: &CommandSpec) -> io::Result<Invocation>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, cmd: &CommandSpec) -> io::Result<Invocation> {
        ProcessBuilder::from_spec(cmd).invoke()
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    discard_stdout: bool,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            discard_stdout: false,
        }
    }

    /// Create a process builder from a command spec.
    pub fn from_spec(spec: &CommandSpec) -> Self {
        ProcessBuilder::new(&spec.program)
            .args(&spec.args)
            .discard_stdout(spec.discard_stdout)
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Send the child's stdout to the null device.
    pub fn discard_stdout(mut self, discard: bool) -> Self {
        self.discard_stdout = discard;
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if self.discard_stdout {
            cmd.stdout(Stdio::null());
        }

        cmd
    }

    /// Run the command to completion, timing it.
    ///
    /// stderr is inherited so compiler diagnostics reach the user.
    pub fn invoke(&self) -> io::Result<Invocation> {
        tracing::debug!("running `{}`", self.display_command());

        let start = Instant::now();
        let status = self.build_command().status()?;
        let elapsed = start.elapsed();

        Ok(Invocation {
            exit_code: status.code(),
            elapsed,
        })
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: impl AsRef<OsStr>) -> Option<PathBuf> {
    which::which(name).ok()
}
