//! Test utilities for tybuild unit tests.
//!
//! [`RecordingRunner`] stands in for the real toolchain: it records every
//! command it is asked to run and answers with scripted exit codes.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut runner = RecordingRunner::new();
//! runner.fail_when("main.cpp", 1);
//!
//! // Drive a BuildOrchestrator or ShaderCompiler with `&mut runner`...
//! assert_eq!(runner.programs(), ["clang"]);
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use crate::builder::flags::FlagSet;
use crate::builder::toolchain::CommandSpec;
use crate::util::config::Config;
use crate::util::process::{CommandRunner, Invocation};

/// How a scripted command should behave.
#[derive(Debug, Clone)]
enum Script {
    /// Exit with this code when any argument contains the needle
    ExitWhen { needle: String, code: i32 },
    /// Fail to launch this program
    Missing { program: PathBuf },
}

/// Fake [`CommandRunner`] that records invocations.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    scripts: Vec<Script>,
    calls: Vec<CommandSpec>,
}

impl RecordingRunner {
    /// Time reported for every successful or failing invocation.
    pub const STEP_TIME: Duration = Duration::from_millis(5);

    pub fn new() -> Self {
        RecordingRunner::default()
    }

    /// Exit with `code` when the program or any argument contains `needle`.
    pub fn fail_when(&mut self, needle: &str, code: i32) -> &mut Self {
        self.scripts.push(Script::ExitWhen {
            needle: needle.to_string(),
            code,
        });
        self
    }

    /// Report `program` as not found.
    pub fn missing_program(&mut self, program: impl AsRef<Path>) -> &mut Self {
        self.scripts.push(Script::Missing {
            program: program.as_ref().to_path_buf(),
        });
        self
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> &[CommandSpec] {
        &self.calls
    }

    /// Program names of every command run so far.
    pub fn programs(&self) -> Vec<String> {
        self.calls
            .iter()
            .map(|c| c.program.display().to_string())
            .collect()
    }

    /// Index of the first call whose command line contains `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.calls.iter().position(|c| c.display().contains(needle))
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, cmd: &CommandSpec) -> io::Result<Invocation> {
        self.calls.push(cmd.clone());

        for script in &self.scripts {
            match script {
                Script::Missing { program } if &cmd.program == program => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("{} not found", program.display()),
                    ));
                }
                Script::ExitWhen { needle, code } if cmd.display().contains(needle.as_str()) => {
                    return Ok(Invocation {
                        exit_code: Some(*code),
                        elapsed: Self::STEP_TIME,
                    });
                }
                _ => {}
            }
        }

        Ok(Invocation {
            exit_code: Some(0),
            elapsed: Self::STEP_TIME,
        })
    }
}

/// A scratch project: default config rooted in a temp dir, with a flags set.
pub struct TestProject {
    pub dir: TempDir,
    pub config: Config,
    pub flags: FlagSet,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.build_dir = dir.path().join("build");
        config.paths.shader_dir = dir.path().join("shaders");
        config.paths.shader_output = dir.path().join("build");

        let flags = FlagSet::parse("-std=c++20\n-I./include\n")
            .with_compile_config(&config.compile);

        TestProject { dir, config, flags }
    }

    /// Create a file relative to the project root.
    pub fn write(&self, relative: impl AsRef<Path>, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }
}

impl Default for TestProject {
    fn default() -> Self {
        TestProject::new()
    }
}
