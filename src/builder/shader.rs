//! GLSL to SPIR-V compilation.
//!
//! Independent of the main chain. Each shader file is compiled on its own;
//! a failing file is recorded and the remaining files are still attempted,
//! so one broken shader doesn't hide errors in the others.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::builder::error::{failure_exit_code, BuildError};
use crate::builder::events::BuildEvent;
use crate::builder::toolchain::Toolchain;
use crate::core::{Artifact, ArtifactKind};
use crate::util::fs::{ensure_dir, list_files_shallow};
use crate::util::process::CommandRunner;
use crate::util::shell::{format_duration, Shell, Status};

/// Shader compiler flags for a debug or release build.
pub fn shader_flags(debug: bool) -> &'static [&'static str] {
    if debug {
        &["-g", "-O0"]
    } else {
        &["-O"]
    }
}

/// Output file name for a shader source: `tri.vert` becomes `tri_vert.spv`.
pub fn spirv_file_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match source.extension() {
        Some(ext) => format!("{}_{}.spv", stem, ext.to_string_lossy()),
        None => format!("{}.spv", stem),
    }
}

/// A shader that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderFailure {
    pub source: PathBuf,
    /// `None` when the compiler could not be launched or was killed
    pub exit_code: Option<i32>,
    pub message: String,
}

/// Outcome of a shader pass.
#[derive(Debug, Clone, Default)]
pub struct ShaderReport {
    pub attempted: usize,
    pub compiled: Vec<Artifact>,
    pub failures: Vec<ShaderFailure>,
    pub elapsed: Duration,
}

impl ShaderReport {
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }

    /// The process exit status this pass should produce, if it failed.
    ///
    /// The highest failing exit code wins.
    pub fn exit_code(&self) -> Option<i32> {
        self.failures
            .iter()
            .map(|f| failure_exit_code(f.exit_code))
            .max()
    }
}

/// Compiles every shader in a directory.
pub struct ShaderCompiler<'a> {
    toolchain: &'a Toolchain,
    runner: &'a mut dyn CommandRunner,
    shell: &'a Shell,
}

impl<'a> ShaderCompiler<'a> {
    pub fn new(toolchain: &'a Toolchain, runner: &'a mut dyn CommandRunner, shell: &'a Shell) -> Self {
        ShaderCompiler {
            toolchain,
            runner,
            shell,
        }
    }

    /// Compile every file directly inside `shader_dir` into `output_dir`.
    ///
    /// Only a missing/unreadable shader directory or an uncreatable output
    /// directory is an error; per-file failures land in the report.
    pub fn compile_all(
        &mut self,
        shader_dir: &Path,
        output_dir: &Path,
        debug: bool,
    ) -> Result<ShaderReport, BuildError> {
        let start = Instant::now();
        ensure_dir(output_dir).map_err(|source| BuildError::Io {
            path: output_dir.to_path_buf(),
            source,
        })?;

        self.shell.json_event(&BuildEvent::BuildStarted {
            pipeline: "shaders".to_string(),
            variant: None,
            full: false,
        });
        self.shell.status(
            Status::Building,
            format!(
                "shaders from {} ({})",
                shader_dir.display(),
                if debug { "debug" } else { "release" }
            ),
        );

        let flags = shader_flags(debug);
        let spinner = self.shell.spinner("Compiling shaders");
        let mut report = ShaderReport::default();

        for entry in list_files_shallow(shader_dir) {
            let source = entry.map_err(|e| BuildError::Io {
                path: e.path().unwrap_or(shader_dir).to_path_buf(),
                source: e.into(),
            })?;
            let output = output_dir.join(spirv_file_name(&source));
            let cmd = self.toolchain.compile_shader(&source, flags, &output);
            let file_name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            spinner.suspend(|| self.shell.status(Status::Compiling, &file_name));
            self.shell.verbose(Status::Info, cmd.display());
            report.attempted += 1;

            let (exit_code, elapsed, failure) = match self.runner.run(&cmd) {
                Ok(invocation) if invocation.success() => (Some(0), invocation.elapsed, None),
                Ok(invocation) => {
                    let status = match invocation.exit_code {
                        Some(code) => format!("exited with status {}", code),
                        None => "was terminated by a signal".to_string(),
                    };
                    let message = format!(
                        "`{}` {} after {}",
                        cmd.display(),
                        status,
                        format_duration(invocation.elapsed)
                    );
                    (invocation.exit_code, invocation.elapsed, Some(message))
                }
                Err(e) => (
                    None,
                    Duration::ZERO,
                    Some(format!("could not run `{}`: {}", self.toolchain.shader_compiler.display(), e)),
                ),
            };

            self.shell.json_event(&BuildEvent::ShaderCompiled {
                source: source.clone(),
                output: output.clone(),
                success: failure.is_none(),
                exit_code,
                duration_ms: elapsed.as_millis() as u64,
            });

            match failure {
                None => report
                    .compiled
                    .push(Artifact::new(ArtifactKind::ShaderBinary, output)),
                Some(message) => {
                    tracing::debug!("shader {} failed: {}", source.display(), message);
                    spinner.suspend(|| {
                        self.shell
                            .error(format!("failed to compile {}: {}", file_name, message))
                    });
                    report.failures.push(ShaderFailure {
                        source,
                        exit_code,
                        message,
                    });
                }
            }
            spinner.inc();
        }

        spinner.finish();
        report.elapsed = start.elapsed();

        self.shell.json_event(&BuildEvent::BuildFinished {
            success: report.success(),
            duration_ms: report.elapsed.as_millis() as u64,
            failures: Some(report.failures.len()),
        });
        if report.success() {
            self.shell.status(
                Status::Finished,
                format!(
                    "{} shader(s) in {}",
                    report.compiled.len(),
                    format_duration(report.elapsed)
                ),
            );
        } else {
            self.shell.warn(format!(
                "{} of {} shader(s) failed in {}",
                report.failures.len(),
                report.attempted,
                format_duration(report.elapsed)
            ));
        }

        Ok(report)
    }
}
