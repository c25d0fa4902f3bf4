//! Single-stage execution with timing and failure propagation.

use std::time::{Duration, Instant};

use crate::builder::error::BuildError;
use crate::builder::events::BuildEvent;
use crate::builder::toolchain::CommandSpec;
use crate::core::{Artifact, StageKind};
use crate::util::process::CommandRunner;
use crate::util::shell::{format_duration, Shell, Status};

/// One step of the build chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub kind: StageKind,
    /// Commands run in order; the stage fails on the first failing one
    pub steps: Vec<CommandSpec>,
    /// The artifact this stage leaves behind
    pub produces: Artifact,
    /// Artifacts from earlier stages this stage reads
    pub depends_on: Vec<Artifact>,
}

impl Stage {
    pub fn new(kind: StageKind, steps: Vec<CommandSpec>, produces: Artifact) -> Self {
        Stage {
            kind,
            steps,
            produces,
            depends_on: Vec::new(),
        }
    }

    pub fn depends_on(mut self, artifact: Artifact) -> Self {
        self.depends_on.push(artifact);
        self
    }

    fn status(&self) -> Status {
        match self.kind {
            StageKind::Link => Status::Linking,
            _ => Status::Compiling,
        }
    }
}

/// Outcome of a successful stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub kind: StageKind,
    pub artifact: Artifact,
    /// Sum of the steps' tool times
    pub duration: Duration,
}

/// Runs stages against a [`CommandRunner`], reporting through the shell.
pub struct StageRunner<'a> {
    runner: &'a mut dyn CommandRunner,
    shell: &'a Shell,
}

impl<'a> StageRunner<'a> {
    pub fn new(runner: &'a mut dyn CommandRunner, shell: &'a Shell) -> Self {
        StageRunner { runner, shell }
    }

    /// Run every step of a stage, stopping at the first failure.
    pub fn run(&mut self, stage: &Stage) -> Result<StageReport, BuildError> {
        let start = Instant::now();
        let artifact_name = stage
            .produces
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.shell.status(
            stage.status(),
            format!("{} ({})", stage.kind.description(), artifact_name),
        );
        tracing::debug!(stage = %stage.kind, "starting stage");

        let mut duration = Duration::ZERO;
        for step in &stage.steps {
            self.shell.verbose(Status::Info, step.display());

            let invocation = match self.runner.run(step) {
                Ok(invocation) => invocation,
                Err(source) => {
                    self.emit_failure(stage, None, start.elapsed(), step);
                    return Err(BuildError::Launch {
                        stage: stage.kind,
                        program: step.program.clone(),
                        source,
                    });
                }
            };
            duration += invocation.elapsed;

            if !invocation.success() {
                self.emit_failure(stage, invocation.exit_code, duration, step);
                return Err(BuildError::ToolFailure {
                    stage: stage.kind,
                    command: step.display(),
                    exit_code: invocation.exit_code,
                    elapsed: duration,
                });
            }
        }

        self.shell.status(
            Status::Finished,
            format!("{} in {}", stage.kind.description(), format_duration(duration)),
        );
        self.shell.json_event(&BuildEvent::StageFinished {
            stage: stage.kind,
            success: true,
            exit_code: Some(0),
            duration_ms: duration.as_millis() as u64,
            command: None,
            artifact: Some(stage.produces.path.clone()),
        });
        tracing::debug!(stage = %stage.kind, wall = ?start.elapsed(), "stage finished");

        Ok(StageReport {
            kind: stage.kind,
            artifact: stage.produces.clone(),
            duration,
        })
    }

    fn emit_failure(
        &self,
        stage: &Stage,
        exit_code: Option<i32>,
        duration: Duration,
        step: &CommandSpec,
    ) {
        tracing::debug!(stage = %stage.kind, ?exit_code, "stage failed");
        self.shell.json_event(&BuildEvent::StageFinished {
            stage: stage.kind,
            success: false,
            exit_code,
            duration_ms: duration.as_millis() as u64,
            command: Some(step.display()),
            artifact: None,
        });
    }
}
