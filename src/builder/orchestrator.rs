//! The main build chain: PCH → Dependencies → MainCompile → Link.
//!
//! The orchestrator turns a [`BuildRequest`] into an ordered list of
//! [`Stage`]s and runs them fail-fast. Which stages run is decided by the
//! request alone (`full` adds the PCH and dependency stages); how each stage
//! is compiled is decided by the variant's capability table.
//!
//! Artifacts written by earlier stages are left in place when a later stage
//! fails; every stage overwrites its output, so rerunning is enough.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::builder::artifacts::{ArtifactStore, CleanupReport};
use crate::builder::error::BuildError;
use crate::builder::events::BuildEvent;
use crate::builder::flags::{CompileStage, FlagSet};
use crate::builder::stage::{Stage, StageReport, StageRunner};
use crate::builder::toolchain::{path_arg, Toolchain};
use crate::core::{Artifact, ArtifactKind, BuildRequest, BuildVariant, StageKind};
use crate::util::config::Config;
use crate::util::process::CommandRunner;
use crate::util::shell::{format_duration, Shell, Status};

/// Where the orchestrator is in its per-run state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Idle,
    Running(StageKind),
    CleanedUp,
    Failed {
        stage: Option<StageKind>,
        exit_code: Option<i32>,
    },
}

/// Outcome of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub variant: BuildVariant,
    pub stages: Vec<StageReport>,
    pub cleanup: CleanupReport,
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn stage_kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(|s| s.kind).collect()
    }
}

/// Artifact paths of one variant's build.
#[derive(Debug, Clone)]
pub struct VariantLayout {
    pub pch: PathBuf,
    pub dependencies_object: PathBuf,
    pub dependencies_archive: PathBuf,
    pub main_object: PathBuf,
    pub library: PathBuf,
}

impl VariantLayout {
    pub fn new(config: &Config, variant: BuildVariant, store: &ArtifactStore) -> Self {
        let target = &config.target;
        let pch_name = pch_file_name(&config.paths.pch_header, variant.profile().pch_optimized);

        VariantLayout {
            pch: store.path(pch_name),
            dependencies_object: store.path(format!(
                "{}.{}",
                target.dependencies_name, target.object_extension
            )),
            dependencies_archive: store.path(format!(
                "{}.{}",
                target.dependencies_name, target.archive_extension
            )),
            main_object: store.path(format!("{}.{}", target.name, target.object_extension)),
            library: store.path(format!("{}.{}", target.name, target.archive_extension)),
        }
    }
}

/// Name of the precompiled header built from `header`.
///
/// `stdafx.hpp` becomes `stdafx_d.hpp.pch` unoptimized and
/// `stdafx_r.hpp.pch` optimized.
pub fn pch_file_name(header: &Path, optimized: bool) -> String {
    let suffix = if optimized { "r" } else { "d" };
    let stem = header
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stdafx".to_string());

    match header.extension() {
        Some(ext) => format!("{}_{}.{}.pch", stem, suffix, ext.to_string_lossy()),
        None => format!("{}_{}.pch", stem, suffix),
    }
}

/// Drives the build chain for one request.
pub struct BuildOrchestrator<'a> {
    config: &'a Config,
    flags: &'a FlagSet,
    toolchain: Toolchain,
    runner: &'a mut dyn CommandRunner,
    shell: &'a Shell,
    state: BuildState,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(
        config: &'a Config,
        flags: &'a FlagSet,
        runner: &'a mut dyn CommandRunner,
        shell: &'a Shell,
    ) -> Self {
        BuildOrchestrator {
            config,
            flags,
            toolchain: Toolchain::from_config(config),
            runner,
            shell,
            state: BuildState::Idle,
        }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// The output directory of a variant.
    pub fn store(&self, variant: BuildVariant) -> ArtifactStore {
        ArtifactStore::new(self.config.paths.variant_dir(variant))
    }

    /// Decide the ordered stage list for a request without running it.
    pub fn plan(&self, request: &BuildRequest) -> Result<Vec<Stage>, BuildError> {
        let variant = request.variant.ok_or(BuildError::NoVariant)?;
        let store = self.store(variant);
        let layout = VariantLayout::new(self.config, variant, &store);
        let paths = &self.config.paths;

        let pch = Artifact::new(ArtifactKind::PrecompiledHeader, &layout.pch);
        let archive = Artifact::new(ArtifactKind::Archive, &layout.dependencies_archive);
        let main_object = Artifact::new(ArtifactKind::Object, &layout.main_object);

        let mut stages = Vec::new();

        if request.full {
            let flags = self.flags.compose(variant, CompileStage::Pch, None);
            stages.push(Stage::new(
                StageKind::Pch,
                vec![self.toolchain.emit_pch(&flags, &paths.pch_header, &layout.pch)],
                pch.clone(),
            ));

            let flags = self.flags.compose(variant, CompileStage::Dependencies, None);
            let object = path_arg(&layout.dependencies_object);
            stages.push(Stage::new(
                StageKind::Dependencies,
                vec![
                    self.toolchain
                        .compile(&flags, &paths.dependencies_source, &layout.dependencies_object)
                        .quiet(),
                    self.toolchain
                        .archive(&layout.dependencies_archive, &[object], &[]),
                ],
                archive.clone(),
            ));
        }

        let uses_pch = variant.profile().uses_pch;
        let flags = self.flags.compose(
            variant,
            CompileStage::Main,
            uses_pch.then_some(layout.pch.as_path()),
        );
        let mut main = Stage::new(
            StageKind::MainCompile,
            vec![self.toolchain.compile(&flags, &paths.main_source, &layout.main_object)],
            main_object.clone(),
        );
        if uses_pch {
            main = main.depends_on(pch);
        }
        stages.push(main);

        let link = &self.config.link;
        let mut inputs = vec![path_arg(&layout.main_object)];
        let mut link_stage_deps = vec![main_object];
        if request.full || layout.dependencies_archive.is_file() {
            inputs.push(path_arg(&layout.dependencies_archive));
            link_stage_deps.push(archive);
        } else {
            tracing::debug!(
                "no dependency archive at {}, linking without it",
                layout.dependencies_archive.display()
            );
        }
        inputs.extend(link.libs.iter().cloned());
        inputs.extend(link.vendor_libs.iter().cloned());
        inputs.extend(link.variant_libs(variant).iter().cloned());

        let mut link_stage = Stage::new(
            StageKind::Link,
            vec![self.toolchain.archive(&layout.library, &inputs, &link.flags)],
            Artifact::new(ArtifactKind::Library, &layout.library),
        );
        for dep in link_stage_deps {
            link_stage = link_stage.depends_on(dep);
        }
        stages.push(link_stage);

        Ok(stages)
    }

    /// Run the build chain, stopping at the first failing stage.
    ///
    /// Transient object files are removed only after the link succeeds.
    pub fn run(&mut self, request: &BuildRequest) -> Result<BuildReport, BuildError> {
        let result = self.run_chain(request);

        if let Err(ref e) = result {
            let exit_code = match e {
                BuildError::ToolFailure { exit_code, .. } => *exit_code,
                _ => None,
            };
            self.state = BuildState::Failed {
                stage: e.stage(),
                exit_code,
            };
        }

        result
    }

    fn run_chain(&mut self, request: &BuildRequest) -> Result<BuildReport, BuildError> {
        let variant = request.variant.ok_or(BuildError::NoVariant)?;
        let start = Instant::now();

        let store = self.store(variant);
        let stages = self.plan(request)?;

        self.shell.status(
            Status::Building,
            format!(
                "{} ({})",
                variant,
                if request.full { "full" } else { "incremental" }
            ),
        );
        self.shell.json_event(&BuildEvent::BuildStarted {
            pipeline: "build".to_string(),
            variant: Some(variant),
            full: request.full,
        });

        if let Err(e) = store.ensure_dir() {
            self.emit_failed(start);
            return Err(e);
        }

        let mut reports = Vec::with_capacity(stages.len());
        for stage in &stages {
            self.state = BuildState::Running(stage.kind);
            let result = StageRunner::new(&mut *self.runner, self.shell).run(stage);
            match result {
                Ok(report) => reports.push(report),
                Err(e) => {
                    self.emit_failed(start);
                    return Err(e);
                }
            }
        }

        let cleanup = store.cleanup();
        self.shell.verbose(
            Status::Cleaning,
            format!(
                "{} object file(s) in {}",
                cleanup.removed.len(),
                store.dir().display()
            ),
        );
        self.shell.json_event(&BuildEvent::Cleanup {
            removed: cleanup.removed.len(),
            failed: cleanup.failed.len(),
        });
        self.state = BuildState::CleanedUp;

        let elapsed = start.elapsed();
        self.shell.status(
            Status::Finished,
            format!("{} build in {}", variant, format_duration(elapsed)),
        );
        self.shell
            .json_event(&BuildEvent::finished(true, elapsed.as_millis() as u64));

        Ok(BuildReport {
            variant,
            stages: reports,
            cleanup,
            elapsed,
        })
    }

    fn emit_failed(&self, start: Instant) {
        self.shell.json_event(&BuildEvent::BuildFinished {
            success: false,
            duration_ms: start.elapsed().as_millis() as u64,
            failures: Some(1),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingRunner, TestProject};

    fn run(
        project: &TestProject,
        runner: &mut RecordingRunner,
        request: BuildRequest,
    ) -> (Result<BuildReport, BuildError>, BuildState) {
        let shell = Shell::quiet();
        let mut orchestrator =
            BuildOrchestrator::new(&project.config, &project.flags, runner, &shell);
        let result = orchestrator.run(&request);
        (result, orchestrator.state())
    }

    #[test]
    fn test_pch_file_name() {
        assert_eq!(pch_file_name(Path::new("src/stdafx.hpp"), false), "stdafx_d.hpp.pch");
        assert_eq!(pch_file_name(Path::new("src/stdafx.hpp"), true), "stdafx_r.hpp.pch");
        assert_eq!(pch_file_name(Path::new("pch"), true), "pch_r.pch");
    }

    #[test]
    fn test_debug_full_sequence() {
        let project = TestProject::new();
        let mut runner = RecordingRunner::new();

        let (result, state) = run(
            &project,
            &mut runner,
            BuildRequest::new(BuildVariant::Debug).full(true),
        );
        let report = result.unwrap();

        assert_eq!(
            report.stage_kinds(),
            [
                StageKind::Pch,
                StageKind::Dependencies,
                StageKind::MainCompile,
                StageKind::Link
            ]
        );
        assert_eq!(state, BuildState::CleanedUp);

        let calls = runner.calls();
        assert_eq!(calls.len(), 5);

        // PCH: unoptimized
        assert!(calls[0].has_arg("-emit-pch"));
        assert!(calls[0].has_arg("-O0"));
        assert!(calls[0].display().contains("stdafx_d.hpp.pch"));

        // Dependencies: optimized compile, then archive
        assert!(calls[1].display().contains("dependencies.cpp"));
        assert!(calls[1].has_arg("-Ofast"));
        assert!(!calls[1].has_arg("-O0"));
        assert_eq!(calls[2].program, PathBuf::from("lib"));
        assert!(calls[2].display().contains("ty_dependencies_only.lib"));

        // Main compile: debug flags + unoptimized PCH
        assert!(calls[3].display().contains("main.cpp"));
        for flag in ["-g", "-O0", "-DTY_DEBUG=1", "-include-pch"] {
            assert!(calls[3].has_arg(flag), "missing {flag}");
        }
        assert!(calls[3].display().contains("stdafx_d.hpp.pch"));

        // Link: main object, archive, system and vendor libraries
        let link = calls[4].display();
        assert!(link.contains("/OUT:"));
        assert!(link.contains("ty.obj"));
        assert!(link.contains("ty_dependencies_only.lib"));
        assert!(link.contains("user32.lib"));
        assert!(link.contains("vulkan-1.lib"));
    }

    #[test]
    fn test_release_incremental_sequence() {
        let project = TestProject::new();
        let mut runner = RecordingRunner::new();

        let (result, _) = run(&project, &mut runner, BuildRequest::new(BuildVariant::Release));
        let report = result.unwrap();

        assert_eq!(report.stage_kinds(), [StageKind::MainCompile, StageKind::Link]);
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].has_arg("-Ofast"));
        assert!(calls[0].has_arg("-DTY_NDEBUG=1"));
        assert!(!calls[0].has_arg("-include-pch"));
        assert!(!calls[0].display().contains(".pch"));
        // No archive on disk yet
        assert!(!calls[1].display().contains("ty_dependencies_only.lib"));
    }

    #[test]
    fn test_incremental_never_runs_pch_or_dependencies() {
        for variant in BuildVariant::ALL {
            let project = TestProject::new();
            let mut runner = RecordingRunner::new();

            let (result, _) = run(&project, &mut runner, BuildRequest::new(variant));
            result.unwrap();

            assert!(runner.position("-emit-pch").is_none());
            assert!(runner.position("dependencies.cpp").is_none());
        }
    }

    #[test]
    fn test_full_orders_pch_before_dependencies_before_main() {
        for variant in BuildVariant::ALL {
            let project = TestProject::new();
            let mut runner = RecordingRunner::new();

            let (result, _) = run(&project, &mut runner, BuildRequest::new(variant).full(true));
            result.unwrap();

            let pch = runner.position("-emit-pch").unwrap();
            let deps = runner.position("dependencies.cpp").unwrap();
            let main = runner.position("main.cpp").unwrap();
            assert!(pch < deps && deps < main, "{variant}: {pch} {deps} {main}");
        }
    }

    #[test]
    fn test_profile_uses_optimized_pch_and_profile_define() {
        let project = TestProject::new();
        let mut runner = RecordingRunner::new();

        let (result, _) = run(
            &project,
            &mut runner,
            BuildRequest::new(BuildVariant::Profile).full(true),
        );
        result.unwrap();

        let calls = runner.calls();
        assert!(calls[0].has_arg("-Ofast"));
        assert!(calls[0].display().contains("stdafx_r.hpp.pch"));
        let main = &calls[3];
        assert!(main.has_arg("-DTY_PROFILE=1"));
        assert!(main.display().contains("stdafx_r.hpp.pch"));
        assert!(project.config.paths.build_dir.join("profile").is_dir());
    }

    #[test]
    fn test_main_compile_failure_skips_link_and_cleanup() {
        let project = TestProject::new();
        let store = ArtifactStore::new(project.config.paths.variant_dir(BuildVariant::Debug));
        store.ensure_dir().unwrap();
        std::fs::write(store.path("stale.obj"), "x").unwrap();

        let mut runner = RecordingRunner::new();
        runner.fail_when("main.cpp", 2);

        let (result, state) = run(&project, &mut runner, BuildRequest::new(BuildVariant::Debug));
        let err = result.unwrap_err();

        assert_eq!(err.stage(), Some(StageKind::MainCompile));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            state,
            BuildState::Failed {
                stage: Some(StageKind::MainCompile),
                exit_code: Some(2)
            }
        );
        assert_eq!(runner.calls().len(), 1);
        assert!(store.contains("stale.obj"), "cleanup must not run");
    }

    #[test]
    fn test_pch_failure_aborts_chain() {
        let project = TestProject::new();
        let mut runner = RecordingRunner::new();
        runner.fail_when("-emit-pch", 1);

        let (result, _) = run(
            &project,
            &mut runner,
            BuildRequest::new(BuildVariant::Release).full(true),
        );

        assert_eq!(result.unwrap_err().stage(), Some(StageKind::Pch));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_link_failure_keeps_objects() {
        let project = TestProject::new();
        let store = ArtifactStore::new(project.config.paths.variant_dir(BuildVariant::Release));
        store.ensure_dir().unwrap();
        std::fs::write(store.path("ty.obj"), "x").unwrap();

        let mut runner = RecordingRunner::new();
        runner.fail_when("/OUT:", 1120);

        let (result, _) = run(&project, &mut runner, BuildRequest::new(BuildVariant::Release));
        let err = result.unwrap_err();

        assert_eq!(err.stage(), Some(StageKind::Link));
        // Out of range for a process status
        assert_eq!(err.exit_code(), 1);
        assert!(store.contains("ty.obj"));
    }

    #[test]
    fn test_success_cleans_objects_only() {
        let project = TestProject::new();
        let store = ArtifactStore::new(project.config.paths.variant_dir(BuildVariant::Debug));
        store.ensure_dir().unwrap();
        for name in ["ty.obj", "ty_dependencies_only.obj", "ty_dependencies_only.lib", "stdafx_d.hpp.pch"] {
            std::fs::write(store.path(name), "x").unwrap();
        }

        let mut runner = RecordingRunner::new();
        let (result, _) = run(&project, &mut runner, BuildRequest::new(BuildVariant::Debug));
        let report = result.unwrap();

        assert_eq!(report.cleanup.removed.len(), 2);
        assert!(!store.contains("ty.obj"));
        assert!(!store.contains("ty_dependencies_only.obj"));
        assert!(store.contains("ty_dependencies_only.lib"));
        assert!(store.contains("stdafx_d.hpp.pch"));
        // Existing archive is linked on incremental builds
        assert!(runner.calls()[1].display().contains("ty_dependencies_only.lib"));
    }

    #[test]
    fn test_no_variant_runs_nothing() {
        let project = TestProject::new();
        let mut runner = RecordingRunner::new();

        let (result, state) = run(&project, &mut runner, BuildRequest::default());

        assert!(matches!(result, Err(BuildError::NoVariant)));
        assert!(runner.calls().is_empty());
        assert!(!project.config.paths.build_dir.exists());
        assert_eq!(
            state,
            BuildState::Failed {
                stage: None,
                exit_code: None
            }
        );
    }

    #[test]
    fn test_unwritable_output_dir_runs_nothing() {
        let mut project = TestProject::new();
        let blocker = project.write("blocker", "");
        project.config.paths.build_dir = blocker;
        let mut runner = RecordingRunner::new();

        let (result, state) = run(&project, &mut runner, BuildRequest::new(BuildVariant::Debug));

        assert!(matches!(result, Err(BuildError::Io { .. })));
        assert!(runner.calls().is_empty());
        assert_eq!(
            state,
            BuildState::Failed {
                stage: None,
                exit_code: None
            }
        );
    }

    #[test]
    fn test_launch_failure_tagged_with_stage() {
        let project = TestProject::new();
        let mut runner = RecordingRunner::new();
        runner.missing_program("clang");

        let (result, _) = run(&project, &mut runner, BuildRequest::new(BuildVariant::Debug));

        assert!(matches!(
            result,
            Err(BuildError::Launch {
                stage: StageKind::MainCompile,
                ..
            })
        ));
    }

    #[test]
    fn test_variant_libs_are_linked() {
        let mut project = TestProject::new();
        project.config.link.profile = vec!["tracy.lib".to_string()];
        let mut runner = RecordingRunner::new();

        let (result, _) = run(&project, &mut runner, BuildRequest::new(BuildVariant::Profile));
        result.unwrap();
        assert!(runner.calls()[1].has_arg("tracy.lib"));

        let mut runner = RecordingRunner::new();
        let (result, _) = run(&project, &mut runner, BuildRequest::new(BuildVariant::Debug));
        result.unwrap();
        assert!(!runner.calls()[1].has_arg("tracy.lib"));
    }

    #[test]
    fn test_plan_declares_dependencies() {
        let project = TestProject::new();
        let shell = Shell::quiet();
        let mut runner = RecordingRunner::new();
        let orchestrator =
            BuildOrchestrator::new(&project.config, &project.flags, &mut runner, &shell);

        let stages = orchestrator
            .plan(&BuildRequest::new(BuildVariant::Debug).full(true))
            .unwrap();

        let main = &stages[2];
        assert_eq!(main.kind, StageKind::MainCompile);
        assert_eq!(main.depends_on[0].kind, ArtifactKind::PrecompiledHeader);
        assert_eq!(main.depends_on[0].path, stages[0].produces.path);

        let link = &stages[3];
        let kinds: Vec<_> = link.depends_on.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, [ArtifactKind::Object, ArtifactKind::Archive]);
        assert_eq!(link.produces.kind, ArtifactKind::Library);

        let release = orchestrator
            .plan(&BuildRequest::new(BuildVariant::Release))
            .unwrap();
        assert!(release[0].depends_on.is_empty());
    }
}
