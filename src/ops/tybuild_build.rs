//! Implementation of `tybuild build`.

use anyhow::{Context, Result};

use crate::builder::{BuildError, BuildOrchestrator, BuildReport, FlagSet, Stage};
use crate::core::{BuildRequest, BuildVariant};
use crate::util::config::Config;
use crate::util::process::CommandRunner;
use crate::util::shell::Shell;

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Selected variant (`None` is a usage error)
    pub variant: Option<BuildVariant>,

    /// Rebuild the precompiled header and dependency archive first
    pub full: bool,

    /// Only compute the stage list
    pub plan: bool,
}

impl BuildOptions {
    pub fn request(&self) -> BuildRequest {
        BuildRequest {
            variant: self.variant,
            full: self.full,
        }
    }
}

/// What a build invocation produced.
#[derive(Debug)]
pub enum BuildOutcome {
    Built(BuildReport),
    Planned(Vec<Stage>),
}

/// Load the base flags for a configuration.
pub fn load_flags(config: &Config) -> Result<FlagSet> {
    let flags = FlagSet::load(&config.paths.flags_file)
        .map_err(BuildError::from)
        .context("cannot compose compiler flags")?;
    Ok(flags.with_compile_config(&config.compile))
}

/// Run (or plan) the engine build.
///
/// Usage and configuration problems are reported before any tool runs.
pub fn build(
    config: &Config,
    opts: &BuildOptions,
    runner: &mut dyn CommandRunner,
    shell: &Shell,
) -> Result<BuildOutcome> {
    let request = opts.request();
    if request.variant.is_none() {
        return Err(BuildError::NoVariant.into());
    }

    let flags = load_flags(config)?;
    let mut orchestrator = BuildOrchestrator::new(config, &flags, runner, shell);

    if opts.plan {
        return Ok(BuildOutcome::Planned(orchestrator.plan(&request)?));
    }

    let report = orchestrator.run(&request)?;
    Ok(BuildOutcome::Built(report))
}
