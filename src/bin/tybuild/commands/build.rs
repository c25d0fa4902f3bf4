//! `tybuild build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use crate::commands::CommandContext;
use tybuild::builder::BuildError;
use tybuild::ops::tybuild_build::{build, BuildOptions, BuildOutcome};
use tybuild::util::shell::Status;
use tybuild::util::SystemRunner;

pub fn execute(args: BuildArgs, ctx: &CommandContext) -> Result<i32> {
    let opts = BuildOptions {
        variant: args.variant.variant(),
        full: args.full,
        plan: args.plan,
    };

    // Usage errors come before reading any configuration
    if opts.variant.is_none() {
        return Err(BuildError::NoVariant.into());
    }

    let config = ctx.config()?;
    let mut runner = SystemRunner;

    match build(&config, &opts, &mut runner, &ctx.shell)? {
        BuildOutcome::Planned(stages) => {
            for stage in &stages {
                for step in &stage.steps {
                    ctx.shell.status(Status::Planned, format!("[{}] {}", stage.kind, step.display()));
                }
            }
        }
        BuildOutcome::Built(report) => {
            tracing::debug!("built {} in {} stage(s)", report.variant, report.stages.len());
        }
    }

    Ok(0)
}
