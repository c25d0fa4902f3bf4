//! `tybuild shaders` command

use anyhow::Result;

use crate::cli::ShadersArgs;
use crate::commands::CommandContext;
use tybuild::ops::compile_shaders;
use tybuild::util::SystemRunner;

pub fn execute(args: ShadersArgs, ctx: &CommandContext) -> Result<i32> {
    let config = ctx.config()?;
    let mut runner = SystemRunner;

    let report = compile_shaders(&config, args.variant.variant(), &mut runner, &ctx.shell)?;

    Ok(report.exit_code().unwrap_or(0))
}
