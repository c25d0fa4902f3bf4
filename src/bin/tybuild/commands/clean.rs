//! `tybuild clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use crate::commands::CommandContext;
use tybuild::ops::clean;
use tybuild::util::shell::Status;

pub fn execute(args: CleanArgs, ctx: &CommandContext) -> Result<i32> {
    let config = ctx.config()?;

    let removed = clean(&config, args.variant.variant())?;

    if removed.is_empty() {
        ctx.shell.status(Status::Skipped, "nothing to clean");
    }
    for dir in removed {
        ctx.shell.status(Status::Removed, dir.display());
    }

    Ok(0)
}
