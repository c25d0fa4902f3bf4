//! `tybuild doctor` command

use anyhow::Result;

use crate::commands::CommandContext;
use tybuild::ops::doctor;
use tybuild::util::shell::Status;

pub fn execute(ctx: &CommandContext) -> Result<i32> {
    let config = ctx.config()?;
    let report = doctor(&config);

    for check in &report.checks {
        match &check.found {
            Some(path) => ctx
                .shell
                .status(Status::Found, format!("{}: {}", check.name, path.display())),
            None if check.required => ctx.shell.error(format!(
                "{}: `{}` not found",
                check.name,
                check.target.display()
            )),
            None => ctx.shell.status(
                Status::Missing,
                format!("{}: `{}` (optional)", check.name, check.target.display()),
            ),
        }
    }

    Ok(if report.healthy() { 0 } else { 1 })
}
