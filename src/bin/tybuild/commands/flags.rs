//! `tybuild flags` command

use anyhow::Result;

use crate::cli::FlagsArgs;
use crate::commands::CommandContext;
use tybuild::builder::BuildError;
use tybuild::ops::show_flags;

pub fn execute(args: FlagsArgs, ctx: &CommandContext) -> Result<i32> {
    let variant = args.variant.variant().ok_or(BuildError::NoVariant)?;
    let config = ctx.config()?;

    let flags = show_flags(&config, variant, args.stage)?;

    if ctx.shell.is_json() {
        ctx.shell.json_event(&serde_json::json!({
            "reason": "flags",
            "variant": variant,
            "stage": args.stage.to_string(),
            "flags": flags,
        }));
    } else {
        for flag in flags {
            println!("{}", flag);
        }
    }

    Ok(0)
}
