//! tybuild CLI - build pipeline for the Typheus engine

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::CommandContext;
use tybuild::builder::BuildError;
use tybuild::util::Shell;

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("tybuild=debug")
    } else {
        EnvFilter::new("tybuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::from_flags(
        cli.quiet,
        cli.verbose,
        cli.color,
        cli.message_format == "json",
    );
    let ctx = CommandContext {
        shell,
        config_path: cli.config,
    };

    let code = match run(cli.command, &ctx) {
        Ok(code) => code,
        Err(e) => {
            if ctx.shell.is_json() {
                ctx.shell.error(format!("{:#}", e));
            } else {
                eprintln!("error: {:#}", e);
            }
            exit_code(&e)
        }
    };

    std::process::exit(code);
}

fn run(command: Commands, ctx: &CommandContext) -> Result<i32> {
    match command {
        Commands::Build(args) => commands::build::execute(args, ctx),
        Commands::Shaders(args) => commands::shaders::execute(args, ctx),
        Commands::Flags(args) => commands::flags::execute(args, ctx),
        Commands::Clean(args) => commands::clean::execute(args, ctx),
        Commands::Doctor => commands::doctor::execute(ctx),
    }
}

/// Exit status for an error: a failing tool's own code when there is one.
fn exit_code(e: &anyhow::Error) -> i32 {
    e.downcast_ref::<BuildError>()
        .map(BuildError::exit_code)
        .unwrap_or(1)
}
