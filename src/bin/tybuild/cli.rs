//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use tybuild::builder::CompileStage;
use tybuild::core::BuildVariant;
use tybuild::util::shell::ColorChoice;

/// tybuild - build pipeline for the Typheus engine
#[derive(Parser)]
#[command(name = "tybuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Echo every tool command line
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_parser = parse_color)]
    pub color: ColorChoice,

    /// Output format: human or json
    #[arg(long, global = true, default_value = "human", value_parser = ["human", "json"])]
    pub message_format: String,

    /// Path to the configuration file (defaults to ./tybuild.toml)
    #[arg(long, global = true, env = "TYBUILD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the engine library
    Build(BuildArgs),

    /// Compile GLSL shaders to SPIR-V
    Shaders(ShadersArgs),

    /// Show the compiler flags of a build stage
    Flags(FlagsArgs),

    /// Remove build output
    Clean(CleanArgs),

    /// Check that the configured tools are available
    Doctor,
}

/// Variant selection shared by every command.
///
/// The flags may be combined; debug wins over release, release over profile.
#[derive(Args, Debug, Clone, Copy)]
pub struct VariantArgs {
    /// Debug variant
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Release variant
    #[arg(short = 'r', long)]
    pub release: bool,

    /// Profile variant
    #[arg(short = 'p', long)]
    pub profile: bool,
}

impl VariantArgs {
    pub fn variant(&self) -> Option<BuildVariant> {
        BuildVariant::from_flags(self.debug, self.release, self.profile)
    }
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub variant: VariantArgs,

    /// Rebuild the precompiled header and dependency archive first
    #[arg(long)]
    pub full: bool,

    /// Print the planned stage commands without running them
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct ShadersArgs {
    #[command(flatten)]
    pub variant: VariantArgs,
}

#[derive(Args)]
pub struct FlagsArgs {
    #[command(flatten)]
    pub variant: VariantArgs,

    /// Stage to show: pch, dependencies, main
    #[arg(long, default_value = "main", value_parser = parse_stage)]
    pub stage: CompileStage,
}

#[derive(Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub variant: VariantArgs,
}

fn parse_color(s: &str) -> Result<ColorChoice, String> {
    s.parse()
}

fn parse_stage(s: &str) -> Result<CompileStage, String> {
    s.parse()
}
