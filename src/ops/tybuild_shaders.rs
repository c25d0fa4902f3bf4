//! Implementation of `tybuild shaders`.

use anyhow::Result;

use crate::builder::{ShaderCompiler, ShaderReport, Toolchain};
use crate::core::BuildVariant;
use crate::util::config::Config;
use crate::util::process::CommandRunner;
use crate::util::shell::Shell;

/// Compile every shader in the configured shader directory.
///
/// Only the debug variant builds shaders with debug info; release and
/// profile (and no variant at all) use the optimizing flags.
pub fn compile_shaders(
    config: &Config,
    variant: Option<BuildVariant>,
    runner: &mut dyn CommandRunner,
    shell: &Shell,
) -> Result<ShaderReport> {
    let toolchain = Toolchain::from_config(config);
    let debug = variant == Some(BuildVariant::Debug);

    let report = ShaderCompiler::new(&toolchain, runner, shell).compile_all(
        &config.paths.shader_dir,
        &config.paths.shader_output,
        debug,
    )?;

    Ok(report)
}
