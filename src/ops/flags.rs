//! Implementation of `tybuild flags`.

use anyhow::Result;

use crate::builder::orchestrator::VariantLayout;
use crate::builder::{ArtifactStore, CompileStage};
use crate::core::BuildVariant;
use crate::ops::tybuild_build::load_flags;
use crate::util::config::Config;

/// The exact compiler flags a stage of a variant's build would use.
pub fn show_flags(config: &Config, variant: BuildVariant, stage: CompileStage) -> Result<Vec<String>> {
    let flags = load_flags(config)?;
    let store = ArtifactStore::new(config.paths.variant_dir(variant));
    let layout = VariantLayout::new(config, variant, &store);

    let pch = (stage == CompileStage::Main).then_some(layout.pch.as_path());
    Ok(flags.compose(variant, stage, pch))
}
