//! Implementation of `tybuild clean`.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::BuildVariant;
use crate::util::config::Config;
use crate::util::fs::remove_dir_all_if_exists;

/// Remove a variant's output directory, or every variant's when `None`.
///
/// Returns the directories that existed and were removed. The shader
/// output directory is left alone.
pub fn clean(config: &Config, variant: Option<BuildVariant>) -> Result<Vec<PathBuf>> {
    let variants: Vec<BuildVariant> = match variant {
        Some(v) => vec![v],
        None => BuildVariant::ALL.to_vec(),
    };

    let mut removed = Vec::new();
    for variant in variants {
        let dir = config.paths.variant_dir(variant);
        if remove_dir_all_if_exists(&dir)? {
            tracing::debug!("removed {}", dir.display());
            removed.push(dir);
        }
    }

    Ok(removed)
}
