//! Build variants and their capability table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A build variant selects optimization level, defines and output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildVariant {
    Debug,
    Release,
    Profile,
}

/// What a variant is allowed to do with the precompiled header and
/// the dependency archive.
///
/// Every "does variant X use a PCH" decision goes through this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantProfile {
    /// The main compile includes the variant's precompiled header.
    pub uses_pch: bool,
    /// The precompiled header is built with aggressive optimization.
    pub pch_optimized: bool,
    /// The dependency archive is built with aggressive optimization.
    pub dependencies_optimized: bool,
}

impl BuildVariant {
    /// All variants, in CLI precedence order.
    pub const ALL: [BuildVariant; 3] = [
        BuildVariant::Debug,
        BuildVariant::Release,
        BuildVariant::Profile,
    ];

    /// Lowercase name, also used as the output subdirectory.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildVariant::Debug => "debug",
            BuildVariant::Release => "release",
            BuildVariant::Profile => "profile",
        }
    }

    /// Capability table for this variant.
    ///
    /// Dependencies are optimized even for debug builds: they are stable
    /// third-party code and debug iteration wants them fast.
    pub fn profile(&self) -> VariantProfile {
        match self {
            BuildVariant::Debug => VariantProfile {
                uses_pch: true,
                pch_optimized: false,
                dependencies_optimized: true,
            },
            BuildVariant::Release => VariantProfile {
                uses_pch: false,
                pch_optimized: true,
                dependencies_optimized: true,
            },
            BuildVariant::Profile => VariantProfile {
                uses_pch: true,
                pch_optimized: true,
                dependencies_optimized: true,
            },
        }
    }

    /// Resolve the variant from the CLI mode flags.
    ///
    /// Debug wins over Release, Release over Profile.
    pub fn from_flags(debug: bool, release: bool, profile: bool) -> Option<BuildVariant> {
        if debug {
            Some(BuildVariant::Debug)
        } else if release {
            Some(BuildVariant::Release)
        } else if profile {
            Some(BuildVariant::Profile)
        } else {
            None
        }
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" | "d" => Ok(BuildVariant::Debug),
            "release" | "r" => Ok(BuildVariant::Release),
            "profile" | "p" => Ok(BuildVariant::Profile),
            _ => Err(format!(
                "invalid variant '{}'; expected 'debug', 'release', or 'profile'",
                s
            )),
        }
    }
}
