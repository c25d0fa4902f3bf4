//! Configuration file support for tybuild.
//!
//! The project configuration lives in `tybuild.toml` next to the engine
//! sources. Every section is optional; missing keys fall back to the
//! engine's standard layout (clang, MSVC `lib`, glslc, `build/<variant>`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::BuildVariant;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "tybuild.toml";

/// Error loading configuration or the flags file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to read flags file: {}", path.display())]
    Flags {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// tybuild configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External tools
    pub toolchain: ToolchainConfig,

    /// Input and output locations
    pub paths: PathsConfig,

    /// Output naming
    pub target: TargetConfig,

    /// Extra compiler flags
    pub compile: CompileConfig,

    /// Libraries and flags for the link stage
    pub link: LinkConfig,
}

/// How the librarian is invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiverFlavor {
    /// MSVC `lib.exe`: `lib /OUT:<archive> <inputs>`
    #[default]
    Msvc,
    /// GNU/LLVM `ar`: `ar rcs <archive> <inputs>`
    Ar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// C++ compiler driver
    pub compiler: PathBuf,
    /// Static library tool
    pub librarian: PathBuf,
    /// Command-line style of the librarian
    pub archiver: ArchiverFlavor,
    /// GLSL to SPIR-V compiler
    pub shader_compiler: PathBuf,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        ToolchainConfig {
            compiler: PathBuf::from("clang"),
            librarian: PathBuf::from("lib"),
            archiver: ArchiverFlavor::Msvc,
            shader_compiler: PathBuf::from("glslc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Base compiler flags, one token per line
    pub flags_file: PathBuf,
    /// Root of the per-variant output directories
    pub build_dir: PathBuf,
    /// Header compiled into the precompiled header
    pub pch_header: PathBuf,
    /// Translation unit holding the third-party dependencies
    pub dependencies_source: PathBuf,
    /// Translation unit of the engine itself
    pub main_source: PathBuf,
    /// GLSL sources, scanned one level deep
    pub shader_dir: PathBuf,
    /// Where compiled SPIR-V goes
    pub shader_output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            flags_file: PathBuf::from("compile_flags.txt"),
            build_dir: PathBuf::from("build"),
            pch_header: PathBuf::from("src/stdafx.hpp"),
            dependencies_source: PathBuf::from("src/dependencies.cpp"),
            main_source: PathBuf::from("src/main.cpp"),
            shader_dir: PathBuf::from("resources/shaders"),
            shader_output: PathBuf::from("build"),
        }
    }
}

impl PathsConfig {
    /// Output directory of a variant.
    pub fn variant_dir(&self, variant: BuildVariant) -> PathBuf {
        self.build_dir.join(variant.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Engine library name
    pub name: String,
    /// Dependency archive name
    pub dependencies_name: String,
    pub object_extension: String,
    pub archive_extension: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        TargetConfig {
            name: "ty".to_string(),
            dependencies_name: "ty_dependencies_only".to_string(),
            object_extension: "obj".to_string(),
            archive_extension: "lib".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Appended to every compile after the base flags
    pub extra_flags: Vec<String>,
    /// Appended only when compiling the dependency translation unit
    pub dependency_flags: Vec<String>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            extra_flags: vec!["-fms-runtime-lib=dll".to_string()],
            dependency_flags: vec!["-Wno-nullability-completeness".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// System libraries linked into every variant
    pub libs: Vec<String>,
    /// Vendor SDK libraries linked into every variant
    pub vendor_libs: Vec<String>,
    /// Trailing librarian flags
    pub flags: Vec<String>,
    pub debug: Vec<String>,
    pub release: Vec<String>,
    pub profile: Vec<String>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            libs: vec!["user32.lib".to_string(), "gdi32.lib".to_string()],
            vendor_libs: vec![
                "C:/VulkanSDK/1.3.239.0/Lib/vulkan-1.lib".to_string(),
                "C:/VulkanSDK/1.3.239.0/Lib/shaderc_combined.lib".to_string(),
            ],
            flags: vec!["/IGNORE:4006".to_string()],
            debug: Vec::new(),
            release: Vec::new(),
            profile: Vec::new(),
        }
    }
}

impl LinkConfig {
    /// Libraries specific to one variant.
    pub fn variant_libs(&self, variant: BuildVariant) -> &[String] {
        match variant {
            BuildVariant::Debug => &self.debug,
            BuildVariant::Release => &self.release,
            BuildVariant::Profile => &self.profile,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from a file that must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Load configuration, using defaults when the file doesn't exist.
    ///
    /// A file that exists but is malformed is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

/// Load configuration from an explicit path or the default location.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => Config::load(path),
        None => Config::load_or_default(Path::new(CONFIG_FILE)),
    }
}
