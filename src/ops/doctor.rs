//! Toolchain health checks.
//!
//! `tybuild doctor` verifies that every configured tool resolves to an
//! executable and that the flags file and shader directory exist.

use std::path::{Path, PathBuf};

use crate::util::config::Config;
use crate::util::process::find_executable;

/// Result of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// What was checked (e.g., "compiler")
    pub name: String,
    /// What was looked for
    pub target: PathBuf,
    /// Resolved location, if found
    pub found: Option<PathBuf>,
    /// Whether a failure here blocks the engine build
    pub required: bool,
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        self.found.is_some()
    }
}

/// All checks for one configuration.
#[derive(Debug, Clone, Default)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
}

impl DoctorReport {
    /// Whether every required check passed.
    pub fn healthy(&self) -> bool {
        self.checks.iter().all(|c| c.passed() || !c.required)
    }
}

fn tool(name: &str, program: &Path, required: bool) -> CheckResult {
    CheckResult {
        name: name.to_string(),
        target: program.to_path_buf(),
        found: find_executable(program),
        required,
    }
}

fn file(name: &str, path: &Path, required: bool) -> CheckResult {
    CheckResult {
        name: name.to_string(),
        target: path.to_path_buf(),
        found: path.exists().then(|| path.to_path_buf()),
        required,
    }
}

/// Run every check.
///
/// The shader compiler and shader directory only matter for
/// `tybuild shaders`, so they are not required.
pub fn doctor(config: &Config) -> DoctorReport {
    let toolchain = &config.toolchain;
    let paths = &config.paths;

    DoctorReport {
        checks: vec![
            tool("compiler", &toolchain.compiler, true),
            tool("librarian", &toolchain.librarian, true),
            tool("shader compiler", &toolchain.shader_compiler, false),
            file("flags file", &paths.flags_file, true),
            file("shader directory", &paths.shader_dir, false),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestProject;

    #[test]
    fn test_missing_required_tool_is_unhealthy() {
        let mut project = TestProject::new();
        project.config.toolchain.compiler = PathBuf::from("tybuild-no-such-compiler");
        let flags = project.write("compile_flags.txt", "-Wall\n");
        project.config.paths.flags_file = flags;

        let report = doctor(&project.config);

        let compiler = &report.checks[0];
        assert_eq!(compiler.name, "compiler");
        assert!(!compiler.passed());
        assert!(!report.healthy());
        assert!(report.checks[3].passed());
    }

    #[test]
    fn test_optional_checks_do_not_affect_health() {
        let report = DoctorReport {
            checks: vec![CheckResult {
                name: "shader directory".to_string(),
                target: PathBuf::from("resources/shaders"),
                found: None,
                required: false,
            }],
        };
        assert!(report.healthy());
    }
}
