//! Pre-flight health check. Validates that the tools a build or run needs
//! are available.
//!
//! Checks are classified as **required** (cargo, rustc, the qemu-user
//! binary of an emulated target) or **optional** (the guest library
//! prefix, which statically linked builds do not need). Each check reports
//! pass/fail individually with a remediation hint on failure.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::FixtureTestError;
use crate::manifest::{FixtureManifest, TargetSpec};

/// Result of a single health check.
#[derive(Serialize, Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub required: bool,
    /// Resolved path when the check passes.
    pub path: Option<String>,
    /// Human-readable remediation hint when the check fails.
    pub hint: Option<String>,
}

/// Aggregated health check report.
#[derive(Serialize, Debug)]
pub struct HealthReport {
    pub checks: Vec<CheckResult>,
    pub all_required_passed: bool,
}

impl HealthReport {
    pub fn from_checks(checks: Vec<CheckResult>) -> Self {
        let all_required_passed = checks.iter().filter(|c| c.required).all(|c| c.passed);
        Self {
            checks,
            all_required_passed,
        }
    }
}

/// `health [--target NAME]` handler.
pub fn health(manifest: &FixtureManifest, target: Option<&str>) -> Result<serde_json::Value, FixtureTestError> {
    let report = check(manifest, target)?;
    Ok(serde_json::to_value(report)?)
}

/// Run the toolchain checks plus the checks for one target, or for every
/// target in the manifest when `target` is `None`.
pub fn check(manifest: &FixtureManifest, target: Option<&str>) -> Result<HealthReport, FixtureTestError> {
    let mut checks = vec![check_tool("cargo"), check_tool("rustc")];

    match target {
        Some(name) => checks.extend(check_target(name, manifest.target(name)?)),
        None => {
            for (name, spec) in &manifest.targets {
                checks.extend(check_target(name, spec));
            }
        }
    }

    Ok(HealthReport::from_checks(checks))
}

/// Checks needed before running the fixture for a single target.
pub fn check_target(name: &str, target: &TargetSpec) -> Vec<CheckResult> {
    let mut checks = Vec::new();
    if let Some(qemu) = target.qemu_binary() {
        let mut result = check_tool(&qemu);
        result.name = format!("{name}:{qemu}");
        checks.push(result);
    }
    if let Some(ref prefix) = target.ld_prefix {
        checks.push(check_prefix(name, prefix));
    }
    checks
}

/// Validate the health report, returning an error for the first required
/// check that failed.
pub fn validate(report: &HealthReport) -> Result<(), FixtureTestError> {
    match report.checks.iter().find(|c| c.required && !c.passed) {
        Some(first) => Err(FixtureTestError::ToolNotFound {
            name: first.name.clone(),
            hint: first.hint.clone().unwrap_or_else(|| "no hint".to_string()),
        }),
        None => Ok(()),
    }
}

// ── Individual checks ────────────────────────────────────────────────

fn check_tool(binary: &str) -> CheckResult {
    match which(binary) {
        Some(path) => CheckResult {
            name: binary.to_string(),
            passed: true,
            required: true,
            path: Some(path.to_string_lossy().to_string()),
            hint: None,
        },
        None => CheckResult {
            name: binary.to_string(),
            passed: false,
            required: true,
            path: None,
            hint: Some(install_hint(binary)),
        },
    }
}

fn check_prefix(target: &str, prefix: &Path) -> CheckResult {
    let name = format!("{target}:ld_prefix");
    if prefix.is_dir() {
        CheckResult {
            name,
            passed: true,
            required: false,
            path: Some(prefix.display().to_string()),
            hint: None,
        }
    } else {
        CheckResult {
            name,
            passed: false,
            required: false,
            path: None,
            hint: Some(format!(
                "Guest libraries not found at {}. Install the {target} cross libc (a libc6-*-cross package) or link the fixture statically.",
                prefix.display()
            )),
        }
    }
}

fn install_hint(binary: &str) -> String {
    match binary {
        "cargo" | "rustc" => "Install Rust: https://rustup.rs".to_string(),
        qemu if qemu.starts_with("qemu-") => {
            "Install qemu-user: apt install qemu-user (Linux) or download from qemu.org".to_string()
        }
        other => format!("{other} not found on PATH"),
    }
}

// ── Utility ──────────────────────────────────────────────────────────

/// Simple `which`-style lookup: search PATH for the given binary name.
pub fn which(binary: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    #[cfg(windows)]
    let extensions = ["", ".exe", ".cmd", ".bat"];
    #[cfg(not(windows))]
    let extensions = [""];

    for dir in std::env::split_paths(&path_var) {
        for ext in &extensions {
            let candidate = dir.join(format!("{binary}{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}
