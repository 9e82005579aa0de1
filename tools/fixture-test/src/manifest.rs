//! Fixture manifest parsing.
//!
//! A TOML manifest names the targets the fixture is built for and the
//! output every run of it must produce. A default manifest ships inside
//! the binary; `--manifest` replaces it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::FixtureTestError;

/// Built-in manifest used when `--manifest` is not given.
pub const DEFAULT_MANIFEST: &str = include_str!("../fixture.toml");

/// Default per-run timeout in seconds.
pub const DEFAULT_TIMEOUT: u64 = 30;

// ── Data models ──────────────────────────────────────────────────────

/// Top-level manifest loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FixtureManifest {
    pub metadata: ManifestMetadata,
    #[serde(default)]
    pub expect: Expectations,
    pub targets: BTreeMap<String, TargetSpec>,
}

/// Manifest-level metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestMetadata {
    pub name: String,
    pub version: String,
}

/// Output every run must produce.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Expectations {
    #[serde(default)]
    pub exit_code: i32,
    /// Exact stdout lines, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<Vec<String>>,
    #[serde(default)]
    pub checks: Vec<OutputCheck>,
}

/// A pattern evaluated line by line against stdout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputCheck {
    pub pattern: String,
    pub label: String,
    #[serde(default)]
    pub regex: bool,
    #[serde(default = "default_expect")]
    pub expect: CheckExpectation,
}

/// Whether a pattern is expected to be present or absent in the output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CheckExpectation {
    #[serde(rename = "present")]
    Present,
    #[serde(rename = "absent")]
    Absent,
}

impl std::fmt::Display for CheckExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckExpectation::Present => write!(f, "present"),
            CheckExpectation::Absent => write!(f, "absent"),
        }
    }
}

fn default_expect() -> CheckExpectation {
    CheckExpectation::Present
}

/// How to build and launch the fixture for one architecture.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TargetSpec {
    /// Rust target triple; `None` builds for the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triple: Option<String>,
    /// qemu-user suffix (`aarch64` runs `qemu-aarch64`); `None` runs natively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qemu: Option<String>,
    /// Library prefix passed to qemu as `-L`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ld_prefix: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl TargetSpec {
    /// Name of the qemu-user binary, if this target runs under emulation.
    pub fn qemu_binary(&self) -> Option<String> {
        self.qemu.as_ref().map(|suffix| format!("qemu-{suffix}"))
    }

    pub fn timeout(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}

impl FixtureManifest {
    /// Look up a target by name.
    pub fn target(&self, name: &str) -> Result<&TargetSpec, FixtureTestError> {
        self.targets
            .get(name)
            .ok_or_else(|| FixtureTestError::UnknownTarget {
                name: name.to_string(),
            })
    }
}

// ── Parsing ──────────────────────────────────────────────────────────

/// Load the manifest at `path`, or the built-in one when `path` is `None`.
pub fn load(path: Option<&Path>) -> Result<FixtureManifest, FixtureTestError> {
    match path {
        Some(path) => parse_manifest(path),
        None => parse_manifest_str(DEFAULT_MANIFEST),
    }
}

/// Parse a manifest from a TOML file path.
pub fn parse_manifest(path: &Path) -> Result<FixtureManifest, FixtureTestError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FixtureTestError::ManifestParseError(format!(
                "manifest file not found: {}",
                path.display()
            ))
        } else {
            FixtureTestError::Io(e)
        }
    })?;
    parse_manifest_str(&content)
}

/// Parse a manifest from a TOML string.
pub fn parse_manifest_str(content: &str) -> Result<FixtureManifest, FixtureTestError> {
    toml::from_str(content)
        .map_err(|e| FixtureTestError::ManifestParseError(format!("invalid TOML: {e}")))
}
