//! `targets` handler: lists manifest targets.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::FixtureTestError;
use crate::manifest::FixtureManifest;

#[derive(Serialize, Debug)]
pub struct TargetEntry {
    pub name: String,
    pub triple: Option<String>,
    pub qemu: Option<String>,
    pub ld_prefix: Option<PathBuf>,
    pub timeout: u64,
}

#[derive(Serialize, Debug)]
pub struct TargetsOutput {
    pub manifest: String,
    pub targets: Vec<TargetEntry>,
}

pub fn list(manifest: &FixtureManifest) -> Result<serde_json::Value, FixtureTestError> {
    Ok(serde_json::to_value(entries(manifest))?)
}

pub fn entries(manifest: &FixtureManifest) -> TargetsOutput {
    let targets = manifest
        .targets
        .iter()
        .map(|(name, spec)| TargetEntry {
            name: name.clone(),
            triple: spec.triple.clone(),
            qemu: spec.qemu_binary(),
            ld_prefix: spec.ld_prefix.clone(),
            timeout: spec.timeout(),
        })
        .collect();

    TargetsOutput {
        manifest: format!("{} {}", manifest.metadata.name, manifest.metadata.version),
        targets,
    }
}
