use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use crate::cli::BuildArgs;
use crate::error::FixtureTestError;
use crate::manifest::{FixtureManifest, TargetSpec};

/// Cargo package that holds the fixture.
pub const FIXTURE_PACKAGE: &str = "basic-fixture";

/// Name of the fixture binary.
pub const FIXTURE_BIN: &str = "basic";

/// Output returned on a successful build.
#[derive(Debug, Serialize)]
pub struct BuildOutput {
    pub target: String,
    pub triple: Option<String>,
    pub profile: String,
    /// Path to the built fixture binary.
    pub binary_path: PathBuf,
}

/// Build the fixture for a manifest target.
///
/// Runs `cargo build -p basic-fixture --bin basic` from the workspace root
/// with `--target` and `--release` as configured, then returns the
/// artifact path.
pub fn build(manifest: &FixtureManifest, args: BuildArgs) -> Result<serde_json::Value, FixtureTestError> {
    let target = manifest.target(&args.target)?;

    let cargo_args = cargo_build_args(target, args.release);
    log::info!("cargo {}", cargo_args.join(" "));

    let cargo_output = Command::new("cargo")
        .args(&cargo_args)
        .current_dir(workspace_root())
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FixtureTestError::ToolNotFound {
                    name: "cargo".to_string(),
                    hint: "Install Rust: https://rustup.rs".to_string(),
                }
            } else {
                FixtureTestError::Io(e)
            }
        })?;

    if !cargo_output.status.success() {
        let stderr = String::from_utf8_lossy(&cargo_output.stderr);
        return Err(FixtureTestError::BuildFailed {
            message: format!("cargo build failed:\n{stderr}"),
        });
    }

    let binary_path = artifact_path(target, args.release);
    if !binary_path.is_file() {
        return Err(FixtureTestError::BinaryNotFound { path: binary_path });
    }

    let output = BuildOutput {
        target: args.target,
        triple: target.triple.clone(),
        profile: profile(args.release).to_string(),
        binary_path,
    };
    Ok(serde_json::to_value(output)?)
}

/// Arguments passed to `cargo` to build the fixture for `target`.
pub fn cargo_build_args(target: &TargetSpec, release: bool) -> Vec<String> {
    let mut args: Vec<String> = ["build", "-p", FIXTURE_PACKAGE, "--bin", FIXTURE_BIN]
        .iter()
        .map(|s| s.to_string())
        .collect();
    if let Some(ref triple) = target.triple {
        args.extend(["--target".to_string(), triple.clone()]);
    }
    if release {
        args.push("--release".to_string());
    }
    args
}

/// Where cargo leaves the fixture binary for `target`.
///
/// `<target-dir>/[<triple>/]<profile>/basic`, with the target directory
/// taken from `CARGO_TARGET_DIR` when set. Relative directories are
/// anchored at the workspace root, where [`build`] runs cargo.
pub fn artifact_path(target: &TargetSpec, release: bool) -> PathBuf {
    let mut path = target_dir();
    if let Some(ref triple) = target.triple {
        path.push(triple);
    }
    path.push(profile(release));
    match target.triple {
        Some(_) => path.push(FIXTURE_BIN),
        None => path.push(format!("{FIXTURE_BIN}{}", std::env::consts::EXE_SUFFIX)),
    }
    path
}

/// Root of the workspace this tool was built in.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

fn target_dir() -> PathBuf {
    let dir = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("target"));
    workspace_root().join(dir)
}

fn profile(release: bool) -> &'static str {
    if release {
        "release"
    } else {
        "debug"
    }
}
