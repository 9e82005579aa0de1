//! `run` handler: launches a built fixture and captures what it printed.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use serde::Serialize;

use crate::build;
use crate::cli::RunArgs;
use crate::error::FixtureTestError;
use crate::health::{self, HealthReport};
use crate::manifest::FixtureManifest;
use crate::qemu;
use crate::watchdog;

/// Observed result of one fixture run.
#[derive(Serialize, Debug, Clone)]
pub struct RunOutput {
    pub target: String,
    /// Full command line, program first.
    pub command: Vec<String>,
    pub exit_code: Option<i32>,
    pub signal: Option<i32>,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub timed_out: bool,
    pub started_at: String,
    pub deadline: String,
    pub duration_ms: u64,
}

/// `run --target <name>` handler.
pub fn run(manifest: &FixtureManifest, args: RunArgs) -> Result<serde_json::Value, FixtureTestError> {
    let output = execute(manifest, &args)?;
    if output.timed_out {
        let seconds = effective_timeout(manifest, &args)?;
        return Err(FixtureTestError::RunTimeout { seconds });
    }
    Ok(serde_json::to_value(output)?)
}

/// Launch the fixture for `args.target` and wait for it under the watchdog.
pub fn execute(manifest: &FixtureManifest, args: &RunArgs) -> Result<RunOutput, FixtureTestError> {
    let target = manifest.target(&args.target)?;
    let binary = resolve_binary(manifest, args)?;

    health::validate(&HealthReport::from_checks(health::check_target(&args.target, target)))?;
    if target.qemu.is_none() && args.gdb_port.is_some() {
        log::warn!("--gdb-port only applies to qemu targets; ignoring it for {}", args.target);
    }

    let argv = qemu::build_run_command(target, &binary, args.gdb_port);
    let timeout = effective_timeout(manifest, args)?;
    log::info!("running {} (timeout {timeout}s)", argv.join(" "));

    let mut cmd = Command::new(&argv[0]);
    cmd.args(&argv[1..]);
    let done = watchdog::run_with_deadline(&mut cmd, Duration::from_secs(timeout))?;

    log::debug!(
        "{} exited with {:?} after {:?}",
        args.target,
        done.exit_code,
        done.elapsed
    );

    Ok(RunOutput {
        target: args.target.clone(),
        command: argv,
        exit_code: done.exit_code,
        signal: done.signal,
        stdout: to_lines(&done.stdout),
        stderr: to_lines(&done.stderr),
        timed_out: done.timed_out,
        started_at: done.started_at.to_rfc3339(),
        deadline: watchdog::compute_deadline(done.started_at, timeout).to_rfc3339(),
        duration_ms: u64::try_from(done.elapsed.as_millis()).unwrap_or(u64::MAX),
    })
}

/// The fixture binary to run: `--binary` when given, else the build output.
pub fn resolve_binary(manifest: &FixtureManifest, args: &RunArgs) -> Result<PathBuf, FixtureTestError> {
    let target = manifest.target(&args.target)?;
    let path = args
        .binary
        .clone()
        .unwrap_or_else(|| build::artifact_path(target, args.release));
    if path.is_file() {
        Ok(path)
    } else {
        Err(FixtureTestError::BinaryNotFound { path })
    }
}

fn effective_timeout(manifest: &FixtureManifest, args: &RunArgs) -> Result<u64, FixtureTestError> {
    let target = manifest.target(&args.target)?;
    Ok(args.timeout.unwrap_or_else(|| target.timeout()))
}

/// Split captured output into lines, dropping the trailing newline.
pub fn to_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::to_string)
        .collect()
}
