use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::LogOptions;
use crate::output::OutputFormat;

/// Build, run, and verify the basic fixture natively or under qemu-user.
#[derive(Parser, Debug)]
#[command(name = "fixture-test", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format for all subcommands.
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub output: OutputFormat,

    /// Manifest to use instead of the built-in one.
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogOptions,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the targets declared in the manifest.
    Targets,

    /// Run pre-flight checks for the toolchain and emulators.
    Health(HealthArgs),

    /// Build the fixture for a target.
    Build(BuildArgs),

    /// Run a built fixture and report its output and exit status.
    Run(RunArgs),

    /// Run a built fixture and check its output against the manifest.
    Verify(RunArgs),

    /// Run the fixture routine in-process and report every value it computes.
    Trace(TraceArgs),
}

// ── health ───────────────────────────────────────────────────────────

#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Only check this target (all targets by default).
    #[arg(long)]
    pub target: Option<String>,
}

// ── build ────────────────────────────────────────────────────────────

#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Manifest target name.
    #[arg(long, default_value = "native")]
    pub target: String,

    /// Build in release mode.
    #[arg(long, default_value_t = false)]
    pub release: bool,
}

// ── run / verify ─────────────────────────────────────────────────────

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Manifest target name.
    #[arg(long, default_value = "native")]
    pub target: String,

    /// Fixture binary (overrides the default build output path).
    #[arg(long)]
    pub binary: Option<PathBuf>,

    /// Use the release build output.
    #[arg(long, default_value_t = false)]
    pub release: bool,

    /// Watchdog timeout in seconds (overrides the target's timeout).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Make qemu wait for a debugger on this port.
    #[arg(long)]
    pub gdb_port: Option<u16>,
}

// ── trace ────────────────────────────────────────────────────────────

#[derive(clap::Args, Debug)]
pub struct TraceArgs {
    /// Argument passed to the routine.
    #[arg(long, default_value_t = basic_fixture::ENTRY_VALUE, allow_hyphen_values = true)]
    pub value: i32,
}
