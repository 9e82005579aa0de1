//! fixture-test: build, run, and verify the basic fixture.
//!
//! Targets come from a TOML manifest. Emulated targets run under
//! `qemu-<arch>` with an optional `-L` library prefix; native targets run
//! directly. Every run is bounded by a watchdog timeout.

pub mod build;
pub mod cli;
pub mod error;
pub mod exec;
pub mod health;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod qemu;
pub mod targets;
pub mod trace;
pub mod verify;
pub mod watchdog;
