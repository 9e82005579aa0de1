//! Basic fixture entry point
//!
//! Runs the routine once with the literal entry value. The only stdout
//! output is the helper's line; logging goes to stderr and is off unless
//! `RUST_LOG` enables it.

use std::io;
use std::process::ExitCode;

use basic_fixture::{FixtureState, ENTRY_VALUE};

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let mut state = FixtureState::default();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match state.function_call(ENTRY_VALUE, &mut out) {
        Ok(trace) => {
            log::info!(
                "branch={} value={} a={} counter={:#x}",
                trace.branch,
                trace.value,
                trace.a,
                trace.counter
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
