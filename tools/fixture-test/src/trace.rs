//! `trace` handler: runs the fixture routine in-process.

use serde::Serialize;

use basic_fixture::{FixtureState, Trace};

use crate::error::FixtureTestError;
use crate::exec::to_lines;

#[derive(Serialize, Debug)]
pub struct TraceOutput {
    pub trace: Trace,
    /// Lines the helper printed.
    pub output: Vec<String>,
}

/// Run the routine on a fresh state with `value`.
pub fn trace(value: i32) -> Result<serde_json::Value, FixtureTestError> {
    Ok(serde_json::to_value(run(value)?)?)
}

pub fn run(value: i32) -> Result<TraceOutput, FixtureTestError> {
    let mut state = FixtureState::default();
    let mut captured = Vec::new();
    let trace = state.function_call(value, &mut captured)?;
    log::debug!("trace for {value}: branch {}", trace.branch);
    Ok(TraceOutput {
        trace,
        output: to_lines(&captured),
    })
}
