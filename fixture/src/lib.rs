//! Basic fixture - arithmetic, bitwise, and branching test program
//!
//! A tiny deterministic program meant to be built for a foreign target and
//! run under qemu-user by a harness. The harness only observes two things:
//! one line on stdout and the exit status.
//!
//! The routine mutates an explicit [`FixtureState`] instead of globals, so a
//! caller (the `basic` binary, the harness `trace` command, or a test) owns
//! every value the routine touches.
//!
//! # Example
//!
//! ```rust
//! use basic_fixture::{Branch, FixtureState, ENTRY_VALUE};
//!
//! let mut state = FixtureState::default();
//! let mut out = Vec::new();
//! let trace = state.function_call(ENTRY_VALUE, &mut out).unwrap();
//!
//! assert_eq!(trace.branch, Branch::CallHelper);
//! assert_eq!(out, b"string\n");
//! ```

pub mod error;
pub mod state;

pub use error::FixtureError;
pub use state::{Branch, FixtureState, Trace};

/// Literal argument passed by the `basic` entry point.
pub const ENTRY_VALUE: i32 = 123;

/// Text printed by the helper routine.
pub const DEFAULT_TEXT: &str = "string";

/// Initial value of the first scalar.
pub const INITIAL_A: i32 = 2;

/// Initial value of the second scalar.
pub const INITIAL_COUNTER: i32 = 0x20000;

/// Number of cells in the fixture buffer.
pub const BUFFER_LEN: usize = 3;
