//! Fixture state and the arithmetic/bitwise routine that mutates it.
//!
//! Numeric semantics are pinned to 32-bit signed integers: multiplication
//! and addition wrap, division truncates toward zero, and `>>` is an
//! arithmetic shift. Buffer cells are bytes widened to `i32` when read.

use std::io::Write;

use serde::Serialize;

use crate::error::FixtureError;
use crate::{BUFFER_LEN, DEFAULT_TEXT, INITIAL_A, INITIAL_COUNTER};

/// Which path the final comparison took.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Branch {
    /// `c > b` and `value <= c`: `c` was incremented.
    Increment,
    /// `c > b` and `value > c`: the helper printed and `value` was incremented.
    CallHelper,
    /// `c <= b`: neither path ran.
    Skipped,
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Branch::Increment => write!(f, "increment"),
            Branch::CallHelper => write!(f, "call-helper"),
            Branch::Skipped => write!(f, "skipped"),
        }
    }
}

/// Every intermediate and final value of one `function_call`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    /// Argument as passed in.
    pub input: i32,
    /// `a * input`.
    pub product: i32,
    /// `product / a` before the `+= 123`.
    pub quotient: i32,
    /// `a` after the routine.
    pub a: i32,
    /// `product % 7`.
    pub mod_number: i32,
    /// `strlen(text) - 2`, used as the shift amount.
    pub len: i32,
    /// `counter` after the shift/or/and/xor chain.
    pub counter: i32,
    /// Buffer contents after both fills.
    pub buffer: [u8; BUFFER_LEN],
    /// `buffer[1]` as read right after the ascending fill.
    pub b_read: i32,
    /// `buffer[1]` as read right after the descending fill.
    pub c_read: i32,
    /// `b_read` plus any branch increment.
    pub b: i32,
    /// `c_read` plus any branch increment.
    pub c: i32,
    /// The transformed value after the branch.
    pub value: i32,
    pub branch: Branch,
}

/// Explicit owner of the values the routine mutates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureState {
    pub a: i32,
    pub text: &'static str,
    pub buffer: [u8; BUFFER_LEN],
    pub counter: i32,
}

impl Default for FixtureState {
    fn default() -> Self {
        Self {
            a: INITIAL_A,
            text: DEFAULT_TEXT,
            buffer: [0; BUFFER_LEN],
            counter: INITIAL_COUNTER,
        }
    }
}

impl FixtureState {
    /// Create a state with the initial values of the fixture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the arithmetic, bitwise, fill, and branch sequence on `value`.
    ///
    /// Anything the helper prints goes to `out`. With a fresh state and
    /// [`crate::ENTRY_VALUE`] the helper branch is taken and exactly one
    /// line is written.
    pub fn function_call<W: Write>(
        &mut self,
        value: i32,
        out: &mut W,
    ) -> Result<Trace, FixtureError> {
        let input = value;

        // Math operations
        let mut value = self.a.wrapping_mul(value);
        let quotient = value
            .checked_div(self.a)
            .ok_or(FixtureError::DivisionOverflow {
                value,
                divisor: self.a,
            })?;
        self.a = quotient.wrapping_add(123);
        let product = value;

        let mod_number = value % 7;
        let len = c_strlen(self.text) - 2;
        log::debug!("product={product} a={} mod={mod_number} len={len}", self.a);

        let shift = u32::try_from(len)
            .ok()
            .filter(|n| *n < i32::BITS)
            .ok_or(FixtureError::ShiftOutOfRange { amount: len })?;

        self.counter >>= shift;
        self.counter |= mod_number;
        self.counter &= mod_number;
        self.counter ^= mod_number;
        log::debug!("counter={:#x}", self.counter);

        // Memory accesses
        for (i, cell) in self.buffer.iter_mut().enumerate() {
            *cell = i as u8;
        }
        let b_read = i32::from(self.buffer[1]);
        let mut b = b_read;

        for i in (1..self.buffer.len()).rev() {
            self.buffer[i] = (i + 1) as u8;
        }
        let c_read = i32::from(self.buffer[1]);
        let mut c = c_read;
        log::trace!("buffer={:?} b={b} c={c}", self.buffer);

        let branch = if c > b {
            b += 1;
            if value <= c {
                c += 1;
                Branch::Increment
            } else {
                self.other_function(out)?;
                value = value.wrapping_add(1);
                Branch::CallHelper
            }
        } else {
            Branch::Skipped
        };
        log::debug!("branch={branch} value={value}");

        Ok(Trace {
            input,
            product,
            quotient,
            a: self.a,
            mod_number,
            len,
            counter: self.counter,
            buffer: self.buffer,
            b_read,
            c_read,
            b,
            c,
            value,
            branch,
        })
    }

    /// Print the text followed by a newline, the way `puts` does.
    pub fn other_function<W: Write>(&self, out: &mut W) -> Result<(), FixtureError> {
        writeln!(out, "{}", c_str(self.text))?;
        out.flush()?;
        Ok(())
    }
}

/// The text up to its first NUL, matching what C string functions see.
fn c_str(text: &str) -> &str {
    match text.find('\0') {
        Some(end) => &text[..end],
        None => text,
    }
}

fn c_strlen(text: &str) -> i32 {
    i32::try_from(c_str(text).len()).unwrap_or(i32::MAX)
}
