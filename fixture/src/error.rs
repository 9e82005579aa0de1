/// Errors produced by the fixture routine.
///
/// None of these occur for the literal entry value on a fresh state; they
/// cover inputs where the arithmetic would otherwise be undefined.
#[derive(thiserror::Error, Debug)]
pub enum FixtureError {
    #[error("division overflow: {value} / {divisor}")]
    DivisionOverflow { value: i32, divisor: i32 },

    #[error("shift amount {amount} out of range for a 32-bit counter")]
    ShiftOutOfRange { amount: i32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
