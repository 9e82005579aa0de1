use std::path::PathBuf;
use std::process::ExitCode;

/// All errors produced by fixture-test.
///
/// Variants are split into two categories:
/// - **Infrastructure errors** (exit code 2): missing tools, bad manifest, I/O failures
/// - **Operational errors** (exit code 1): build, run, or verification failures
#[derive(thiserror::Error, Debug)]
pub enum FixtureTestError {
    // ── Infrastructure errors (exit code 2) ──────────────────────────

    #[error("Tool not found: {name}: {hint}")]
    ToolNotFound { name: String, hint: String },

    #[error("Fixture binary not found: {path}")]
    BinaryNotFound { path: PathBuf },

    #[error("Manifest parse error: {0}")]
    ManifestParseError(String),

    #[error("Unknown target: {name}")]
    UnknownTarget { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Operational errors (exit code 1) ─────────────────────────────

    #[error("Build failed: {message}")]
    BuildFailed { message: String },

    #[error("Run timed out after {seconds}s")]
    RunTimeout { seconds: u64 },

    /// Carries the full report so it is emitted once, alongside the error.
    #[error("Verification failed: {fail_count} checks failed")]
    VerificationFailed {
        fail_count: usize,
        report: serde_json::Value,
    },

    #[error("Fixture error: {0}")]
    Fixture(#[from] basic_fixture::FixtureError),
}

impl FixtureTestError {
    /// Numeric exit code for this error.
    ///
    /// - `2`: infrastructure error (missing prerequisite, bad config, I/O)
    /// - `1`: operational failure
    pub fn code(&self) -> u8 {
        match self {
            Self::ToolNotFound { .. }
            | Self::BinaryNotFound { .. }
            | Self::ManifestParseError(_)
            | Self::UnknownTarget { .. }
            | Self::Io(_)
            | Self::Json(_) => 2,

            Self::BuildFailed { .. }
            | Self::RunTimeout { .. }
            | Self::VerificationFailed { .. }
            | Self::Fixture(_) => 1,
        }
    }

    /// Report that accompanies the error on output, if any.
    pub fn report(&self) -> Option<&serde_json::Value> {
        match self {
            Self::VerificationFailed { report, .. } => Some(report),
            _ => None,
        }
    }

    /// Map each error variant to its process exit code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}
