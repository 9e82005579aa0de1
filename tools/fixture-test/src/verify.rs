//! Verification engine.
//!
//! Evaluates a finished run against the manifest's `[expect]` section and
//! reports per-check pass/fail results.

use std::path::Path;

use regex::Regex;
use serde::Serialize;

use crate::cli::RunArgs;
use crate::error::FixtureTestError;
use crate::exec::{self, RunOutput};
use crate::manifest::{CheckExpectation, Expectations, FixtureManifest, OutputCheck};

// ── Verification output ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
}

/// Result of evaluating a single check against a run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub expected: String,
    /// What was observed, for checks that compare values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl CheckResult {
    fn new(name: &str, pass: bool, expected: String, actual: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            status: if pass { CheckStatus::Pass } else { CheckStatus::Fail },
            expected,
            actual,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

/// Full verification output for one target.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyOutput {
    pub target: String,
    pub timestamp: String,
    pub manifest_path: String,
    pub overall_pass: bool,
    pub pass_count: usize,
    pub fail_count: usize,
    pub checks: Vec<CheckResult>,
    pub run: RunOutput,
}

// ── Handler ──────────────────────────────────────────────────────────

/// `verify --target <name>` handler.
///
/// On failure the report travels inside the error, so the caller sees which
/// checks failed in the same output object.
pub fn verify(
    manifest: &FixtureManifest,
    manifest_path: Option<&Path>,
    args: RunArgs,
) -> Result<serde_json::Value, FixtureTestError> {
    let run = exec::execute(manifest, &args)?;
    let checks = evaluate(&manifest.expect, &run)?;

    let fail_count = checks.iter().filter(|c| !c.passed()).count();
    let output = VerifyOutput {
        target: args.target,
        timestamp: chrono::Utc::now().to_rfc3339(),
        manifest_path: manifest_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<built-in>".to_string()),
        overall_pass: fail_count == 0,
        pass_count: checks.len() - fail_count,
        fail_count,
        checks,
        run,
    };

    let report = serde_json::to_value(output)?;
    if fail_count == 0 {
        Ok(report)
    } else {
        Err(FixtureTestError::VerificationFailed { fail_count, report })
    }
}

// ── Evaluation ───────────────────────────────────────────────────────

/// Evaluate every expectation against a finished run.
///
/// Order: completion, exit code, exact stdout (when configured), then each
/// pattern check in manifest order.
pub fn evaluate(expect: &Expectations, run: &RunOutput) -> Result<Vec<CheckResult>, FixtureTestError> {
    let mut results = Vec::with_capacity(expect.checks.len() + 3);

    results.push(CheckResult::new(
        "completed",
        !run.timed_out,
        "exit before deadline".to_string(),
        run.timed_out.then(|| format!("killed at {}", run.deadline)),
    ));

    results.push(CheckResult::new(
        "exit_code",
        run.exit_code == Some(expect.exit_code),
        expect.exit_code.to_string(),
        Some(describe_exit(run)),
    ));

    if let Some(ref lines) = expect.stdout {
        results.push(CheckResult::new(
            "stdout",
            &run.stdout == lines,
            format!("{lines:?}"),
            Some(format!("{:?}", run.stdout)),
        ));
    }

    let content = run.stdout.join("\n");
    for check in &expect.checks {
        results.push(evaluate_check(check, &content)?);
    }

    Ok(results)
}

/// Evaluate a single pattern check against output content.
pub fn evaluate_check(check: &OutputCheck, content: &str) -> Result<CheckResult, FixtureTestError> {
    let found = pattern_matches(content, &check.pattern, check.regex)?;

    let pass = match check.expect {
        CheckExpectation::Present => found,
        CheckExpectation::Absent => !found,
    };

    Ok(CheckResult::new(
        &check.label,
        pass,
        format!("{} {:?}", check.expect, check.pattern),
        None,
    ))
}

/// Check whether a pattern matches any line of the content.
///
/// - When `is_regex` is false, performs a literal substring search.
/// - When `is_regex` is true, compiles the pattern as a regex.
pub fn pattern_matches(content: &str, pattern: &str, is_regex: bool) -> Result<bool, FixtureTestError> {
    if is_regex {
        let re = Regex::new(pattern).map_err(|e| {
            FixtureTestError::ManifestParseError(format!("invalid regex pattern '{pattern}': {e}"))
        })?;
        Ok(content.lines().any(|line| re.is_match(line)))
    } else {
        Ok(content.lines().any(|line| line.contains(pattern)))
    }
}

fn describe_exit(run: &RunOutput) -> String {
    match (run.exit_code, run.signal) {
        (Some(code), _) => code.to_string(),
        (None, Some(signal)) => format!("signal {signal}"),
        (None, None) => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_with(stdout: &[&str], exit_code: Option<i32>) -> RunOutput {
        RunOutput {
            target: "native".to_string(),
            command: vec!["basic".to_string()],
            exit_code,
            signal: None,
            stdout: stdout.iter().map(|s| s.to_string()).collect(),
            stderr: Vec::new(),
            timed_out: false,
            started_at: "2024-01-15T10:30:00+00:00".to_string(),
            deadline: "2024-01-15T10:30:30+00:00".to_string(),
            duration_ms: 3,
        }
    }

    fn basic_expect() -> Expectations {
        crate::manifest::load(None).unwrap().expect
    }

    #[test]
    fn literal_pattern_match() {
        let content = "string\nsecond line";
        assert!(pattern_matches(content, "string", false).unwrap());
        assert!(pattern_matches(content, "second", false).unwrap());
        assert!(!pattern_matches(content, "MISSING", false).unwrap());
    }

    #[test]
    fn regex_pattern_match() {
        assert!(pattern_matches("str1ng", "^str.ng$", true).unwrap());
        assert!(!pattern_matches("strong string", "^string$", true).unwrap());
    }

    #[test]
    fn invalid_regex_returns_error() {
        assert!(pattern_matches("content", "[invalid", true).is_err());
    }

    #[test]
    fn fixture_output_passes_default_expectations() {
        let results = evaluate(&basic_expect(), &run_with(&["string"], Some(0))).unwrap();
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(CheckResult::passed), "{results:?}");
    }

    #[test]
    fn extra_line_fails_exact_stdout_only() {
        let results = evaluate(&basic_expect(), &run_with(&["string", "extra"], Some(0))).unwrap();
        let failed: Vec<&str> = results
            .iter()
            .filter(|r| !r.passed())
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(failed, ["stdout"]);
    }

    #[test]
    fn wrong_exit_code_fails() {
        let results = evaluate(&basic_expect(), &run_with(&["string"], Some(1))).unwrap();
        let exit = results.iter().find(|r| r.name == "exit_code").unwrap();
        assert!(!exit.passed());
        assert_eq!(exit.actual.as_deref(), Some("1"));
    }

    #[test]
    fn timed_out_run_fails_completion() {
        let mut run = run_with(&[], None);
        run.timed_out = true;
        run.signal = Some(9);
        let results = evaluate(&basic_expect(), &run).unwrap();
        assert!(!results[0].passed());
        assert_eq!(results[1].actual.as_deref(), Some("signal 9"));
    }

    #[test]
    fn panic_text_fails_absent_check() {
        let results = evaluate(
            &basic_expect(),
            &run_with(&["thread 'main' panicked at src/main.rs"], Some(101)),
        )
        .unwrap();
        let no_panic = results.iter().find(|r| r.name == "No panic").unwrap();
        assert!(!no_panic.passed());
    }

    #[test]
    fn stdout_check_skipped_when_not_configured() {
        let expect = Expectations::default();
        let results = evaluate(&expect, &run_with(&["anything"], Some(0))).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(CheckResult::passed));
    }

    #[test]
    fn check_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&CheckStatus::Fail).unwrap(), "\"fail\"");
    }
}
