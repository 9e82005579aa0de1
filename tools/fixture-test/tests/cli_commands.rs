//! Runs the `fixture-test` binary for the subcommands that need no
//! cross toolchain or emulator.

use std::process::Command;

fn fixture_test(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_fixture-test"))
        .args(args)
        .env_remove("FIXTURE_TEST_LOG")
        .output()
        .expect("failed to spawn fixture-test")
}

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1, "expected one JSON line, got: {stdout}");
    serde_json::from_str(&stdout).unwrap()
}

#[test]
fn trace_reports_helper_branch() {
    let output = fixture_test(&["trace", "--output", "json"]);
    assert!(output.status.success());
    let value = json_stdout(&output);
    assert_eq!(value["trace"]["input"], 123);
    assert_eq!(value["trace"]["branch"], "call-helper");
    assert_eq!(value["output"], serde_json::json!(["string"]));
}

#[test]
fn targets_lists_builtin_manifest() {
    let output = fixture_test(&["targets", "--output", "json"]);
    assert!(output.status.success());
    let value = json_stdout(&output);
    assert_eq!(value["targets"].as_array().unwrap().len(), 6);
}

#[test]
fn unknown_target_exits_2_with_json_error() {
    let output = fixture_test(&["run", "--target", "sparc", "--output", "json"]);
    assert_eq!(output.status.code(), Some(2));
    let value = json_stdout(&output);
    assert_eq!(value["exit_code"], 2);
    assert!(value["error"].as_str().unwrap().contains("sparc"));
}

#[test]
fn missing_manifest_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let output = fixture_test(&["targets", "--manifest", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("manifest file not found"));
}

#[test]
fn custom_manifest_replaces_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.toml");
    std::fs::write(
        &path,
        "[metadata]\nname = \"one\"\nversion = \"0.1\"\n\n[targets.native]\n",
    )
    .unwrap();
    let output = fixture_test(&["targets", "--output", "json", "--manifest", path.to_str().unwrap()]);
    assert!(output.status.success());
    let value = json_stdout(&output);
    assert_eq!(value["manifest"], "one 0.1");
    assert_eq!(value["targets"][0]["name"], "native");
}

/// Write an executable shell script standing in for the fixture binary.
#[cfg(unix)]
fn stand_in(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("basic");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn failed_verify_prints_one_json_object() {
    let dir = tempfile::tempdir().unwrap();
    let binary = stand_in(dir.path(), "exit 0");
    let output = fixture_test(&["verify", "--binary", binary.to_str().unwrap(), "--output", "json"]);
    assert_eq!(output.status.code(), Some(1));
    let value = json_stdout(&output);
    assert_eq!(value["overall_pass"], false);
    assert_eq!(value["fail_count"], 2);
    assert_eq!(value["exit_code"], 1);
    assert!(value["error"].as_str().unwrap().starts_with("Verification failed"));
}

#[cfg(unix)]
#[test]
fn failed_verify_in_human_mode_reports_on_stdout_and_errors_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let binary = stand_in(dir.path(), "echo wrong");
    let output = fixture_test(&["verify", "--binary", binary.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stdout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stdout["run"]["stdout"], serde_json::json!(["wrong"]));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error: Verification failed"));
}

#[cfg(unix)]
#[test]
fn verify_passes_for_fixture_output() {
    let dir = tempfile::tempdir().unwrap();
    let binary = stand_in(dir.path(), "echo string");
    let output = fixture_test(&["verify", "--binary", binary.to_str().unwrap(), "--output", "json"]);
    assert!(output.status.success());
    let value = json_stdout(&output);
    assert_eq!(value["overall_pass"], true);
    assert_eq!(value["fail_count"], 0);
    assert_eq!(value["run"]["stdout"], serde_json::json!(["string"]));
    assert!(value.get("error").is_none());
}

#[cfg(unix)]
#[test]
fn default_binary_path_does_not_depend_on_cwd() {
    let cwd = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_fixture-test"))
        .args(["run", "--output", "json"])
        .current_dir(cwd.path())
        .env_remove("FIXTURE_TEST_LOG")
        .env_remove("CARGO_TARGET_DIR")
        .output()
        .unwrap();
    let value = json_stdout(&output);
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .unwrap();

    // Either the fixture was already built, or it is looked up under the
    // workspace target directory rather than under the temp cwd.
    match output.status.code() {
        Some(0) => {
            let program = std::path::Path::new(value["command"][0].as_str().unwrap());
            assert!(program.is_absolute());
        }
        Some(2) => {
            let message = value["error"].as_str().unwrap();
            let path = message.trim_start_matches("Fixture binary not found: ");
            let path = std::path::Path::new(path);
            assert!(path.is_absolute(), "{message}");
            assert!(!path.starts_with(cwd.path()), "{message}");
            assert!(path.ends_with("target/debug/basic"), "{message}");
            assert!(path.starts_with(root.join("target")), "{message}");
        }
        other => panic!("unexpected exit {other:?}: {value}"),
    }
}
