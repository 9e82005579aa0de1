//! Watchdog for fixture runs.
//!
//! The child is polled until it exits or its deadline passes. A child that
//! outlives the deadline is killed and reported as timed out. Output pipes
//! are drained on reader threads so a chatty child cannot block on a full
//! pipe while the watchdog waits.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Interval between `try_wait` polls.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Everything observed about one finished (or killed) child.
#[derive(Debug)]
pub struct Completed {
    /// Exit code, `None` when the child was ended by a signal.
    pub exit_code: Option<i32>,
    /// Terminating signal on Unix.
    pub signal: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub timed_out: bool,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// Compute the watchdog deadline from a start timestamp and timeout.
pub fn compute_deadline(started_at: DateTime<Utc>, timeout_seconds: u64) -> DateTime<Utc> {
    i64::try_from(timeout_seconds)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .and_then(|timeout| started_at.checked_add_signed(timeout))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Spawn `cmd` with piped output and wait at most `timeout` for it.
///
/// A timeout too large to represent as an `Instant` means no deadline.
pub fn run_with_deadline(cmd: &mut Command, timeout: Duration) -> io::Result<Completed> {
    let started_at = Utc::now();
    let start = Instant::now();

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    let deadline = start.checked_add(timeout);
    if deadline.is_none() {
        log::debug!("timeout {timeout:?} is past the clock's range, waiting without a deadline");
    }
    let (status, timed_out) = wait_until(&mut child, deadline)?;
    let elapsed = start.elapsed();

    let stdout = join(stdout_reader);
    let stderr = join(stderr_reader);

    Ok(Completed {
        exit_code: status.code(),
        signal: signal_of(&status),
        stdout,
        stderr,
        timed_out,
        started_at,
        elapsed,
    })
}

/// Poll the child until it exits or `deadline` passes, killing it on expiry.
fn wait_until(child: &mut Child, deadline: Option<Instant>) -> io::Result<(ExitStatus, bool)> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status, false));
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            log::warn!("watchdog deadline passed, killing pid {}", child.id());
            // The child may exit between the poll and the kill.
            let _ = child.kill();
            return Ok((child.wait()?, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            if let Err(e) = pipe.read_to_end(&mut buf) {
                log::debug!("reading child output failed after {} bytes: {e}", buf.len());
            }
            buf
        })
    })
}

fn join(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

#[cfg(unix)]
fn signal_of(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: &ExitStatus) -> Option<i32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_deadline_adds_timeout() {
        let started = DateTime::parse_from_rfc3339("2024-01-15T10:30:00+00:00")
            .unwrap()
            .with_timezone(&Utc);
        let deadline = compute_deadline(started, 120);
        assert!(deadline.to_rfc3339().contains("10:32:00"));
    }

    #[test]
    fn compute_deadline_saturates() {
        let deadline = compute_deadline(Utc::now(), u64::MAX);
        assert_eq!(deadline, DateTime::<Utc>::MAX_UTC);
    }

    #[cfg(unix)]
    #[test]
    fn unrepresentable_timeout_waits_without_deadline() {
        let mut cmd = Command::new("true");
        let done = run_with_deadline(&mut cmd, Duration::from_secs(u64::MAX)).unwrap();
        assert!(!done.timed_out);
        assert_eq!(done.exit_code, Some(0));
    }

    #[cfg(unix)]
    #[test]
    fn captures_output_and_exit_code() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo out; echo err >&2; exit 3"]);
        let done = run_with_deadline(&mut cmd, Duration::from_secs(10)).unwrap();
        assert_eq!(done.exit_code, Some(3));
        assert_eq!(done.stdout, b"out\n");
        assert_eq!(done.stderr, b"err\n");
        assert!(!done.timed_out);
    }

    #[cfg(unix)]
    #[test]
    fn kills_child_past_deadline() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        let done = run_with_deadline(&mut cmd, Duration::from_millis(100)).unwrap();
        assert!(done.timed_out);
        assert_eq!(done.exit_code, None);
        assert_eq!(done.signal, Some(9));
        assert!(done.elapsed < Duration::from_secs(30));
    }

    #[test]
    fn missing_program_is_an_io_error() {
        let mut cmd = Command::new("definitely-not-a-real-binary-name");
        assert!(run_with_deadline(&mut cmd, Duration::from_secs(1)).is_err());
    }
}
