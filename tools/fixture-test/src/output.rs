use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

use crate::error::FixtureTestError;

/// Output format selection for all subcommands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object on stdout.
    Json,
    /// Human-readable summary on stdout.
    #[default]
    Human,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Human => write!(f, "human"),
        }
    }
}

/// Write a successful result to stdout.
pub fn emit<T: Serialize>(format: OutputFormat, value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    emit_to(&mut stdout.lock(), format, value)
}

/// Write a successful result to `out`.
///
/// - **Json**: a single JSON object on one line, no extraneous text.
/// - **Human**: indented JSON.
pub fn emit_to<W: Write, T: Serialize>(out: &mut W, format: OutputFormat, value: &T) -> io::Result<()> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string(value),
        OutputFormat::Human => serde_json::to_string_pretty(value),
    }
    .map_err(io::Error::other)?;
    writeln!(out, "{text}")
}

/// Write an error to stdout (JSON mode) or stderr (human mode).
///
/// An error that carries a report is still a single object in JSON mode:
/// the report's fields plus `error` and `exit_code`. In human mode the report
/// is printed to stdout and the message to stderr.
pub fn emit_error(format: OutputFormat, err: &FixtureTestError) {
    match format {
        OutputFormat::Json => {
            // JSON errors go to stdout so the caller always gets valid JSON on stdout.
            println!("{}", error_json(err.code(), &err.to_string(), err.report()));
        }
        OutputFormat::Human => {
            if let Some(report) = err.report() {
                if let Ok(text) = serde_json::to_string_pretty(report) {
                    println!("{text}");
                }
            }
            eprintln!("error: {err}");
        }
    }
}

fn error_json(exit_code: u8, message: &str, report: Option<&serde_json::Value>) -> String {
    let mut obj = match report {
        Some(serde_json::Value::Object(fields)) => fields.clone(),
        _ => serde_json::Map::new(),
    };
    obj.insert("error".to_string(), message.into());
    obj.insert("exit_code".to_string(), exit_code.into());
    serde_json::to_string(&obj).unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}
