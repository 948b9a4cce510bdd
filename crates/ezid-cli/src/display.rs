//! Console reporting for command outcomes.

use std::fmt;
use std::process::ExitCode;

use ezid_plugin::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Warning,
    Error,
    Success,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("WARNING"),
            Self::Error => f.write_str("ERROR"),
            Self::Success => f.write_str("SUCCESS"),
        }
    }
}

/// Pick the level and line to show for an outcome. Disabled and failed
/// outcomes show the adapter's message; success shows `success_msg`.
pub fn render_outcome(outcome: &Outcome, success_msg: &str) -> (Level, String) {
    if !outcome.enabled() {
        (Level::Warning, outcome.to_string())
    } else if !outcome.success() {
        (Level::Error, outcome.to_string())
    } else {
        (Level::Success, format!("✅ {success_msg}"))
    }
}

/// Print the outcome line and map it to the process exit code. Only a
/// failed attempt exits non-zero; "not enabled" is informational.
pub fn report(outcome: &Outcome, success_msg: &str) -> ExitCode {
    let (level, line) = render_outcome(outcome, success_msg);
    println!("{level}: {line}");
    match level {
        Level::Error => ExitCode::FAILURE,
        Level::Warning | Level::Success => ExitCode::SUCCESS,
    }
}
