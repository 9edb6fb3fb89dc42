//! Run mode detection.
//!
//! Decides once, at startup, whether the process was launched from an
//! interactive terminal or by a service manager.
//!
//! # Rules
//! - `NOTIFY_SOCKET` set and non-empty → managed (the manager expects status)
//! - `INVOCATION_ID` set and stdin is not a terminal → managed
//! - anything else → interactive

use std::env::VarError;
use std::fmt;
use std::io::IsTerminal;

use thiserror::Error;

pub const NOTIFY_SOCKET: &str = "NOTIFY_SOCKET";
pub const INVOCATION_ID: &str = "INVOCATION_ID";

/// How the process was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Interactive,
    Managed,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Interactive => f.write_str("interactive"),
            RunMode::Managed => f.write_str("managed"),
        }
    }
}

/// The platform query failed; the mode is unknown.
#[derive(Debug, Error)]
#[error("cannot read {variable}: {source}")]
pub struct ModeError {
    pub variable: &'static str,
    #[source]
    pub source: VarError,
}

/// Source of the facts mode detection depends on.
pub trait ModeProbe {
    /// `Ok(None)` when the variable is absent.
    fn var(&self, name: &'static str) -> Result<Option<String>, VarError>;

    fn stdin_is_terminal(&self) -> bool;
}

/// Probe backed by the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl ModeProbe for SystemProbe {
    fn var(&self, name: &'static str) -> Result<Option<String>, VarError> {
        match std::env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn stdin_is_terminal(&self) -> bool {
        std::io::stdin().is_terminal()
    }
}

/// Detect the mode of the current process.
pub fn detect() -> Result<RunMode, ModeError> {
    detect_with(&SystemProbe)
}

pub fn detect_with(probe: &impl ModeProbe) -> Result<RunMode, ModeError> {
    let read = |variable| {
        probe
            .var(variable)
            .map_err(|source| ModeError { variable, source })
    };

    if read(NOTIFY_SOCKET)?.is_some_and(|v| !v.is_empty()) {
        return Ok(RunMode::Managed);
    }

    if read(INVOCATION_ID)?.is_some() && !probe.stdin_is_terminal() {
        return Ok(RunMode::Managed);
    }

    Ok(RunMode::Interactive)
}
