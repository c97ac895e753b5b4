//! Configuration for a single wait
//!
//! A [`Configuration`] is built once from the command line and never changes
//! afterwards. Validation happens eagerly in [`Configuration::new`] so the
//! polling code can rely on a known mode and a positive timeout.

use crate::error::WaitError;
use std::fmt;
use std::str::FromStr;

/// Default wait timeout in seconds
pub fn default_timeout() -> u64 {
    3600
}

/// Availability state to wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Wait for a TCP port to accept connections
    #[default]
    WaitForUp,
    /// Wait for a host to stop answering echo requests
    WaitForDown,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::WaitForUp => "wait-for-up",
            Mode::WaitForDown => "wait-for-down",
        }
    }
}

impl FromStr for Mode {
    type Err = WaitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wait-for-up" => Ok(Mode::WaitForUp),
            "wait-for-down" => Ok(Mode::WaitForDown),
            other => Err(WaitError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, immutable settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    target: String,
    timeout_secs: u64,
    mode: Mode,
    quiet: bool,
    verbose: bool,
    command: Vec<String>,
}

impl Configuration {
    /// Build a configuration, rejecting a zero timeout.
    pub fn new(
        target: impl Into<String>,
        timeout_secs: u64,
        mode: Mode,
        quiet: bool,
        verbose: bool,
        command: Vec<String>,
    ) -> Result<Self, WaitError> {
        if timeout_secs == 0 {
            return Err(WaitError::InvalidTimeout(timeout_secs));
        }

        Ok(Self {
            target: target.into(),
            timeout_secs,
            mode,
            quiet,
            verbose,
            command,
        })
    }

    /// Raw target as given on the command line (`host:port` or `host`)
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Follow-up command and its arguments, possibly empty
    pub fn command(&self) -> &[String] {
        &self.command
    }
}
