//! Relay configuration resolved from the command line.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::cli::Cli;

/// Reply wait applied when no timeout argument is given.
pub const DEFAULT_TIMEOUT_MS: u32 = 50;

/// Capacity of the buffer shared by outgoing lines and incoming replies.
///
/// One byte is held back on the input side, so a single line chunk carries
/// at most `LINE_BUFFER_CAPACITY - 1` bytes.
pub const LINE_BUFFER_CAPACITY: usize = 1024;

/// Upper bound on how long the relay waits for a pending reply.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum WaitBound {
    /// Give up after this many milliseconds.
    Millis(u32),
    /// Wait until the reply arrives.
    Infinite,
}

impl WaitBound {
    /// Millisecond value that means "no deadline".
    pub const INFINITE_MS: u32 = u32::MAX;

    /// Interpret a raw millisecond count; `u32::MAX` waits forever.
    #[must_use]
    pub fn from_millis(ms: u32) -> Self {
        if ms == Self::INFINITE_MS {
            Self::Infinite
        } else {
            Self::Millis(ms)
        }
    }

    /// Deadline length, or `None` for an unbounded wait.
    #[must_use]
    pub fn as_duration(self) -> Option<Duration> {
        match self {
            Self::Millis(ms) => Some(Duration::from_millis(u64::from(ms))),
            Self::Infinite => None,
        }
    }
}

impl Default for WaitBound {
    fn default() -> Self {
        Self::Millis(DEFAULT_TIMEOUT_MS)
    }
}

impl Display for WaitBound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Millis(ms) => write!(f, "{ms}ms"),
            Self::Infinite => write!(f, "infinite"),
        }
    }
}

/// Settings fixed for the lifetime of one relay process.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RelayConfig {
    /// Logical pipe name, resolved to a platform address on connect.
    pub pipe_name: String,
    /// Bound applied to every pending reply.
    pub wait: WaitBound,
}

impl RelayConfig {
    /// Build a configuration for `pipe_name` with the default wait.
    #[must_use]
    pub fn new(pipe_name: impl Into<String>) -> Self {
        Self {
            pipe_name: pipe_name.into(),
            wait: WaitBound::default(),
        }
    }

    /// Override the reply wait.
    #[must_use]
    pub fn with_wait(mut self, wait: WaitBound) -> Self {
        self.wait = wait;
        self
    }

    /// Resolve the configuration from parsed arguments.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self::new(cli.pipe_name.clone()).with_wait(cli.timeout_ms.unwrap_or_default())
    }
}
