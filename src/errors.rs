//! Error types shared across the relay.

use std::fmt::{Display, Formatter};
use std::io;

/// Shared relay result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Relay error enumeration covering every failure the relay reports.
///
/// The `Display` output of each variant is the diagnostic line printed on
/// standard output, so the wording is part of the observable contract.
#[derive(Debug)]
pub enum AppError {
    /// Command-line arguments were rejected; carries the usage text.
    Usage(String),
    /// The runtime that times pending reads could not be created.
    Runtime(io::Error),
    /// The named channel could not be opened.
    Connect(io::Error),
    /// Writing a line to the channel failed.
    Write(io::Error),
    /// A read from the channel failed as soon as it was issued.
    Read(io::Error),
    /// Standard input or output failed.
    Io(String),
}

impl AppError {
    /// Process exit code for this failure.
    ///
    /// Only failures before the relay loop starts are fatal; anything that
    /// merely stops the loop exits cleanly.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) | Self::Runtime(_) | Self::Connect(_) => 1,
            Self::Write(_) | Self::Read(_) | Self::Io(_) => 0,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usage(usage) => write!(f, "{usage}"),
            Self::Runtime(err) => write!(f, "Failed to create wait timer. Error: {}", OsCode(err)),
            Self::Connect(err) => {
                write!(f, "Failed to connect to the pipe. Error: {}", OsCode(err))
            }
            Self::Write(err) => write!(f, "Failed to write to the pipe. Error: {}", OsCode(err)),
            Self::Read(err) => write!(f, "Read from the pipe failed. Error: {}", OsCode(err)),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Runtime(err) | Self::Connect(err) | Self::Write(err) | Self::Read(err) => {
                Some(err)
            }
            Self::Usage(_) | Self::Io(_) => None,
        }
    }
}

/// Print `err` as a diagnostic line on `out`.
///
/// A closed or failing stream is logged and otherwise ignored.
pub fn write_diagnostic<W: io::Write>(mut out: W, err: &AppError) {
    if let Err(write_err) = writeln!(out, "{err}").and_then(|()| out.flush()) {
        tracing::debug!(%write_err, "diagnostic not written");
    }
}

/// Platform error code of an I/O error.
///
/// Prints the raw OS code when the platform reported one and the error kind
/// otherwise.
#[derive(Debug, Clone, Copy)]
pub struct OsCode<'a>(pub &'a io::Error);

impl Display for OsCode<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0.raw_os_error() {
            Some(code) => write!(f, "{code}"),
            None => write!(f, "{}", self.0.kind()),
        }
    }
}
