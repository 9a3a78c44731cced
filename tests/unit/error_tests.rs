//! Unit tests for `AppError` diagnostics and exit codes.

use std::io;

use pipe_relay::errors::{write_diagnostic, OsCode};
use pipe_relay::AppError;

#[test]
fn connect_error_reports_platform_code() {
    let err = AppError::Connect(io::Error::from_raw_os_error(2));
    assert_eq!(err.to_string(), "Failed to connect to the pipe. Error: 2");
}

#[test]
fn write_error_reports_platform_code() {
    let err = AppError::Write(io::Error::from_raw_os_error(232));
    assert_eq!(err.to_string(), "Failed to write to the pipe. Error: 232");
}

#[test]
fn read_error_reports_platform_code() {
    let err = AppError::Read(io::Error::from_raw_os_error(109));
    assert_eq!(err.to_string(), "Read from the pipe failed. Error: 109");
}

#[test]
fn runtime_error_reports_platform_code() {
    let err = AppError::Runtime(io::Error::from_raw_os_error(12));
    assert_eq!(err.to_string(), "Failed to create wait timer. Error: 12");
}

#[test]
fn code_falls_back_to_error_kind() {
    let err = io::Error::new(io::ErrorKind::BrokenPipe, "peer went away");
    assert_eq!(OsCode(&err).to_string(), io::ErrorKind::BrokenPipe.to_string());
}

#[test]
fn setup_failures_exit_with_one() {
    assert_eq!(AppError::Usage("Usage: x".into()).exit_code(), 1);
    assert_eq!(AppError::Connect(io::Error::from_raw_os_error(2)).exit_code(), 1);
    assert_eq!(AppError::Runtime(io::Error::from_raw_os_error(12)).exit_code(), 1);
}

#[test]
fn loop_failures_exit_cleanly() {
    assert_eq!(AppError::Write(io::Error::from_raw_os_error(32)).exit_code(), 0);
    assert_eq!(AppError::Read(io::Error::from_raw_os_error(32)).exit_code(), 0);
    assert_eq!(AppError::Io("stdout closed".into()).exit_code(), 0);
}

#[test]
fn io_error_display_has_prefix() {
    let err = AppError::Io("stdout closed".into());
    assert_eq!(err.to_string(), "io: stdout closed");
}

#[test]
fn channel_errors_expose_source() {
    use std::error::Error as _;

    let err = AppError::Write(io::Error::from_raw_os_error(32));
    assert!(err.source().is_some());
    assert!(AppError::Usage("Usage: x".into()).source().is_none());
}

/// Writer standing in for a closed stdout.
struct ClosedStdout;

impl io::Write for ClosedStdout {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }
}

#[test]
fn diagnostic_is_written_as_one_line() {
    let mut out = Vec::new();
    write_diagnostic(&mut out, &AppError::Connect(io::Error::from_raw_os_error(2)));
    assert_eq!(out, b"Failed to connect to the pipe. Error: 2\n");
}

#[test]
fn diagnostic_on_closed_stdout_is_dropped_quietly() {
    let err = AppError::Usage("Usage: pipe-relay <pipe name> [timeout in milliseconds]".into());
    write_diagnostic(ClosedStdout, &err);
    assert_eq!(err.exit_code(), 1);
}
