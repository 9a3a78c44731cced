//! Command-line surface: `pipe-relay <pipe name> [timeout in milliseconds]`.

use std::convert::Infallible;
use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};

use crate::config::WaitBound;
use crate::{AppError, Result};

/// Program name used when the OS supplies no `argv[0]`.
const FALLBACK_PROGRAM: &str = "pipe-relay";

/// Log output format for the stderr tracing layer.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Parsed command line.
#[derive(Debug, Parser)]
#[command(
    name = "pipe-relay",
    about = "Relay stdin lines to a named pipe and print the replies",
    version,
    long_about = None
)]
pub struct Cli {
    /// Log output format on stderr (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Name of an existing pipe to connect to.
    #[arg(allow_hyphen_values = true)]
    pub pipe_name: String,

    /// Milliseconds to wait for each reply (default 50).
    ///
    /// Parsed leniently: leading digits are used and anything unparsable
    /// counts as 0. Negative values wrap, so -1 waits forever.
    #[arg(value_parser = parse_timeout_arg, allow_hyphen_values = true)]
    pub timeout_ms: Option<WaitBound>,
}

/// What the process should do after argument parsing.
#[derive(Debug)]
pub enum Invocation {
    /// Start relaying with these arguments.
    Relay(Cli),
    /// Print this text (help or version) and exit successfully.
    Informational(String),
}

/// Parse `args` (including the program name) into an [`Invocation`].
///
/// # Errors
///
/// Returns `AppError::Usage` with the usage line when the arguments do not
/// match `<pipe name> [timeout in milliseconds]`.
pub fn parse_args<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let program = args
        .first()
        .map_or_else(|| FALLBACK_PROGRAM.to_owned(), |arg| arg.to_string_lossy().into_owned());

    match Cli::try_parse_from(&args) {
        Ok(cli) => Ok(Invocation::Relay(cli)),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Ok(Invocation::Informational(err.to_string()))
        }
        Err(err) => {
            tracing::debug!(kind = ?err.kind(), "argument parsing failed");
            Err(AppError::Usage(usage(&program)))
        }
    }
}

/// Usage line printed for malformed invocations.
#[must_use]
pub fn usage(program: &str) -> String {
    format!("Usage: {program} <pipe name> [timeout in milliseconds]")
}

/// Parse a millisecond count the way C `atoi` reads an integer.
///
/// Leading whitespace and one sign are accepted, then leading decimal digits
/// are read until the first non-digit. Input with no digits yields 0. The
/// result saturates at the `i32` range and is reinterpreted as an unsigned
/// 32-bit count, so negative inputs wrap around.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn parse_timeout_ms(raw: &str) -> u32 {
    let trimmed =
        raw.trim_start_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r'));
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_i64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
        });
    let signed = if negative { -magnitude } else { magnitude };
    let clamped = i32::try_from(signed.clamp(i64::from(i32::MIN), i64::from(i32::MAX)))
        .unwrap_or_default();

    // Two's complement reinterpretation, matching a cast to a 32-bit DWORD.
    clamped as u32
}

#[allow(clippy::unnecessary_wraps)]
fn parse_timeout_arg(raw: &str) -> std::result::Result<WaitBound, Infallible> {
    Ok(WaitBound::from_millis(parse_timeout_ms(raw)))
}
