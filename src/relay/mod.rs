//! The relay loop.
//!
//! Each iteration reads one line chunk from the input, writes it to the
//! channel, then waits a bounded time for a reply and copies whatever
//! arrives to the output unframed. Diagnostics share the output stream with
//! relayed bytes.
//!
//! | Event                              | Effect                               |
//! |------------------------------------|--------------------------------------|
//! | end of input                       | stop                                 |
//! | channel write fails                | diagnostic, stop                     |
//! | reply ready at once / before limit | bytes forwarded                      |
//! | reply wait times out               | diagnostic, next line                |
//! | read fails at once                 | diagnostic, stop                     |
//! | read fails after pending           | logged at `WARN`, next line          |

pub mod line;
pub mod wait;

use std::fmt::{Display, Formatter};

use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::config::{WaitBound, LINE_BUFFER_CAPACITY};
use crate::AppError;

use self::line::read_line_chunk;
use self::wait::{read_with_deadline, ReadOutcome};

/// Diagnostic printed when a reply does not arrive in time.
pub const TIMED_OUT_NOTICE: &str = "Read operation timed out.";

/// Why the relay loop stopped.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StopReason {
    /// Standard input was exhausted.
    EndOfInput,
    /// Writing a line to the channel failed.
    ChannelWrite,
    /// Reading from the channel failed as soon as the read was issued.
    ChannelRead,
    /// Standard input or output failed.
    Stdio,
}

impl Display for StopReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::EndOfInput => "end_of_input",
            Self::ChannelWrite => "channel_write",
            Self::ChannelRead => "channel_read",
            Self::Stdio => "stdio",
        };
        f.write_str(label)
    }
}

/// Counters for one relay run.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RelaySummary {
    /// Line chunks written to the channel.
    pub lines: u64,
    /// Replies forwarded to the output.
    pub replies: u64,
    /// Reply bytes forwarded to the output.
    pub bytes_out: u64,
    /// Reply waits that timed out.
    pub timeouts: u64,
    /// What ended the loop.
    pub stop: StopReason,
}

impl RelaySummary {
    fn new() -> Self {
        Self {
            lines: 0,
            replies: 0,
            bytes_out: 0,
            timeouts: 0,
            stop: StopReason::EndOfInput,
        }
    }
}

/// Line relay between an input, a channel, and an output.
///
/// Owns the channel for its whole lifetime; dropping the relay (or the
/// future returned by [`Relay::run`]) closes it.
pub struct Relay<C, I, O> {
    channel: C,
    input: I,
    output: O,
    wait: WaitBound,
    buf: [u8; LINE_BUFFER_CAPACITY],
}

impl<C, I, O> Relay<C, I, O>
where
    C: AsyncRead + AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    /// Create a relay over an already connected channel.
    #[must_use]
    pub fn new(channel: C, input: I, output: O, wait: WaitBound) -> Self {
        Self {
            channel,
            input,
            output,
            wait,
            buf: [0; LINE_BUFFER_CAPACITY],
        }
    }

    /// Run until the input ends or a channel or stdio failure stops the loop.
    ///
    /// Failures are reported on the output and reflected in the summary's
    /// [`StopReason`]; none of them is returned as an error.
    pub async fn run(mut self) -> RelaySummary {
        let mut summary = RelaySummary::new();
        debug!(wait = %self.wait, "relay loop starting");

        summary.stop = loop {
            let len = match read_line_chunk(&mut self.input, &mut self.buf).await {
                Ok(0) => break StopReason::EndOfInput,
                Ok(len) => len,
                Err(err) => {
                    let err = AppError::Io(format!("stdin read failed: {err}"));
                    warn!(%err, "input unavailable");
                    break StopReason::Stdio;
                }
            };

            if let Err(err) = self.send_line(len).await {
                let err = AppError::Write(err);
                warn!(%err, "channel write failed");
                break self.report(&err, StopReason::ChannelWrite).await;
            }
            summary.lines += 1;

            let outcome = match read_with_deadline(&mut self.channel, &mut self.buf, self.wait).await
            {
                Ok(outcome) => outcome,
                Err(err) => {
                    let err = AppError::Read(err);
                    warn!(%err, "channel read failed");
                    break self.report(&err, StopReason::ChannelRead).await;
                }
            };

            if let Err(stop) = self.forward(outcome, &mut summary).await {
                break stop;
            }
        };

        if let Err(err) = self.output.flush().await {
            warn!(%err, "stdout flush failed");
        }
        info!(
            lines = summary.lines,
            replies = summary.replies,
            bytes_out = summary.bytes_out,
            timeouts = summary.timeouts,
            stop = %summary.stop,
            "relay loop finished"
        );
        summary
    }

    async fn send_line(&mut self, len: usize) -> std::io::Result<()> {
        self.channel.write_all(&self.buf[..len]).await?;
        self.channel.flush().await?;
        debug!(bytes = len, "line written to channel");
        Ok(())
    }

    /// Apply a read outcome; `Err` carries the reason to stop.
    async fn forward(
        &mut self,
        outcome: ReadOutcome,
        summary: &mut RelaySummary,
    ) -> Result<(), StopReason> {
        match outcome {
            ReadOutcome::Immediate(n) | ReadOutcome::Completed(n) => {
                self.emit_reply(n).await?;
                summary.replies += 1;
                summary.bytes_out += n as u64;
            }
            ReadOutcome::Failed(err) => {
                warn!(%err, "pending read completed without a reply");
            }
            ReadOutcome::TimedOut => {
                summary.timeouts += 1;
                debug!(wait = %self.wait, "reply wait elapsed");
                self.emit_line(TIMED_OUT_NOTICE).await?;
            }
        }
        Ok(())
    }

    async fn emit_reply(&mut self, len: usize) -> Result<(), StopReason> {
        write_flushed(&mut self.output, &[&self.buf[..len]])
            .await
            .map_err(|err| stdout_failed(&err))
    }

    async fn emit_line(&mut self, text: &str) -> Result<(), StopReason> {
        write_flushed(&mut self.output, &[text.as_bytes(), b"\n".as_slice()])
            .await
            .map_err(|err| stdout_failed(&err))
    }

    /// Print a loop-ending diagnostic and settle on the reason to stop.
    async fn report(&mut self, err: &AppError, stop: StopReason) -> StopReason {
        match self.emit_line(&err.to_string()).await {
            Ok(()) => stop,
            Err(stdio) => stdio,
        }
    }
}

async fn write_flushed<O>(output: &mut O, chunks: &[&[u8]]) -> std::io::Result<()>
where
    O: AsyncWrite + Unpin,
{
    for chunk in chunks {
        output.write_all(chunk).await?;
    }
    output.flush().await
}

fn stdout_failed(err: &std::io::Error) -> StopReason {
    let err = AppError::Io(format!("stdout write failed: {err}"));
    warn!(%err, "output unavailable");
    StopReason::Stdio
}
