//! Bounded wait over a single channel read.
//!
//! A read is polled once as soon as it is issued. If it is already complete
//! its result is used directly; otherwise the relay suspends until the read
//! completes or the [`WaitBound`] elapses. On timeout the read future is
//! dropped without touching the channel: tokio reads are cancel-safe, so any
//! reply that arrives afterwards stays queued and is returned by a later read.

use std::future::Future;
use std::io;
use std::pin::{pin, Pin};
use std::task::Poll;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::WaitBound;

/// How a bounded read ended.
#[derive(Debug)]
pub enum ReadOutcome {
    /// The read was complete on its first poll.
    Immediate(usize),
    /// The read was pending and completed before the deadline.
    Completed(usize),
    /// The read was pending and then completed with an error or end of stream.
    Failed(io::Error),
    /// The deadline passed first; the read was abandoned.
    TimedOut,
}

impl ReadOutcome {
    /// Number of reply bytes to forward, if any.
    #[must_use]
    pub fn bytes(&self) -> Option<usize> {
        match self {
            Self::Immediate(n) | Self::Completed(n) => Some(*n),
            Self::Failed(_) | Self::TimedOut => None,
        }
    }
}

/// Issue one read into `buf` and wait for it up to `wait`.
///
/// A zero-byte read into a non-empty buffer means the peer closed its end.
/// It is reported as [`pipe_closed`], which carries the platform's
/// broken-pipe code.
///
/// # Errors
///
/// Returns the I/O error when the read fails on its first poll. Failures
/// after the read went pending are reported as [`ReadOutcome::Failed`].
pub async fn read_with_deadline<C>(
    channel: &mut C,
    buf: &mut [u8],
    wait: WaitBound,
) -> io::Result<ReadOutcome>
where
    C: AsyncRead + Unpin + ?Sized,
{
    let mut read = pin!(channel.read(buf));

    if let Poll::Ready(first) = poll_once(read.as_mut()).await {
        return first.and_then(reply_len).map(ReadOutcome::Immediate);
    }

    let finished = match wait.as_duration() {
        Some(limit) => match tokio::time::timeout(limit, read).await {
            Ok(result) => result,
            Err(_elapsed) => return Ok(ReadOutcome::TimedOut),
        },
        None => read.await,
    };

    Ok(match finished.and_then(reply_len) {
        Ok(n) => ReadOutcome::Completed(n),
        Err(err) => ReadOutcome::Failed(err),
    })
}

/// OS code for a pipe whose other end has closed.
#[cfg(windows)]
pub const PIPE_CLOSED_CODE: i32 = 109; // ERROR_BROKEN_PIPE
/// OS code for a pipe whose other end has closed.
#[cfg(not(windows))]
pub const PIPE_CLOSED_CODE: i32 = 32; // EPIPE

/// Error for a read that found the peer gone.
#[must_use]
pub fn pipe_closed() -> io::Error {
    io::Error::from_raw_os_error(PIPE_CLOSED_CODE)
}

fn reply_len(n: usize) -> io::Result<usize> {
    if n == 0 {
        Err(pipe_closed())
    } else {
        Ok(n)
    }
}

/// Poll `fut` exactly once without suspending on it.
async fn poll_once<F: Future>(mut fut: Pin<&mut F>) -> Poll<F::Output> {
    std::future::poll_fn(move |cx| Poll::Ready(fut.as_mut().poll(cx))).await
}
