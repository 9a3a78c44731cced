//! Chunked line reading from standard input.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Read the next line chunk from `input` into `buf`.
///
/// Copies bytes until a `\n` has been copied (and kept) or `buf.len() - 1`
/// bytes are stored, whichever comes first. A line longer than that is
/// returned in pieces over successive calls. Returns `Ok(0)` only at end of
/// input with nothing buffered; a final line lacking a newline is returned
/// as-is.
///
/// # Errors
///
/// Propagates read errors from `input`.
pub async fn read_line_chunk<R>(input: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let limit = buf.len().saturating_sub(1);
    let mut filled = 0;

    while filled < limit {
        let available = input.fill_buf().await?;
        if available.is_empty() {
            break;
        }

        let window = &available[..available.len().min(limit - filled)];
        let (take, line_done) = match window.iter().position(|&b| b == b'\n') {
            Some(idx) => (idx + 1, true),
            None => (window.len(), false),
        };
        buf[filled..filled + take].copy_from_slice(&window[..take]);
        input.consume(take);
        filled += take;

        if line_done {
            break;
        }
    }

    Ok(filled)
}
