// crates/upload-kit-mcp/src/framing.rs
// ============================================================================
// Module: Stdio Framing
// Description: Newline and Content-Length message framing for stdio servers.
// Purpose: Read and write JSON-RPC messages on child process pipes.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! MCP stdio servers exchange one JSON object per line. Some servers use
//! LSP-style `Content-Length` headers instead; both are supported and both
//! are bounded by [`MAX_MCP_RESPONSE_BYTES`].
//! Security posture: server output is untrusted; header counts, header sizes,
//! and payload sizes are capped before allocation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use upload_kit_config::McpFraming;

use crate::client::McpClientError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum MCP message size accepted from a server.
pub const MAX_MCP_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
/// Maximum header lines before the blank separator.
const MAX_HEADER_LINES: usize = 64;
/// Maximum bytes in one header line.
const MAX_HEADER_LINE_BYTES: usize = 1024;
/// Maximum bytes across all header lines.
const MAX_HEADER_BYTES: usize = 8 * 1024;

// ============================================================================
// SECTION: Reading
// ============================================================================

/// Reads one message using `framing`.
///
/// # Errors
///
/// Returns [`McpClientError`] when the stream closes, framing is invalid, or
/// the message exceeds [`MAX_MCP_RESPONSE_BYTES`].
pub async fn read_message<R>(reader: &mut R, framing: McpFraming) -> Result<Vec<u8>, McpClientError>
where
    R: AsyncBufRead + Unpin,
{
    match framing {
        McpFraming::Newline => read_line_message(reader).await,
        McpFraming::ContentLength => read_framed(reader).await,
    }
}

/// Reads a newline-delimited message, skipping blank lines.
async fn read_line_message<R>(reader: &mut R) -> Result<Vec<u8>, McpClientError>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let line = read_bounded_line(reader, MAX_MCP_RESPONSE_BYTES + 1, |actual| {
            McpClientError::ResponseTooLarge {
                actual,
                limit: MAX_MCP_RESPONSE_BYTES,
            }
        })
        .await?
        .ok_or_else(|| McpClientError::Transport("stdio closed".to_string()))?;
        let trimmed = trim_line_end(&line);
        if trimmed.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        return Ok(trimmed.to_vec());
    }
}

/// Reads a `Content-Length` framed message.
///
/// # Errors
///
/// Returns [`McpClientError`] when headers are missing, duplicated, oversized,
/// or the declared length exceeds [`MAX_MCP_RESPONSE_BYTES`].
pub async fn read_framed<R>(reader: &mut R) -> Result<Vec<u8>, McpClientError>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<u64> = None;
    let mut header_lines = 0usize;
    let mut header_bytes = 0usize;
    loop {
        let line = read_bounded_line(reader, MAX_HEADER_LINE_BYTES, |_| {
            McpClientError::Protocol("stdio header line too long".to_string())
        })
        .await?
        .ok_or_else(|| McpClientError::Transport("stdio closed".to_string()))?;
        header_bytes = header_bytes.saturating_add(line.len());
        if header_bytes > MAX_HEADER_BYTES {
            return Err(McpClientError::Protocol("stdio headers too large".to_string()));
        }
        let text = std::str::from_utf8(trim_line_end(&line))
            .map_err(|_| McpClientError::Protocol("stdio header was not utf-8".to_string()))?;
        if text.trim().is_empty() {
            break;
        }
        header_lines += 1;
        if header_lines > MAX_HEADER_LINES {
            return Err(McpClientError::Protocol("too many stdio headers".to_string()));
        }
        let Some((name, value)) = text.split_once(':') else {
            return Err(McpClientError::Protocol(format!("malformed stdio header: {text}")));
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            if content_length.is_some() {
                return Err(McpClientError::Protocol("duplicate content length".to_string()));
            }
            let parsed = value
                .trim()
                .parse::<u64>()
                .map_err(|_| McpClientError::Protocol("invalid content length".to_string()))?;
            content_length = Some(parsed);
        }
    }
    let len = content_length.ok_or_else(|| {
        McpClientError::Protocol("missing content length in stdio response".to_string())
    })?;
    let limit = u64::try_from(MAX_MCP_RESPONSE_BYTES).unwrap_or(u64::MAX);
    if len > limit {
        return Err(McpClientError::ResponseTooLarge {
            actual: usize::try_from(len).unwrap_or(usize::MAX),
            limit: MAX_MCP_RESPONSE_BYTES,
        });
    }
    let len = usize::try_from(len).map_err(|_| {
        McpClientError::Protocol("content length exceeds addressable size".to_string())
    })?;
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|err| McpClientError::Transport(format!("stdio read failed: {err}")))?;
    Ok(buf)
}

/// Reads up to and including the next `\n`, failing once `limit` is exceeded.
///
/// Returns `None` on a clean end of stream.
async fn read_bounded_line<R>(
    reader: &mut R,
    limit: usize,
    overflow: impl Fn(usize) -> McpClientError,
) -> Result<Option<Vec<u8>>, McpClientError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    loop {
        let available = reader
            .fill_buf()
            .await
            .map_err(|err| McpClientError::Transport(format!("stdio read failed: {err}")))?;
        if available.is_empty() {
            return Ok(if line.is_empty() { None } else { Some(line) });
        }
        let (used, complete) = match available.iter().position(|byte| *byte == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };
        let next_len = line.len().saturating_add(used);
        if next_len > limit {
            return Err(overflow(next_len));
        }
        line.extend_from_slice(&available[.. used]);
        reader.consume(used);
        if complete {
            return Ok(Some(line));
        }
    }
}

/// Strips a trailing `\n` or `\r\n`.
fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

// ============================================================================
// SECTION: Writing
// ============================================================================

/// Writes one message using `framing` and flushes.
///
/// # Errors
///
/// Returns [`McpClientError`] when the payload cannot be framed or writes fail.
pub async fn write_message<W>(
    writer: &mut W,
    framing: McpFraming,
    payload: &[u8],
) -> Result<(), McpClientError>
where
    W: AsyncWrite + Unpin,
{
    match framing {
        McpFraming::Newline => {
            if payload.contains(&b'\n') {
                return Err(McpClientError::Protocol(
                    "newline-framed payload contains a newline".to_string(),
                ));
            }
            write_all(writer, payload).await?;
            write_all(writer, b"\n").await?;
        }
        McpFraming::ContentLength => {
            let header = format!("Content-Length: {}\r\n\r\n", payload.len());
            write_all(writer, header.as_bytes()).await?;
            write_all(writer, payload).await?;
        }
    }
    writer
        .flush()
        .await
        .map_err(|err| McpClientError::Transport(format!("stdio write failed: {err}")))
}

/// Writes bytes, mapping I/O errors to transport errors.
async fn write_all<W>(writer: &mut W, bytes: &[u8]) -> Result<(), McpClientError>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(bytes)
        .await
        .map_err(|err| McpClientError::Transport(format!("stdio write failed: {err}")))
}
