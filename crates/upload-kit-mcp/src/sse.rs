// crates/upload-kit-mcp/src/sse.rs
// ============================================================================
// Module: SSE Decoding
// Description: Incremental `text/event-stream` decoder for MCP responses.
// Purpose: Deliver progress notifications as they stream in.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Streamable HTTP servers may answer a POST with an event stream carrying
//! notifications before the final response. [`SseDecoder`] turns body chunks
//! into complete `data:` payloads; multi-line data is joined with `\n`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::client::McpClientError;

// ============================================================================
// SECTION: Decoder
// ============================================================================

/// Incremental SSE event decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Bytes of the current incomplete line.
    pending: Vec<u8>,
    /// Data lines of the current event.
    data: Vec<String>,
}

impl SseDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a body chunk and returns every event completed by it.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError::Protocol`] when a line is not UTF-8.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Vec<u8>>, McpClientError> {
        let mut events = Vec::new();
        for byte in chunk {
            if *byte != b'\n' {
                self.pending.push(*byte);
                continue;
            }
            let raw = std::mem::take(&mut self.pending);
            let line = std::str::from_utf8(raw.strip_suffix(b"\r").unwrap_or(&raw))
                .map_err(|_| {
                    McpClientError::Protocol("sse response was not valid utf-8".to_string())
                })?
                .to_string();
            if let Some(event) = self.accept_line(&line) {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Flushes a trailing event that was not followed by a blank line.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError::Protocol`] when the remainder is not UTF-8.
    pub fn finish(&mut self) -> Result<Option<Vec<u8>>, McpClientError> {
        if !self.pending.is_empty() {
            let raw = std::mem::take(&mut self.pending);
            let line = std::str::from_utf8(&raw)
                .map_err(|_| {
                    McpClientError::Protocol("sse response was not valid utf-8".to_string())
                })?
                .to_string();
            if let Some(event) = self.accept_line(&line) {
                return Ok(Some(event));
            }
        }
        Ok(self.take_event())
    }

    /// Applies one complete line; a blank line completes the current event.
    fn accept_line(&mut self, line: &str) -> Option<Vec<u8>> {
        if line.is_empty() {
            return self.take_event();
        }
        if let Some(value) = line.strip_prefix("data:") {
            self.data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
        }
        None
    }

    /// Returns the accumulated event, if it carried data.
    fn take_event(&mut self) -> Option<Vec<u8>> {
        if self.data.is_empty() {
            return None;
        }
        let joined = std::mem::take(&mut self.data).join("\n");
        Some(joined.into_bytes())
    }
}
