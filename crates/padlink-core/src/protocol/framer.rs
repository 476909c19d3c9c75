//! Reassembles the serial byte stream into protocol lines.
//!
//! Serial reads arrive in arbitrary chunks: a line may be split across
//! several reads, and one read may contain several lines.  [`LineFramer`]
//! owns the partial-line buffer, so there is no process-wide state and the
//! buffer's lifetime is exactly the connection's lifetime.
//!
//! The framer is pure and synchronous: it does no I/O and is driven by
//! whatever transport supplies the bytes.
//!
//! Known limitation: no line-length cap is imposed, so a pathological
//! stream that never sends `'\n'` grows the buffer without bound.  The
//! device's own line buffer is 256 bytes, so in practice lines are short.

/// Append-only accumulator that yields complete, trimmed lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns every line completed by it.
    ///
    /// A line is the text before a `'\n'`; the terminator is consumed and
    /// the yielded line is trimmed of surrounding whitespace (which also
    /// removes a trailing `'\r'`).  Lines that are empty after trimming are
    /// dropped.  An incomplete tail stays buffered for the next feed.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..raw.len() - 1]);
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }
        lines
    }

    /// Number of buffered bytes awaiting a terminator.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drops any buffered partial line (used on disconnect).
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}
