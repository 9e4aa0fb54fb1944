//! Incremental parser for `text/event-stream` bodies.
//!
//! The completion upstream delivers SSE over a byte stream whose
//! chunk boundaries fall anywhere, including inside a UTF-8 sequence.
//! Bytes are buffered and only complete lines are decoded.

/// Sentinel payload the upstream sends when the completion is done.
pub const SSE_DONE: &str = "[DONE]";

#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk; returns the `data:` payloads of every
    /// line completed by it, in arrival order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(payload) = line.strip_prefix("data:") {
                let payload = payload.trim_start();
                if !payload.is_empty() {
                    payloads.push(payload.to_string());
                }
            }
        }
        payloads
    }
}
