//! Server-sent event line buffering.

/// Accumulates raw bytes and yields complete `data:` payloads.
///
/// Network chunks can split a line anywhere, including inside a multi-byte
/// character, so bytes stay in the buffer until their newline arrives and
/// only complete lines are decoded.
#[derive(Debug, Default)]
pub struct SseBuffer {
    buffer: Vec<u8>,
}

impl SseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes and drain every complete data payload.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(data) = data_payload(line.trim()) {
                payloads.push(data.to_string());
            }
        }
        payloads
    }

    /// Payload of a trailing line that never got its newline.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let rest = String::from_utf8_lossy(&rest);
        data_payload(rest.trim()).map(str::to_string)
    }
}

fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_are_joined() {
        let mut sse = SseBuffer::new();
        assert!(sse.push(b"data: {\"a\"").is_empty());
        assert_eq!(sse.push(b":1}\n\ndata: [DONE]\n"), vec!["{\"a\":1}", "[DONE]"]);
    }

    #[test]
    fn test_non_data_lines_ignored() {
        let mut sse = SseBuffer::new();
        let payloads = sse.push(b"event: message\n: keepalive\ndata:{}\n");
        assert_eq!(payloads, vec!["{}"]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let bytes = "data: café\n".as_bytes();
        let split = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let mut sse = SseBuffer::new();
        assert!(sse.push(&bytes[..split]).is_empty());
        assert_eq!(sse.push(&bytes[split..]), vec!["café"]);

        let tail = "data: naïve".as_bytes();
        let split = tail.iter().position(|b| *b == 0xC3).unwrap() + 1;
        assert!(sse.push(&tail[..split]).is_empty());
        assert!(sse.push(&tail[split..]).is_empty());
        assert_eq!(sse.finish(), Some("naïve".to_string()));
    }

    #[test]
    fn test_finish_flushes_trailing_line() {
        let mut sse = SseBuffer::new();
        sse.push(b"data: tail");
        assert_eq!(sse.finish(), Some("tail".to_string()));
        assert_eq!(sse.finish(), None);
    }
}
