/// Incremental decoder for the `text/event-stream` framing used by the live
/// feed. `data:` lines accumulate until a blank line completes the event;
/// comments and other fields are ignored. Input arrives in arbitrary chunks,
/// so partial lines are buffered between calls.
#[derive(Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> SseDecoder {
        SseDecoder::default()
    }

    /// Feed a chunk of the response body, returning the data payload of every
    /// event completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.pending.iter().position(|byte| *byte == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
            } else if let Some(value) = line.strip_prefix("data:") {
                self.data
                    .push(value.strip_prefix(' ').unwrap_or(value).to_string());
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_single_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: {\"id\":1}\n\n");
        assert_eq!(events, vec!["{\"id\":1}"]);
    }

    #[test]
    fn buffers_partial_frames_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"id\"").is_empty());
        assert!(decoder.feed(b":1}\n").is_empty());
        let events = decoder.feed(b"\ndata: {\"id\":2}\n\n");
        assert_eq!(events, vec!["{\"id\":1}", "{\"id\":2}"]);
    }

    #[test]
    fn ignores_comments_and_unknown_fields() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b": keep-alive\nevent: insert\ndata: x\n\n");
        assert_eq!(events, vec!["x"]);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: x\r\n\r\n");
        assert_eq!(events, vec!["x"]);
    }

    #[test]
    fn incomplete_event_is_not_emitted() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: x\n").is_empty());
    }
}
