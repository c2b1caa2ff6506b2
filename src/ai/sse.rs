use crate::error::CompletionError;
use serde::Deserialize;

/// Incremental Server-Sent Events decoder.
///
/// Bytes are buffered until a full line is available, so events (and UTF-8
/// sequences) split across network chunks decode correctly. Consecutive
/// `data:` lines are joined with `\n` and emitted at the blank line that ends
/// the event. Other fields and `:` comments are ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Option<String>,
}

impl SseDecoder {
    /// Feeds a chunk and returns the data payloads of every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let mut line = String::from_utf8_lossy(&raw[..raw.len() - 1]).into_owned();
            if line.ends_with('\r') {
                line.pop();
            }
            if let Some(event) = self.consume_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flushes whatever is left once the body has ended.
    pub fn finish(&mut self) -> Vec<String> {
        let mut events = Vec::new();
        if !self.buffer.is_empty() {
            let raw = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&raw);
            if let Some(event) = self.consume_line(line.trim_end_matches('\r')) {
                events.push(event);
            }
        }
        if let Some(data) = self.data.take() {
            events.push(data);
        }
        events
    }

    fn consume_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.data.take();
        }
        if let Some(rest) = line.strip_prefix("data:") {
            let value = rest.strip_prefix(' ').unwrap_or(rest);
            match &mut self.data {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            }
        }
        None
    }
}

/// What one SSE data payload means for the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkEvent {
    Fragment(String),
    /// A well-formed chunk with no text (role preamble, usage trailer).
    Empty,
    Done,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ApiError {
    pub(crate) message: String,
}

pub fn parse_chunk_data(data: &str) -> Result<ChunkEvent, CompletionError> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return Ok(ChunkEvent::Empty);
    }
    if trimmed == "[DONE]" {
        return Ok(ChunkEvent::Done);
    }

    let chunk: StreamChunk = serde_json::from_str(trimmed)?;
    if let Some(error) = chunk.error {
        return Err(CompletionError::new(error.message));
    }

    let piece = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content)
        .filter(|content| !content.is_empty());

    Ok(match piece {
        Some(content) => ChunkEvent::Fragment(content),
        None => ChunkEvent::Empty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chunk_data() {
        assert_eq!(parse_chunk_data(""), Ok(ChunkEvent::Empty));
        assert_eq!(parse_chunk_data("[DONE]"), Ok(ChunkEvent::Done));
        assert_eq!(
            parse_chunk_data(r#"{"choices":[{"index":0,"delta":{"content":"hello"}}]}"#),
            Ok(ChunkEvent::Fragment("hello".to_string()))
        );
        assert_eq!(
            parse_chunk_data(r#"{"choices":[{"delta":{"role":"assistant","content":""}}]}"#),
            Ok(ChunkEvent::Empty)
        );
        assert_eq!(
            parse_chunk_data(r#"{"choices":[{"delta":{},"finish_reason":"stop"}],"x_groq":{}}"#),
            Ok(ChunkEvent::Empty)
        );
    }

    #[test]
    fn error_chunks_and_garbage_fail() {
        assert_eq!(
            parse_chunk_data(r#"{"error":{"message":"rate limited","type":"tokens"}}"#),
            Err(CompletionError::new("rate limited"))
        );
        assert!(parse_chunk_data("{not json").is_err());
    }

    #[test]
    fn decodes_events_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: {\"a\"").is_empty());
        assert!(decoder.push(b":1}\r\n").is_empty());
        assert_eq!(decoder.push(b"\r\ndata: [DONE]\n\n"), vec![
            "{\"a\":1}".to_string(),
            "[DONE]".to_string()
        ]);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn joins_multiline_data_and_skips_comments() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(b": keep-alive\nevent: message\ndata: one\ndata: two\n\n");
        assert_eq!(events, vec!["one\ntwo".to_string()]);
    }

    #[test]
    fn keeps_multibyte_characters_split_between_chunks() {
        let text = "data: caf\u{e9}\n\n".as_bytes();
        let split = text.len() - 3;
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(&text[..split]).is_empty());
        assert_eq!(decoder.push(&text[split..]), vec!["caf\u{e9}".to_string()]);
    }

    #[test]
    fn finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), vec!["tail".to_string()]);
    }
}
