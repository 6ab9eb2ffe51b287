use serde::Deserialize;

use crate::error::{AppError, AppResult};

const DATA_PREFIX: &str = "data:";
const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    #[serde(default)]
    message: String,
}

/// Incremental decoder for chat completion server-sent events.
///
/// Network chunks may split a line anywhere, including inside a UTF-8
/// sequence, so bytes are buffered until a newline arrives.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the `[DONE]` marker has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feeds a network chunk and returns the text fragments it completed
    pub fn push(&mut self, chunk: &[u8]) -> AppResult<Vec<String>> {
        self.buffer.extend_from_slice(chunk);

        let mut fragments = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if self.done {
                continue;
            }

            if let Some(fragment) = self.decode_line(&line)? {
                fragments.push(fragment);
            }
        }

        Ok(fragments)
    }

    /// Flushes an unterminated last line once the body has ended.
    ///
    /// A body that closes before `[DONE]` was truncated upstream, so the
    /// flushed fragments are followed by an error.
    pub fn finish(mut self) -> Vec<AppResult<String>> {
        let mut items = Vec::new();
        if !self.done && !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            match self.decode_line(&line) {
                Ok(Some(fragment)) => items.push(Ok(fragment)),
                Ok(None) => {}
                Err(e) => {
                    items.push(Err(e));
                    return items;
                }
            }
        }

        if !self.done {
            items.push(Err(AppError::Upstream(format!(
                "stream ended before {}",
                DONE_MARKER
            ))));
        }

        items
    }

    fn decode_line(&mut self, line: &[u8]) -> AppResult<Option<String>> {
        let line = std::str::from_utf8(line)
            .map_err(|e| AppError::Upstream(format!("invalid UTF-8 in stream: {}", e)))?;
        self.parse_line(line.trim_end_matches(|c| c == '\r' || c == '\n'))
    }

    fn parse_line(&mut self, line: &str) -> AppResult<Option<String>> {
        // Blank separators, comments and `event:` lines carry no text
        let Some(data) = line.strip_prefix(DATA_PREFIX) else {
            return Ok(None);
        };
        let data = data.trim_start();

        if data == DONE_MARKER {
            self.done = true;
            return Ok(None);
        }

        let chunk: StreamChunk = serde_json::from_str(data)
            .map_err(|e| AppError::Upstream(format!("malformed stream chunk: {}", e)))?;

        if let Some(error) = chunk.error {
            return Err(AppError::Upstream(format!("stream error: {}", error.message)));
        }

        Ok(chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty()))
    }
}
