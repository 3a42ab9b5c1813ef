//! Minimal SSE decoding for upstream streaming responses.
//!
//! The upstream APIs frame streaming output as `data: <json>` lines. Network
//! chunks arrive at arbitrary byte boundaries, so complete lines are
//! reassembled through a carry buffer before any JSON parsing happens.

use serde::Deserialize;

/// Reassembles complete lines from a stream of byte chunks.
///
/// Bytes after the last newline are carried over to the next `push` call.
/// Splitting only ever happens on `\n` (ASCII), so a multi-byte UTF-8
/// character can never straddle two returned lines.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    carry: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every line completed by it, newline-stripped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.carry.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.carry.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.carry.drain(..=pos).collect();
            line.pop(); // the \n
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }
}

/// Extracts the payload of a `data:` line; skips blank lines, comments and
/// other SSE fields (`event:`, `id:`, ...).
pub fn data_payload(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:"))
}

#[derive(Debug, Deserialize)]
struct ResponsesStreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    delta: Option<String>,
}

/// Decodes one Responses API stream event, returning the text delta if the
/// event carries one. All other event types (created, done, usage) are
/// silently skipped.
pub fn decode_responses_data(data: &str) -> Option<String> {
    let event: ResponsesStreamEvent = serde_json::from_str(data).ok()?;
    if event.event_type == "response.output_text.delta" {
        event.delta
    } else {
        None
    }
}

#[derive(Debug, Deserialize)]
struct ChatStreamChunk {
    #[serde(default)]
    choices: Vec<ChatStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatStreamChoice {
    delta: ChatStreamDelta,
}

#[derive(Debug, Deserialize)]
struct ChatStreamDelta {
    content: Option<String>,
}

/// Decodes one Chat Completions stream chunk. `[DONE]` and chunks without
/// content (role preludes, finish markers) yield nothing.
pub fn decode_chat_data(data: &str) -> Option<String> {
    if data == "[DONE]" {
        return None;
    }
    let chunk: ChatStreamChunk = serde_json::from_str(data).ok()?;
    chunk.choices.into_iter().next()?.delta.content
}
