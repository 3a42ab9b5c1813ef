/// LLM Client — the single point of entry for all upstream OpenAI calls.
///
/// ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
/// All LLM interactions MUST go through this module.
///
/// Two call shapes exist because not all models support explicit
/// reasoning-effort control: the Responses API is the preferred path, the
/// Chat Completions API the fallback. Callers combine them through
/// [`with_fallback`].
use std::future::Future;
use std::pin::Pin;

use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod sse;

const RESPONSES_PATH: &str = "/v1/responses";
const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One role-tagged turn sent upstream. Both call shapes accept the same
/// structure.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

// ── Responses API wire types ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    reasoning: Reasoning<'a>,
    input: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Serialize)]
struct Reasoning<'a> {
    effort: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    part_type: String,
    text: Option<String>,
}

impl ResponsesReply {
    /// Concatenates all `output_text` parts across message items.
    /// Missing or non-text output coerces to the empty string; an empty
    /// completion is a valid result, not an error.
    fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|item| item.item_type == "message")
            .flat_map(|item| item.content.iter())
            .filter(|part| part.part_type == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

// ── Chat Completions wire types ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// Stream of text fragments in upstream arrival order.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// The single OpenAI client shared by all request handlers.
/// Read-only after construction; `reqwest::Client` is internally
/// reference-counted and safe for concurrent use.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    project: Option<String>,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, project: Option<String>, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            project,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Sends a POST to the given API path and maps non-2xx statuses to
    /// `LlmError::Api`, extracting the upstream error message when the body
    /// carries the standard error envelope.
    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<reqwest::Response, LlmError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json");
        if let Some(project) = &self.project {
            request = request.header("OpenAI-Project", project);
        }

        let response = request.json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Preferred call path: the Responses API with a reasoning-effort hint.
    /// Returns the concatenated output text, empty string if the model
    /// produced none.
    pub async fn respond(
        &self,
        model: &str,
        effort: &str,
        input: &[ChatMessage],
    ) -> Result<String, LlmError> {
        let body = ResponsesRequest {
            model,
            reasoning: Reasoning { effort },
            input,
            stream: None,
        };

        let raw = self.post(RESPONSES_PATH, &body).await?.text().await?;
        let reply: ResponsesReply = serde_json::from_str(&raw)?;
        let text = reply.output_text();
        debug!("Responses API call succeeded: {} output chars", text.len());
        Ok(text)
    }

    /// Streaming variant of [`respond`](Self::respond). Text deltas are
    /// yielded as they arrive; nothing is buffered beyond SSE line
    /// reassembly. Dropping the stream releases the upstream connection.
    pub async fn respond_stream(
        &self,
        model: &str,
        effort: &str,
        input: &[ChatMessage],
    ) -> Result<DeltaStream, LlmError> {
        let body = ResponsesRequest {
            model,
            reasoning: Reasoning { effort },
            input,
            stream: Some(true),
        };

        let response = self.post(RESPONSES_PATH, &body).await?;
        Ok(Box::pin(delta_stream(
            response.bytes_stream(),
            sse::decode_responses_data,
        )))
    }

    /// Fallback call path: plain Chat Completions. The caller supplies an
    /// output cap and sampling temperature since this path has no
    /// reasoning-effort control.
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let body = ChatCompletionRequest {
            model,
            messages,
            max_tokens,
            temperature,
            stream: None,
        };

        let raw = self.post(CHAT_COMPLETIONS_PATH, &body).await?.text().await?;
        let reply: ChatCompletionReply = serde_json::from_str(&raw)?;
        let text = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        debug!("Chat Completions call succeeded: {} output chars", text.len());
        Ok(text)
    }

    /// Streaming variant of [`chat_completion`](Self::chat_completion).
    pub async fn chat_completion_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<DeltaStream, LlmError> {
        let body = ChatCompletionRequest {
            model,
            messages,
            max_tokens,
            temperature,
            stream: Some(true),
        };

        let response = self.post(CHAT_COMPLETIONS_PATH, &body).await?;
        Ok(Box::pin(delta_stream(
            response.bytes_stream(),
            sse::decode_chat_data,
        )))
    }
}

/// Tries the preferred call strategy, falling back to the secondary one on
/// any failure. The fallback runs at most once; if it also fails, its error
/// propagates to the caller — there is no third tier.
pub async fn with_fallback<T, P, PFut, F, FFut>(preferred: P, fallback: F) -> Result<T, LlmError>
where
    P: FnOnce() -> PFut,
    PFut: Future<Output = Result<T, LlmError>>,
    F: FnOnce() -> FFut,
    FFut: Future<Output = Result<T, LlmError>>,
{
    match preferred().await {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!("Preferred call path failed, falling back to chat completions: {e}");
            fallback().await
        }
    }
}

/// Adapts a raw SSE byte stream into a stream of text deltas, preserving
/// upstream arrival order. `decode` extracts the delta (if any) from one
/// `data:` payload.
fn delta_stream<S, B, E>(
    bytes: S,
    decode: fn(&str) -> Option<String>,
) -> impl Stream<Item = Result<String, LlmError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<LlmError>,
{
    let mut buf = sse::SseLineBuffer::new();
    bytes
        .map(move |chunk| match chunk {
            Ok(chunk) => {
                let mut deltas = Vec::new();
                for line in buf.push(chunk.as_ref()) {
                    if let Some(data) = sse::data_payload(&line) {
                        if let Some(delta) = decode(data) {
                            deltas.push(Ok(delta));
                        }
                    }
                }
                deltas
            }
            Err(e) => vec![Err(e.into())],
        })
        .flat_map(futures::stream::iter)
}
