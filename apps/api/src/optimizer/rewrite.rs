//! The rewrite engine: one upstream call turning a raw prompt into a
//! structured one, with the preferred/fallback two-path shape.

use crate::llm_client::{with_fallback, ChatMessage, LlmClient, LlmError};
use crate::optimizer::modes::OptimizationMode;
use crate::optimizer::prompts;

/// Fast, cost-effective model used for rewriting. Intentionally fixed — the
/// caller only picks the model for the final-answer pass.
pub const OPTIMIZER_MODEL: &str = "gpt-5";

/// Reasoning effort for the preferred rewrite path.
const REWRITE_EFFORT: &str = "medium";

/// Output cap and temperature for the fallback path. Low temperature keeps
/// the weaker model from drifting into verbose or creative rewrites, so both
/// paths behave consistently.
const FALLBACK_MAX_TOKENS: u32 = 1000;
const FALLBACK_TEMPERATURE: f32 = 0.1;

/// User-turn template wrapping the raw text.
const REWRITE_PREFIX: &str = "Optimize this prompt: ";

/// Builds the full system instruction for a mode: base prompt plus the
/// mode's enhancement fragment. Deterministic — identical input yields
/// byte-identical output.
pub fn build_instruction(mode: OptimizationMode) -> String {
    format!("{}\n{}", prompts::SYSTEM_OPTIMIZER, mode.enhancement())
}

/// Rewrites `raw_text` into a better-structured prompt in the given mode.
///
/// The text is passed through unmodified — no trimming, no truncation, no
/// length checks; empty input is a legitimate request. Tries the Responses
/// API first, falls back to Chat Completions on any failure; a second
/// failure propagates to the caller.
pub async fn rewrite_prompt(
    llm: &LlmClient,
    raw_text: &str,
    mode: OptimizationMode,
) -> Result<String, LlmError> {
    let instruction = build_instruction(mode);
    let messages = [
        ChatMessage::system(instruction),
        ChatMessage::user(format!("{REWRITE_PREFIX}{raw_text}")),
    ];

    let improved = with_fallback(
        || llm.respond(OPTIMIZER_MODEL, REWRITE_EFFORT, &messages),
        || llm.chat_completion(OPTIMIZER_MODEL, &messages, FALLBACK_MAX_TOKENS, FALLBACK_TEMPERATURE),
    )
    .await?;

    Ok(improved.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    const IMPROVED: &str =
        "Provide a detailed, step-by-step explanation of machine learning with examples.";

    /// Scripted stand-in for the upstream API: serves both call shapes and
    /// records every request body it receives.
    #[derive(Clone)]
    struct Upstream {
        responses_status: StatusCode,
        responses_body: String,
        chat_status: StatusCode,
        chat_body: String,
        responses_calls: Arc<Mutex<Vec<Value>>>,
        chat_calls: Arc<Mutex<Vec<Value>>>,
    }

    impl Upstream {
        fn new() -> Self {
            Self {
                responses_status: StatusCode::OK,
                responses_body: json!({
                    "output": [{"type": "message", "content": [
                        {"type": "output_text", "text": format!("  {IMPROVED}\n")}
                    ]}]
                })
                .to_string(),
                chat_status: StatusCode::OK,
                chat_body: json!({
                    "choices": [{"message": {"role": "assistant", "content": IMPROVED}}]
                })
                .to_string(),
                responses_calls: Arc::default(),
                chat_calls: Arc::default(),
            }
        }

        /// Serves on an ephemeral local port, returning a client pointed at it.
        async fn spawn(self) -> (LlmClient, Self) {
            let app = Router::new()
                .route("/v1/responses", post(responses_handler))
                .route("/v1/chat/completions", post(chat_handler))
                .with_state(self.clone());
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            let client = LlmClient::new("test-key".to_string(), None, format!("http://{addr}"));
            (client, self)
        }
    }

    async fn responses_handler(
        State(upstream): State<Upstream>,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        upstream.responses_calls.lock().unwrap().push(body);
        (upstream.responses_status, upstream.responses_body.clone())
    }

    async fn chat_handler(
        State(upstream): State<Upstream>,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        upstream.chat_calls.lock().unwrap().push(body);
        (upstream.chat_status, upstream.chat_body.clone())
    }

    #[tokio::test]
    async fn test_rewrite_returns_preferred_output_trimmed() {
        let (client, upstream) = Upstream::new().spawn().await;

        let improved =
            rewrite_prompt(&client, "explain machine learning", OptimizationMode::Standard)
                .await
                .unwrap();

        // Whitespace-stripped, otherwise unmodified; fallback never touched.
        assert_eq!(improved, IMPROVED);
        assert!(upstream.chat_calls.lock().unwrap().is_empty());

        let calls = upstream.responses_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["model"], OPTIMIZER_MODEL);
        assert_eq!(calls[0]["reasoning"]["effort"], REWRITE_EFFORT);
        assert_eq!(calls[0]["input"][0]["role"], "system");
        assert_eq!(
            calls[0]["input"][0]["content"],
            build_instruction(OptimizationMode::Standard)
        );
        assert_eq!(calls[0]["input"][1]["role"], "user");
        assert_eq!(
            calls[0]["input"][1]["content"],
            "Optimize this prompt: explain machine learning"
        );
    }

    #[tokio::test]
    async fn test_rewrite_fallback_receives_same_messages() {
        let mut upstream = Upstream::new();
        upstream.responses_status = StatusCode::INTERNAL_SERVER_ERROR;
        upstream.responses_body = json!({"error": {"message": "no reasoning support"}}).to_string();
        let (client, upstream) = upstream.spawn().await;

        let improved =
            rewrite_prompt(&client, "explain machine learning", OptimizationMode::Concise)
                .await
                .unwrap();
        assert_eq!(improved, IMPROVED);

        let responses_calls = upstream.responses_calls.lock().unwrap();
        let chat_calls = upstream.chat_calls.lock().unwrap();
        assert_eq!(responses_calls.len(), 1);
        assert_eq!(chat_calls.len(), 1);

        // Identical two-message structure on both paths, plus the fallback's
        // output cap and low temperature.
        assert_eq!(responses_calls[0]["input"], chat_calls[0]["messages"]);
        assert_eq!(chat_calls[0]["messages"][0]["role"], "system");
        assert_eq!(
            chat_calls[0]["messages"][1]["content"],
            "Optimize this prompt: explain machine learning"
        );
        assert_eq!(chat_calls[0]["max_tokens"], FALLBACK_MAX_TOKENS);
        let temperature = chat_calls[0]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.1).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_rewrite_passes_input_through_unmodified() {
        let (client, upstream) = Upstream::new().spawn().await;

        rewrite_prompt(&client, "", OptimizationMode::Standard)
            .await
            .unwrap();
        let long = "x".repeat(10_000);
        rewrite_prompt(&client, &long, OptimizationMode::Standard)
            .await
            .unwrap();

        let calls = upstream.responses_calls.lock().unwrap();
        assert_eq!(calls[0]["input"][1]["content"], "Optimize this prompt: ");
        assert_eq!(
            calls[1]["input"][1]["content"],
            format!("Optimize this prompt: {long}")
        );
    }

    #[tokio::test]
    async fn test_rewrite_malformed_preferred_body_triggers_fallback() {
        // 200 with an undecodable body counts as a preferred-path failure.
        let mut upstream = Upstream::new();
        upstream.responses_body = "not json".to_string();
        let (client, upstream) = upstream.spawn().await;

        let improved = rewrite_prompt(&client, "hi", OptimizationMode::Standard)
            .await
            .unwrap();

        assert_eq!(improved, IMPROVED);
        assert_eq!(upstream.chat_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rewrite_malformed_bodies_surface_parse_error() {
        let mut upstream = Upstream::new();
        upstream.responses_body = "not json".to_string();
        upstream.chat_body = "also not json".to_string();
        let (client, _upstream) = upstream.spawn().await;

        let err = rewrite_prompt(&client, "hi", OptimizationMode::Standard)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[tokio::test]
    async fn test_rewrite_double_failure_surfaces_fallback_error() {
        let mut upstream = Upstream::new();
        upstream.responses_status = StatusCode::INTERNAL_SERVER_ERROR;
        upstream.responses_body = json!({"error": {"message": "down"}}).to_string();
        upstream.chat_status = StatusCode::BAD_REQUEST;
        upstream.chat_body = json!({"error": {"message": "bad model"}}).to_string();
        let (client, _upstream) = upstream.spawn().await;

        let err = rewrite_prompt(&client, "hi", OptimizationMode::Standard)
            .await
            .unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad model");
            }
            other => panic!("expected fallback API error, got {other:?}"),
        }
    }

    #[test]
    fn test_instruction_is_deterministic() {
        let a = build_instruction(OptimizationMode::Technical);
        let b = build_instruction(OptimizationMode::Technical);
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_mode_yields_standard_instruction() {
        let unknown = build_instruction(OptimizationMode::resolve("not-a-real-mode"));
        let standard = build_instruction(OptimizationMode::Standard);
        assert_eq!(unknown, standard);
    }

    #[test]
    fn test_instruction_contains_base_and_enhancement() {
        let instruction = build_instruction(OptimizationMode::Concise);
        assert!(instruction.starts_with(prompts::SYSTEM_OPTIMIZER));
        assert!(instruction.ends_with(OptimizationMode::Concise.enhancement()));
    }

    #[test]
    fn test_modes_produce_distinct_instructions() {
        let concise = build_instruction(OptimizationMode::Concise);
        let technical = build_instruction(OptimizationMode::Technical);
        assert_ne!(concise, technical);
    }
}
