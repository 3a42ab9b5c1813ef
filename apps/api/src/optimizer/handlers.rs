//! Axum route handlers for the optimizer API.

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::{with_fallback, ChatMessage};
use crate::optimizer::modes::OptimizationMode;
use crate::optimizer::rewrite::rewrite_prompt;
use crate::state::AppState;

/// Output cap and temperature for final-answer fallback calls, matching the
/// rewrite engine's fallback settings.
const ANSWER_MAX_TOKENS: u32 = 1000;
const ANSWER_TEMPERATURE: f32 = 0.1;

fn default_target_model() -> String {
    "gpt-5".to_string()
}

fn default_reasoning_effort() -> String {
    "medium".to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub text: String,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub improved_prompt: String,
    pub mode_used: &'static str,
    pub original_length: usize,
    pub optimized_length: usize,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_input: String,
    #[serde(default = "default_target_model")]
    pub target_model: String,
    /// none|low|medium|high
    #[serde(default = "default_reasoning_effort")]
    pub reasoning_effort: String,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub optimization_mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub improved_prompt: String,
    pub final_answer: String,
    pub optimization_mode: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ModeInfo {
    pub mode: OptimizationMode,
    pub name: &'static str,
    pub description: &'static str,
    pub best_for: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AvailableModesResponse {
    pub modes: Vec<ModeInfo>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /modes
///
/// Advertises every registered optimization mode with human-readable
/// metadata, in registry order.
pub async fn handle_modes() -> Json<AvailableModesResponse> {
    let modes = OptimizationMode::all()
        .iter()
        .map(|&mode| {
            let (name, description, best_for) = mode_metadata(mode);
            ModeInfo {
                mode,
                name,
                description,
                best_for,
            }
        })
        .collect();

    Json(AvailableModesResponse { modes })
}

/// POST /optimize
///
/// Rewrites a prompt using the requested mode. An unknown mode string
/// degrades silently to `standard` — always 200, never 4xx for that reason.
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, AppError> {
    let mode = OptimizationMode::resolve(request.mode.as_deref().unwrap_or("standard"));
    let improved = rewrite_prompt(&state.llm, &request.text, mode).await?;

    Ok(Json(OptimizeResponse {
        original_length: request.text.chars().count(),
        optimized_length: improved.chars().count(),
        improved_prompt: improved,
        mode_used: mode.as_str(),
    }))
}

/// POST /chat
///
/// Two sequential upstream passes: rewrite the prompt, then send the
/// improved prompt to the caller-chosen target model for the final answer.
/// The rewrite always completes before the final-answer call starts, since
/// the second call's input is the first call's output. With `stream: true`
/// the answer is forwarded as raw text fragments in upstream arrival order.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, AppError> {
    let mode = OptimizationMode::resolve(request.optimization_mode.as_deref().unwrap_or("standard"));
    let improved = rewrite_prompt(&state.llm, &request.user_input, mode).await?;

    // Single instruction-free user turn: the improved prompt stands alone.
    let messages = [ChatMessage::user(improved.clone())];
    let llm = &state.llm;
    let model = &request.target_model;
    let effort = &request.reasoning_effort;

    if request.stream {
        let deltas = with_fallback(
            || llm.respond_stream(model, effort, &messages),
            || llm.chat_completion_stream(model, &messages, ANSWER_MAX_TOKENS, ANSWER_TEMPERATURE),
        )
        .await?;

        // Fragments flow straight through; dropping the body on client
        // disconnect releases the upstream stream.
        return Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            Body::from_stream(deltas.map(|fragment| fragment.map(Bytes::from))),
        )
            .into_response());
    }

    let final_answer = with_fallback(
        || llm.respond(model, effort, &messages),
        || llm.chat_completion(model, &messages, ANSWER_MAX_TOKENS, ANSWER_TEMPERATURE),
    )
    .await?;

    Ok(Json(ChatResponse {
        improved_prompt: improved,
        final_answer,
        optimization_mode: mode.as_str(),
    })
    .into_response())
}

/// Presentation metadata for `/modes`: (name, description, best_for).
/// Owned by this boundary layer, not the registry.
fn mode_metadata(mode: OptimizationMode) -> (&'static str, &'static str, &'static str) {
    match mode {
        OptimizationMode::Standard => (
            "Standard",
            "Balanced optimization with good structure and detail",
            "General use cases",
        ),
        OptimizationMode::Concise => (
            "Concise",
            "Brief but complete responses with clear formatting",
            "Quick answers and summaries",
        ),
        OptimizationMode::DeepDive => (
            "Deep Dive",
            "Comprehensive analysis with multiple perspectives",
            "Research and detailed analysis",
        ),
        OptimizationMode::Creative => (
            "Creative",
            "Innovative thinking and alternative approaches",
            "Brainstorming and creative tasks",
        ),
        OptimizationMode::Technical => (
            "Technical",
            "Technical details, code examples, and specifications",
            "Programming and technical work",
        ),
        OptimizationMode::Academic => (
            "Academic",
            "Scholarly analysis with formal language",
            "Academic writing and research",
        ),
        OptimizationMode::Business => (
            "Business",
            "Practical business insights and ROI focus",
            "Business planning and strategy",
        ),
        OptimizationMode::Educational => (
            "Educational",
            "Learning-focused explanations with examples",
            "Teaching and learning",
        ),
    }
}
