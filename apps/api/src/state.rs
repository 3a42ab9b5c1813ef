use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Built once at startup and read-only afterwards, so cloning per request is
/// cheap and no locking is needed across concurrent handlers.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
}
