use axum::Json;
use serde_json::{json, Value};

/// GET /healthz
/// Liveness probe: fixed status payload with service version and features.
pub async fn healthz_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "features": ["multi-mode-optimization", "advanced-prompt-engineering"]
    }))
}
