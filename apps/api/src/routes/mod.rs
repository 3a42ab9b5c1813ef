pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::optimizer::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz_handler))
        .route("/modes", get(handlers::handle_modes))
        .route("/optimize", post(handlers::handle_optimize))
        .route("/chat", post(handlers::handle_chat))
        .with_state(state)
}
