pub mod health;
pub mod session;

use axum::response::Html;
use axum::{
    routing::{get, post},
    Router,
};

use crate::criteria::handlers as criteria_handlers;
use crate::push;
use crate::scoring::handlers as scoring_handlers;
use crate::sourcing::handlers as sourcing_handlers;
use crate::state::AppState;

/// The single-page UI, embedded at compile time so the binary is
/// self-contained.
async fn handle_ui() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_ui))
        .route("/health", get(health::health_handler))
        // Session: API keys in, status out
        .route(
            "/api/v1/session",
            post(session::handle_configure).get(session::handle_status),
        )
        // Search surface
        .route(
            "/api/v1/accounts",
            get(sourcing_handlers::handle_list_accounts),
        )
        .route("/api/v1/usage", get(sourcing_handlers::handle_usage))
        .route("/api/v1/search", post(sourcing_handlers::handle_search))
        // Pipeline steps
        .route("/api/v1/criteria", post(criteria_handlers::handle_extract))
        .route("/api/v1/score", post(scoring_handlers::handle_score))
        .route("/api/v1/push", post(push::handle_push))
        .with_state(state)
}
