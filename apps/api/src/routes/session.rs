//! Session management: the two vendor API keys arrive here from the UI.
//!
//! Keys are held in memory inside the vendor clients and nowhere else; they
//! are not validated up front, a bad key surfaces on the first call that
//! uses it, already mapped to a readable error.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::leonar::LeonarClient;
use crate::llm_client::LlmClient;
use crate::state::{AppState, Session};

#[derive(Debug, Deserialize)]
pub struct ConfigureRequest {
    pub leonar_api_key: String,
    pub anthropic_api_key: String,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub configured: bool,
}

/// POST /api/v1/session
///
/// Accepts both keys and swaps in a fresh pair of clients. Submitting again
/// replaces the previous session wholesale.
pub async fn handle_configure(
    State(state): State<AppState>,
    Json(request): Json<ConfigureRequest>,
) -> Result<Json<SessionStatus>, AppError> {
    let leonar_key = request.leonar_api_key.trim();
    let anthropic_key = request.anthropic_api_key.trim();
    if leonar_key.is_empty() || anthropic_key.is_empty() {
        return Err(AppError::Validation(
            "both API keys are required".to_string(),
        ));
    }

    let session = Session {
        leonar: LeonarClient::new(leonar_key.to_string())?,
        llm: LlmClient::new(anthropic_key.to_string())?,
    };
    state.set_session(session).await;
    info!("session configured, vendor clients rebuilt");

    Ok(Json(SessionStatus { configured: true }))
}

/// GET /api/v1/session
pub async fn handle_status(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(SessionStatus {
        configured: state.has_session().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::UsageTracker;

    fn make_state() -> AppState {
        AppState::new(UsageTracker::new(&std::env::temp_dir()))
    }

    #[tokio::test]
    async fn test_configure_rejects_blank_keys() {
        let state = make_state();
        let request = ConfigureRequest {
            leonar_api_key: "  ".to_string(),
            anthropic_api_key: "sk-ant-xxx".to_string(),
        };
        let result = handle_configure(State(state.clone()), Json(request)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(!state.has_session().await);
    }

    #[tokio::test]
    async fn test_configure_then_status() {
        let state = make_state();
        let request = ConfigureRequest {
            leonar_api_key: "leonar-key".to_string(),
            anthropic_api_key: "sk-ant-xxx".to_string(),
        };
        handle_configure(State(state.clone()), Json(request))
            .await
            .unwrap();

        let Json(status) = handle_status(State(state)).await;
        assert!(status.configured);
    }
}
