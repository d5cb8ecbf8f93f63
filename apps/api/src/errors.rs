use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::leonar::LeonarError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Vendor errors are surfaced to the user with their original message: a
/// failed Leonar or Claude call terminates the current action and the UI
/// renders the reason.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("API keys not configured, enter them in the UI first")]
    MissingCredentials,

    #[error("Leonar error: {0}")]
    Leonar(#[from] LeonarError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "MISSING_CREDENTIALS",
                self.to_string(),
            ),
            AppError::Leonar(e) => {
                tracing::error!("Leonar error: {e}");
                let (status, code) = leonar_status(e);
                (status, code, e.to_string())
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (StatusCode::BAD_GATEWAY, "LLM_ERROR", e.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// Maps a Leonar client error onto an HTTP status and a stable error code
/// the UI can branch on (auth problems prompt re-entering the key).
fn leonar_status(e: &LeonarError) -> (StatusCode, &'static str) {
    match e {
        LeonarError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "LEONAR_INVALID_API_KEY"),
        LeonarError::InsufficientScope { .. } => (StatusCode::FORBIDDEN, "LEONAR_SCOPE"),
        LeonarError::BillingRequired | LeonarError::PlanUpgradeRequired => {
            (StatusCode::PAYMENT_REQUIRED, "LEONAR_PLAN")
        }
        LeonarError::Validation { .. } => (StatusCode::BAD_REQUEST, "LEONAR_VALIDATION"),
        LeonarError::NotFound { .. } => (StatusCode::NOT_FOUND, "LEONAR_NOT_FOUND"),
        LeonarError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "LEONAR_RATE_LIMITED"),
        LeonarError::Http(_) | LeonarError::Api { .. } => (StatusCode::BAD_GATEWAY, "LEONAR_ERROR"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_api_key_maps_to_401() {
        let (status, code) = leonar_status(&LeonarError::InvalidApiKey);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(code, "LEONAR_INVALID_API_KEY");
    }

    #[test]
    fn test_rate_limited_maps_to_429() {
        let (status, _) = leonar_status(&LeonarError::RateLimited { attempts: 5 });
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_scope_error_maps_to_403() {
        let err = LeonarError::InsufficientScope {
            message: "missing sourcing:write".to_string(),
        };
        let (status, code) = leonar_status(&err);
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(code, "LEONAR_SCOPE");
    }
}
