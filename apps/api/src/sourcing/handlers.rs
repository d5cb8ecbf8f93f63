//! HTTP handlers for accounts, quota display and search.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::leonar::types::ConnectedAccount;
use crate::sourcing::{run_search, SearchRequest, SearchResponse, MAX_PROFILES_CEILING};
use crate::state::AppState;
use crate::usage::LINKEDIN_DAILY_LIMIT;

#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    pub accounts: Vec<ConnectedAccount>,
}

/// GET /api/v1/accounts, the connected LinkedIn accounts for the picker.
pub async fn handle_list_accounts(
    State(state): State<AppState>,
) -> Result<Json<AccountsResponse>, AppError> {
    let session = state.session().await?;
    let accounts = session.leonar.connected_accounts().await?;
    info!(count = accounts.len(), "connected accounts fetched");
    Ok(Json(AccountsResponse { accounts }))
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub viewed_today: u64,
    pub daily_limit: u64,
    pub remaining: u64,
}

/// GET /api/v1/usage, the state of the daily LinkedIn viewing counter.
pub async fn handle_usage(State(state): State<AppState>) -> Json<UsageResponse> {
    let viewed_today = state.usage.count_today().await;
    Json(UsageResponse {
        viewed_today,
        daily_limit: LINKEDIN_DAILY_LIMIT,
        remaining: LINKEDIN_DAILY_LIMIT.saturating_sub(viewed_today),
    })
}

/// POST /api/v1/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    if request.project_id.trim().is_empty() {
        return Err(AppError::Validation("project_id is required".to_string()));
    }
    if request.max_profiles == 0 || request.max_profiles > MAX_PROFILES_CEILING {
        return Err(AppError::Validation(format!(
            "max_profiles must be between 1 and {MAX_PROFILES_CEILING}"
        )));
    }

    let session = state.session().await?;
    info!(
        source = request.source_type.as_str(),
        max_profiles = request.max_profiles,
        "search requested"
    );
    let response = run_search(&session.leonar, &state.usage, &request).await?;
    Ok(Json(response))
}
