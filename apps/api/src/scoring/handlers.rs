//! HTTP handler for batch scoring.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::criteria::JobBrief;
use crate::errors::AppError;
use crate::leonar::types::Profile;
use crate::scoring::{score_all, ScoredProfile};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub brief: JobBrief,
    /// Criteria summary shown to the model for context.
    #[serde(default)]
    pub criteria_summary: String,
    #[serde(default)]
    pub exclusions: Vec<String>,
    pub profiles: Vec<Profile>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub profiles: Vec<ScoredProfile>,
    /// Number of profiles that went through scoring, threshold not applied.
    pub scored_count: usize,
}

/// POST /api/v1/score
///
/// Scores the posted profiles against the brief and returns them best-first.
/// Threshold filtering happens in the browser so the user can adjust the
/// cut-off without re-scoring.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    if request.profiles.is_empty() {
        return Err(AppError::Validation("profiles list is empty".to_string()));
    }

    let session = state.session().await?;
    info!(profiles = request.profiles.len(), "scoring profiles");
    let scored = score_all(
        &session.llm,
        &request.profiles,
        &request.brief,
        &request.criteria_summary,
        &request.exclusions,
    )
    .await?;

    let scored_count = scored.len();
    Ok(Json(ScoreResponse {
        profiles: scored,
        scored_count,
    }))
}
