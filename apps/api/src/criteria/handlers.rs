//! HTTP handler for criteria extraction.

use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::criteria::{extract_search_criteria, JobBrief, SearchCriteria};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/criteria
///
/// Runs the brief through the model and returns criteria the user can edit
/// before launching a search.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(brief): Json<JobBrief>,
) -> Result<Json<SearchCriteria>, AppError> {
    if brief.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description is required".to_string(),
        ));
    }

    let session = state.session().await?;
    info!(
        brief_chars = brief.job_description.len(),
        transcript_chars = brief.transcript.len(),
        "extracting search criteria"
    );
    let criteria = extract_search_criteria(&session.llm, &brief).await?;
    info!(
        titles = criteria.job_titles.include.len(),
        keywords = criteria.keywords.include.len(),
        boolean_chars = criteria.boolean_query.len(),
        "criteria extracted"
    );
    Ok(Json(criteria))
}
