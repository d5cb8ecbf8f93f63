//! Write-back: adds selected profiles to the Leonar project, then attaches a
//! score note and a score-band tag to each created contact.
//!
//! Adding profiles is all-or-nothing per batch; note and tag writes are
//! best-effort, a failed note leaves the contact in the project without
//! one. Contact ids come back in submission order, which is how they are
//! paired with their scores.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::leonar::types::ProfilePayload;
use crate::leonar::{LeonarClient, LeonarError};
use crate::scoring::ScoredProfile;
use crate::state::AppState;

/// Profiles per add-to-project call; the endpoint accepts at most 100.
pub const PUSH_BATCH_SIZE: usize = 50;
const BATCH_DELAY_MS: u64 = 500;
const NOTE_DELAY_MS: u64 = 200;

#[derive(Debug, Deserialize)]
pub struct PushRequest {
    pub project_id: String,
    /// Server-side guard matching the browser's threshold slider.
    #[serde(default)]
    pub min_score: u8,
    pub profiles: Vec<ScoredProfile>,
}

#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub added: u64,
    pub notes_written: usize,
    pub tags_written: usize,
    pub note_failures: usize,
}

/// POST /api/v1/push
pub async fn handle_push(
    State(state): State<AppState>,
    Json(request): Json<PushRequest>,
) -> Result<Json<PushResponse>, AppError> {
    if request.project_id.trim().is_empty() {
        return Err(AppError::Validation("project_id is required".to_string()));
    }

    let selected: Vec<ScoredProfile> = request
        .profiles
        .into_iter()
        .filter(|profile| profile.score >= request.min_score)
        .collect();
    if selected.is_empty() {
        return Err(AppError::Validation(
            "no profiles at or above the minimum score".to_string(),
        ));
    }

    let session = state.session().await?;
    info!(
        profiles = selected.len(),
        min_score = request.min_score,
        "pushing profiles to project"
    );
    let outcome = push_profiles(&session.leonar, &request.project_id, &selected).await?;
    Ok(Json(outcome))
}

/// Pushes profiles in batches, then writes one note and one tag per created
/// contact.
pub async fn push_profiles(
    leonar: &LeonarClient,
    project_id: &str,
    profiles: &[ScoredProfile],
) -> Result<PushResponse, LeonarError> {
    let payloads: Vec<ProfilePayload> = profiles
        .iter()
        .map(|scored| ProfilePayload::from(&scored.profile))
        .collect();

    let mut added: u64 = 0;
    let mut contact_ids: Vec<String> = Vec::new();
    for (index, batch) in payloads.chunks(PUSH_BATCH_SIZE).enumerate() {
        if index > 0 {
            tokio::time::sleep(Duration::from_millis(BATCH_DELAY_MS)).await;
        }
        let result = leonar.add_to_project(project_id, batch).await?;
        added += result.added;
        contact_ids.extend(result.contact_ids);
        info!(added, "profiles added to project");
    }

    let mut notes_written = 0;
    let mut tags_written = 0;
    let mut note_failures = 0;
    for (index, contact_id) in contact_ids.iter().enumerate() {
        let Some(scored) = profiles.get(index) else {
            break;
        };

        let note = format!("AI score: {}/10\n{}", scored.score, scored.justification);
        match leonar.add_note(contact_id, &note).await {
            Ok(()) => notes_written += 1,
            Err(err) => {
                warn!(%err, contact_id, "failed to write score note");
                note_failures += 1;
            }
        }

        if let Err(err) = leonar.add_tag(contact_id, score_band(scored.score)).await {
            warn!(%err, contact_id, "failed to tag contact");
        } else {
            tags_written += 1;
        }

        tokio::time::sleep(Duration::from_millis(NOTE_DELAY_MS)).await;
    }

    Ok(PushResponse {
        added,
        notes_written,
        tags_written,
        note_failures,
    })
}

/// Tag name for a score, matching the rubric bands.
pub fn score_band(score: u8) -> &'static str {
    match score {
        8.. => "score-excellent",
        6..=7 => "score-good",
        4..=5 => "score-partial",
        _ => "score-weak",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State as AxumState};
    use axum::routing::post;
    use axum::Router;
    use serde_json::{json, Value};

    use crate::leonar::types::Profile;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn scored(id: &str, score: u8, justification: &str) -> ScoredProfile {
        ScoredProfile {
            profile: Profile {
                profile_id: id.to_string(),
                first_name: Some("Ada".to_string()),
                last_name: Some(id.to_string()),
                ..Profile::default()
            },
            score,
            justification: justification.to_string(),
        }
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(score_band(10), "score-excellent");
        assert_eq!(score_band(8), "score-excellent");
        assert_eq!(score_band(7), "score-good");
        assert_eq!(score_band(5), "score-partial");
        assert_eq!(score_band(3), "score-weak");
        assert_eq!(score_band(0), "score-weak");
    }

    #[derive(Clone, Default)]
    struct Recorded {
        notes: Arc<Mutex<Vec<(String, String)>>>,
        tags: Arc<Mutex<Vec<(String, String)>>>,
    }

    fn stub_router(recorded: Recorded) -> Router {
        Router::new()
            .route(
                "/sourcing/add-to-project",
                post(|Json(body): Json<Value>| async move {
                    let profiles = body["profiles"].as_array().unwrap();
                    let contact_ids: Vec<String> = profiles
                        .iter()
                        .map(|p| format!("contact-{}", p["profile_id"].as_str().unwrap()))
                        .collect();
                    Json(json!({"data": {"added": profiles.len(), "contact_ids": contact_ids}}))
                }),
            )
            .route(
                "/contacts/:id/notes",
                post(
                    |AxumState(recorded): AxumState<Recorded>,
                     Path(id): Path<String>,
                     Json(body): Json<Value>| async move {
                        recorded
                            .notes
                            .lock()
                            .unwrap()
                            .push((id, body["content"].as_str().unwrap().to_string()));
                        Json(json!({"data": {"id": "note"}}))
                    },
                ),
            )
            .route(
                "/contacts/:id/tags",
                post(
                    |AxumState(recorded): AxumState<Recorded>,
                     Path(id): Path<String>,
                     Json(body): Json<Value>| async move {
                        recorded
                            .tags
                            .lock()
                            .unwrap()
                            .push((id, body["name"].as_str().unwrap().to_string()));
                        Json(json!({"data": {"id": "tag"}}))
                    },
                ),
            )
            .with_state(recorded)
    }

    #[tokio::test]
    async fn test_push_writes_notes_and_band_tags() {
        let recorded = Recorded::default();
        let base = serve(stub_router(recorded.clone())).await;
        let leonar = LeonarClient::with_base_url("k".to_string(), base).unwrap();

        let profiles = vec![
            scored("a", 9, "excellent profile"),
            scored("b", 6, "decent fit"),
        ];
        let outcome = push_profiles(&leonar, "proj-1", &profiles).await.unwrap();

        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.notes_written, 2);
        assert_eq!(outcome.tags_written, 2);
        assert_eq!(outcome.note_failures, 0);

        let notes = recorded.notes.lock().unwrap();
        assert_eq!(notes[0].0, "contact-a");
        assert_eq!(notes[0].1, "AI score: 9/10\nexcellent profile");

        let tags = recorded.tags.lock().unwrap();
        assert_eq!(tags[0].1, "score-excellent");
        assert_eq!(tags[1].1, "score-good");
    }

    #[tokio::test]
    async fn test_push_survives_note_failures() {
        let recorded = Recorded::default();
        let router = Router::new()
            .route(
                "/sourcing/add-to-project",
                post(|| async {
                    Json(json!({"data": {"added": 1, "contact_ids": ["contact-a"]}}))
                }),
            )
            .route(
                "/contacts/:id/notes",
                post(|| async {
                    (
                        axum::http::StatusCode::NOT_FOUND,
                        Json(json!({"error": {"code": "not_found", "message": "no contact"}})),
                    )
                }),
            )
            .route(
                "/contacts/:id/tags",
                post(
                    |AxumState(recorded): AxumState<Recorded>, Path(id): Path<String>| async move {
                        recorded.tags.lock().unwrap().push((id, String::new()));
                        Json(json!({"data": {}}))
                    },
                ),
            )
            .with_state(recorded.clone());
        let base = serve(router).await;
        let leonar = LeonarClient::with_base_url("k".to_string(), base).unwrap();

        let profiles = vec![scored("a", 7, "ok")];
        let outcome = push_profiles(&leonar, "proj-1", &profiles).await.unwrap();

        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.notes_written, 0);
        assert_eq!(outcome.note_failures, 1);
        assert_eq!(outcome.tags_written, 1);
    }

    #[tokio::test]
    async fn test_push_batches_at_fifty() {
        let batch_sizes = Arc::new(Mutex::new(Vec::new()));
        let sizes = batch_sizes.clone();
        let router = Router::new()
            .route(
                "/sourcing/add-to-project",
                post(
                    |AxumState(sizes): AxumState<Arc<Mutex<Vec<usize>>>>,
                     Json(body): Json<Value>| async move {
                        let count = body["profiles"].as_array().unwrap().len();
                        sizes.lock().unwrap().push(count);
                        // No contact ids, so the note loop is skipped.
                        Json(json!({"data": {"added": count, "contact_ids": []}}))
                    },
                ),
            )
            .with_state(sizes);
        let base = serve(router).await;
        let leonar = LeonarClient::with_base_url("k".to_string(), base).unwrap();

        let profiles: Vec<ScoredProfile> = (0..70)
            .map(|i| scored(&format!("p{i}"), 8, "x"))
            .collect();
        let outcome = push_profiles(&leonar, "proj-1", &profiles).await.unwrap();

        assert_eq!(outcome.added, 70);
        assert_eq!(*batch_sizes.lock().unwrap(), vec![50, 20]);
    }
}
