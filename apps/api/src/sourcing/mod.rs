//! Profile search across the three back-ends (LinkedIn, Leonar database,
//! CRM contacts), followed by the shared cleanup pipeline: dedupe, drop
//! profiles already in the target project, then the region safety net.
//!
//! LinkedIn searches run against a daily viewing quota and pace their pages
//! with a randomized delay; database searches page politely at a fixed rate.

pub mod filters;
pub mod handlers;

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::criteria::boolean::sanitize_boolean_query;
use crate::criteria::SearchCriteria;
use crate::errors::AppError;
use crate::leonar::types::{
    LinkedInLocation, LinkedInSearchRequest, Profile, SourcingSearchRequest,
};
use crate::leonar::LeonarClient;
use crate::usage::{UsageTracker, LINKEDIN_DAILY_LIMIT};

pub const SEARCH_PAGE_SIZE: u32 = 25;
pub const MAX_PROFILES_CEILING: usize = 1000;
const CRM_PAGE_DELAY_MS: u64 = 500;
/// LinkedIn pages are paced with a random human-ish delay in this range.
const LINKEDIN_PAGE_DELAY_SECS: (f64, f64) = (2.0, 4.0);

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    LeonarSource,
    Linkedin,
    Contacts,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::LeonarSource => "leonar_source",
            SourceType::Linkedin => "linkedin",
            SourceType::Contacts => "contacts",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub project_id: String,
    pub source_type: SourceType,
    /// Connected account to search through; LinkedIn only.
    #[serde(default)]
    pub account_id: Option<String>,
    /// Criteria as edited by the user, not necessarily as extracted.
    pub criteria: SearchCriteria,
    /// Extra exclusion keywords typed alongside the brief.
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default = "default_max_profiles")]
    pub max_profiles: usize,
    /// Free-text region from the brief, drives the post-search safety net.
    #[serde(default)]
    pub region: String,
}

fn default_max_profiles() -> usize {
    100
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub profiles: Vec<Profile>,
    /// Raw count before any cleanup.
    pub total_fetched: usize,
    pub duplicates_removed: usize,
    pub already_in_project: usize,
    pub outside_region: usize,
    /// Set when Leonar reports the filter combination matches nothing.
    pub filters_too_strict: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_viewed_today: Option<u64>,
    /// Region names resolved to LinkedIn locations, for display.
    pub resolved_locations: Vec<LinkedInLocation>,
    pub warnings: Vec<String>,
}

/// User-facing messages accumulated while fetching.
#[derive(Debug, Default)]
struct SearchLog {
    warnings: Vec<String>,
    resolved_locations: Vec<LinkedInLocation>,
    filters_too_strict: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestration
// ────────────────────────────────────────────────────────────────────────────

/// Runs a full search: fetch pages from the selected back-end, then dedupe,
/// drop existing project members and apply the region safety net.
pub async fn run_search(
    leonar: &LeonarClient,
    usage: &UsageTracker,
    request: &SearchRequest,
) -> Result<SearchResponse, AppError> {
    let mut log = SearchLog::default();

    let fetched = match request.source_type {
        SourceType::Linkedin => fetch_linkedin(leonar, usage, request, &mut log).await?,
        SourceType::LeonarSource | SourceType::Contacts => {
            fetch_database(leonar, request, &mut log).await?
        }
    };
    let total_fetched = fetched.len();

    let linkedin_viewed_today = match request.source_type {
        SourceType::Linkedin => Some(usage.count_today().await),
        _ => None,
    };

    if fetched.is_empty() {
        return Ok(SearchResponse {
            profiles: Vec::new(),
            total_fetched: 0,
            duplicates_removed: 0,
            already_in_project: 0,
            outside_region: 0,
            filters_too_strict: log.filters_too_strict,
            linkedin_viewed_today,
            resolved_locations: log.resolved_locations,
            warnings: log.warnings,
        });
    }

    let deduped = filters::deduplicate(fetched);
    let duplicates_removed = total_fetched - deduped.len();

    let walk = leonar.project_entries(&request.project_id).await;
    if !walk.complete {
        log.warnings.push(
            "could not fully check existing project members; some profiles may already be in the project"
                .to_string(),
        );
    }
    let (fresh, already_in_project) = filters::exclude_existing(deduped, &walk.entries);

    // LinkedIn results already went through the location filter server-side.
    let (profiles, outside) = match request.source_type {
        SourceType::Linkedin => (fresh, Vec::new()),
        _ => filters::filter_by_region(fresh, &request.region),
    };

    info!(
        kept = profiles.len(),
        total_fetched,
        duplicates_removed,
        already_in_project,
        outside_region = outside.len(),
        source = request.source_type.as_str(),
        "search complete"
    );

    Ok(SearchResponse {
        profiles,
        total_fetched,
        duplicates_removed,
        already_in_project,
        outside_region: outside.len(),
        filters_too_strict: log.filters_too_strict,
        linkedin_viewed_today,
        resolved_locations: log.resolved_locations,
        warnings: log.warnings,
    })
}

/// LinkedIn back-end: resolve locations, then page through live results
/// under the daily viewing quota.
async fn fetch_linkedin(
    leonar: &LeonarClient,
    usage: &UsageTracker,
    request: &SearchRequest,
    log: &mut SearchLog,
) -> Result<Vec<Profile>, AppError> {
    let account_id = request
        .account_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            AppError::Validation("account_id is required for LinkedIn searches".to_string())
        })?;

    let remaining = usage.remaining().await;
    if remaining == 0 {
        return Err(AppError::Validation(format!(
            "daily LinkedIn limit of {LINKEDIN_DAILY_LIMIT} viewed profiles reached; retry tomorrow or search the Leonar database"
        )));
    }
    let mut budget = request.max_profiles;
    if budget as u64 > remaining {
        log.warnings.push(format!(
            "only {remaining} LinkedIn profile views left today, search capped"
        ));
        budget = remaining as usize;
    }

    // Resolve region names to LinkedIn location ids through the account;
    // first hit wins, misses become warnings.
    let mut location_ids: Vec<String> = Vec::new();
    for region in &request.criteria.locations.regions {
        let hits = leonar.linkedin_locations(region, account_id).await?;
        match hits.into_iter().next() {
            Some(location) => {
                if !location_ids.contains(&location.id) {
                    location_ids.push(location.id.clone());
                }
                info!(region, title = %location.title, id = %location.id, "LinkedIn location resolved");
                log.resolved_locations.push(location);
            }
            None => log
                .warnings
                .push(format!("LinkedIn location '{region}' not found")),
        }
    }

    let job_titles = (!request.criteria.job_titles.include.is_empty())
        .then(|| request.criteria.job_titles.include.clone());
    let boolean_query = {
        let trimmed = request.criteria.boolean_query.trim();
        (!trimmed.is_empty()).then(|| sanitize_boolean_query(trimmed))
    };
    let years_experience = request
        .criteria
        .years_experience
        .is_set()
        .then_some(request.criteria.years_experience);

    let mut collected: Vec<Profile> = Vec::new();
    let mut page: u32 = 1;
    while collected.len() < budget {
        if usage.count_today().await >= LINKEDIN_DAILY_LIMIT {
            log.warnings
                .push("daily LinkedIn limit reached mid-search, stopping".to_string());
            break;
        }

        let page_request = LinkedInSearchRequest {
            project_id: request.project_id.clone(),
            account_id: account_id.to_string(),
            page,
            page_size: SEARCH_PAGE_SIZE,
            job_titles: job_titles.clone(),
            location_ids: (!location_ids.is_empty()).then(|| location_ids.clone()),
            years_experience,
            boolean_query: boolean_query.clone(),
        };
        let result = leonar.linkedin_search(&page_request).await?;
        if result.profiles.is_empty() {
            break;
        }

        // Every fetched profile counts as viewed, including the ones the
        // already-in-project filter drops right after.
        usage.add(result.profiles.len() as u64).await;

        let total_count = result.total_count;
        let has_more = result.has_more;
        collected.extend(
            result
                .profiles
                .into_iter()
                .filter(|profile| !profile.already_in_project),
        );
        info!(
            collected = collected.len(),
            total = ?total_count,
            page,
            "LinkedIn page fetched"
        );

        if !has_more {
            break;
        }
        page += 1;

        // thread_rng is not Send; scope it so the future stays Send.
        let pause = {
            let mut rng = rand::thread_rng();
            rng.gen_range(LINKEDIN_PAGE_DELAY_SECS.0..LINKEDIN_PAGE_DELAY_SECS.1)
        };
        tokio::time::sleep(Duration::from_secs_f64(pause)).await;
    }

    collected.truncate(budget);
    Ok(collected)
}

/// Database and CRM back-end: one filters object, fixed-rate paging.
async fn fetch_database(
    leonar: &LeonarClient,
    request: &SearchRequest,
    log: &mut SearchLog,
) -> Result<Vec<Profile>, AppError> {
    let filters =
        filters::build_sourcing_filters(&request.criteria, &request.exclusions, request.source_type);

    let mut collected: Vec<Profile> = Vec::new();
    let mut page: u32 = 1;
    loop {
        let page_request = SourcingSearchRequest {
            project_id: request.project_id.clone(),
            source_type: request.source_type.as_str().to_string(),
            filters: filters.clone(),
            page,
            page_size: SEARCH_PAGE_SIZE,
        };
        let result = leonar.sourcing_search(&page_request).await?;
        log.filters_too_strict = result.filters_too_strict;
        if result.profiles.is_empty() {
            break;
        }

        let total_count = result.total_count;
        let has_more = result.has_more;
        collected.extend(result.profiles);
        info!(
            collected = collected.len(),
            total = ?total_count,
            page,
            "database page fetched"
        );

        if collected.len() >= request.max_profiles || !has_more {
            break;
        }
        page += 1;
        tokio::time::sleep(Duration::from_millis(CRM_PAGE_DELAY_MS)).await;
    }

    collected.truncate(request.max_profiles);
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use crate::criteria::{IncludeExclude, Locations};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn base_request(source_type: SourceType) -> SearchRequest {
        SearchRequest {
            project_id: "proj-1".to_string(),
            source_type,
            account_id: None,
            criteria: SearchCriteria::default(),
            exclusions: Vec::new(),
            max_profiles: 100,
            region: String::new(),
        }
    }

    fn named_profile(id: &str, first: &str, last: &str, location: &str) -> Value {
        json!({
            "profile_id": id,
            "first_name": first,
            "last_name": last,
            "location": location,
            "linkedin_url": format!("https://linkedin.com/in/{id}")
        })
    }

    #[tokio::test]
    async fn test_database_search_pages_then_cleans() {
        let router = Router::new()
            .route(
                "/sourcing/search",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["source_type"], "leonar_source");
                    assert_eq!(body["filters"]["locations"]["countries"][0], "France");
                    let page = body["page"].as_u64().unwrap();
                    if page == 1 {
                        Json(json!({"data": {
                            "profiles": [
                                named_profile("p1", "Ada", "Martin", "Paris, Île-de-France"),
                                // Same URL as p1, dropped by dedupe.
                                {"profile_id": "p1b", "first_name": "Someone", "last_name": "Else",
                                 "location": "Paris", "linkedin_url": "https://linkedin.com/in/p1"},
                            ],
                            "has_more": true,
                            "total_count": 4
                        }}))
                    } else {
                        Json(json!({"data": {
                            "profiles": [
                                named_profile("p3", "Jo", "Durand", "Paris"),
                                named_profile("p4", "Out", "Side", "Marseille, PACA"),
                            ],
                            "has_more": false
                        }}))
                    }
                }),
            )
            .route(
                "/projects/:id/entries",
                get(|| async {
                    Json(json!({
                        "data": [{"contact": {"first_name": "Jo", "last_name": "Durand"}}],
                        "meta": {"has_more": false}
                    }))
                }),
            );

        let base = serve(router).await;
        let leonar = LeonarClient::with_base_url("k".to_string(), base).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let usage = UsageTracker::new(dir.path());

        let mut request = base_request(SourceType::LeonarSource);
        request.region = "Paris".to_string();

        let response = run_search(&leonar, &usage, &request).await.unwrap();
        assert_eq!(response.total_fetched, 4);
        assert_eq!(response.duplicates_removed, 1);
        assert_eq!(response.already_in_project, 1);
        assert_eq!(response.outside_region, 1);
        assert_eq!(response.profiles.len(), 1);
        assert_eq!(response.profiles[0].profile_id, "p1");
        assert_eq!(response.linkedin_viewed_today, None);
        assert!(!response.filters_too_strict);
    }

    #[tokio::test]
    async fn test_linkedin_search_caps_to_remaining_quota() {
        let router = Router::new()
            .route(
                "/sourcing/linkedin/search",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["account_id"], "acc-1");
                    assert_eq!(body["boolean_query"], "(cfo) AND NOT (junior)");
                    assert!(body.get("years_experience").is_none());
                    let profiles: Vec<Value> = (0..25)
                        .map(|i| {
                            named_profile(
                                &format!("p{i}"),
                                &format!("First{i}"),
                                &format!("Last{i}"),
                                "Paris",
                            )
                        })
                        .collect();
                    Json(json!({"data": {"profiles": profiles, "has_more": true, "total_count": 500}}))
                }),
            )
            .route(
                "/projects/:id/entries",
                get(|| async { Json(json!({"data": [], "meta": {"has_more": false}})) }),
            );

        let base = serve(router).await;
        let leonar = LeonarClient::with_base_url("k".to_string(), base).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let usage = UsageTracker::new(dir.path());
        usage.add(995).await;

        let mut request = base_request(SourceType::Linkedin);
        request.account_id = Some("acc-1".to_string());
        request.criteria.boolean_query = "(cfo)\nNOT (junior)".to_string();

        let response = run_search(&leonar, &usage, &request).await.unwrap();
        // Budget capped to the 5 remaining views; the whole fetched page
        // still counts against the quota.
        assert_eq!(response.profiles.len(), 5);
        assert_eq!(response.linkedin_viewed_today, Some(1020));
        assert!(response
            .warnings
            .iter()
            .any(|w| w.contains("search capped")));
    }

    #[tokio::test]
    async fn test_linkedin_search_requires_account() {
        let leonar =
            LeonarClient::with_base_url("k".to_string(), "http://127.0.0.1:9".to_string()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let usage = UsageTracker::new(dir.path());

        let request = base_request(SourceType::Linkedin);
        let err = run_search(&leonar, &usage, &request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_linkedin_search_blocked_when_quota_spent() {
        let leonar =
            LeonarClient::with_base_url("k".to_string(), "http://127.0.0.1:9".to_string()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let usage = UsageTracker::new(dir.path());
        usage.add(LINKEDIN_DAILY_LIMIT).await;

        let mut request = base_request(SourceType::Linkedin);
        request.account_id = Some("acc-1".to_string());

        let err = run_search(&leonar, &usage, &request).await.unwrap_err();
        match err {
            AppError::Validation(message) => assert!(message.contains("daily LinkedIn limit")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_linkedin_location_resolution_and_misses() {
        let router = Router::new()
            .route(
                "/sourcing/linkedin/locations",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    if params["q"] == "Paris" {
                        Json(json!({"data": [{"id": "104246759", "title": "Paris, France"}]}))
                    } else {
                        Json(json!({"data": []}))
                    }
                }),
            )
            .route(
                "/sourcing/linkedin/search",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["location_ids"], json!(["104246759"]));
                    Json(json!({"data": {
                        "profiles": [named_profile("p1", "Ada", "Martin", "Paris")],
                        "has_more": false
                    }}))
                }),
            )
            .route(
                "/projects/:id/entries",
                get(|| async { Json(json!({"data": [], "meta": {"has_more": false}})) }),
            );

        let base = serve(router).await;
        let leonar = LeonarClient::with_base_url("k".to_string(), base).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let usage = UsageTracker::new(dir.path());

        let mut request = base_request(SourceType::Linkedin);
        request.account_id = Some("acc-1".to_string());
        request.criteria = SearchCriteria {
            job_titles: IncludeExclude {
                include: vec!["CFO".to_string()],
                exclude: vec![],
            },
            locations: Locations {
                countries: vec![],
                regions: vec!["Paris".to_string(), "Nowhere".to_string()],
            },
            ..SearchCriteria::default()
        };

        let response = run_search(&leonar, &usage, &request).await.unwrap();
        assert_eq!(response.profiles.len(), 1);
        assert_eq!(response.resolved_locations.len(), 1);
        assert_eq!(response.resolved_locations[0].title, "Paris, France");
        assert!(response
            .warnings
            .iter()
            .any(|w| w.contains("'Nowhere' not found")));
        assert_eq!(response.linkedin_viewed_today, Some(1));
    }

    #[test]
    fn test_source_type_wire_names() {
        assert_eq!(SourceType::LeonarSource.as_str(), "leonar_source");
        assert_eq!(SourceType::Linkedin.as_str(), "linkedin");
        assert_eq!(SourceType::Contacts.as_str(), "contacts");

        let parsed: SourceType = serde_json::from_str("\"leonar_source\"").unwrap();
        assert_eq!(parsed, SourceType::LeonarSource);
    }
}
