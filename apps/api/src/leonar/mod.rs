//! Leonar API client.
//!
//! Every call goes through one wrapper that owns the vendor's rate-limit
//! contract: back off and retry on 429 (2s, 4s, 8s, 16s, 32s), pause for 2s
//! whenever the `X-RateLimit-Remaining` header drops below 10, and map the
//! `{"error": {"code", "message"}}` envelope to typed errors whose messages
//! are shown to the user as-is.

pub mod types;

use std::time::Duration;

use anyhow::Context;
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use types::{
    AddToProjectRequest, AddToProjectResult, ConnectedAccount, Envelope, EntriesPage, EntryWalk,
    LinkedInLocation, LinkedInSearchRequest, ProfilePayload, SearchPage, SourcingSearchRequest,
};

const LEONAR_BASE_URL: &str = "https://app.leonar.app/api/v1";

/// Scopes the API key must carry for the full pipeline to run.
pub const REQUIRED_SCOPES: &str = "sourcing:read, sourcing:write, contacts:read, projects:read";

const MAX_ATTEMPTS: u32 = 5;
const RATE_REMAINING_HEADER: &str = "X-RateLimit-Remaining";
/// Pause threshold for the vendor's ~1000 req/h budget.
const RATE_REMAINING_FLOOR: u64 = 10;
const ENTRIES_PAGE_SIZE: u32 = 50;
const ENTRIES_PAGE_DELAY_MS: u64 = 300;

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LeonarError {
    #[error("Leonar request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid or revoked Leonar API key")]
    InvalidApiKey,

    #[error("Leonar API key is missing permissions (required scopes: {}): {message}", REQUIRED_SCOPES)]
    InsufficientScope { message: String },

    #[error("this feature requires an active Leonar subscription")]
    BillingRequired,

    #[error("this feature is not included in the current Leonar plan")]
    PlanUpgradeRequired,

    #[error("Leonar rejected the request parameters: {message}")]
    Validation { message: String },

    #[error("Leonar resource not found: {message}")]
    NotFound { message: String },

    #[error("Leonar rate limit still exceeded after {attempts} attempts, retry in a few minutes")]
    RateLimited { attempts: u32 },

    #[error("Leonar API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
}

/// Body shape of Leonar error responses.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Maps a non-2xx response body to a typed error, falling back to the raw
/// body text when the envelope does not parse.
fn map_api_error(status: u16, body: &str) -> LeonarError {
    let (code, message) = match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.code, envelope.error.message),
        Err(_) => (String::new(), body.trim().to_string()),
    };

    match code.as_str() {
        "invalid_api_key" => LeonarError::InvalidApiKey,
        "insufficient_scope" => LeonarError::InsufficientScope { message },
        "billing_required" => LeonarError::BillingRequired,
        "plan_upgrade_required" => LeonarError::PlanUpgradeRequired,
        "validation_error" => LeonarError::Validation { message },
        "not_found" => LeonarError::NotFound { message },
        _ => LeonarError::Api {
            status,
            code: if code.is_empty() {
                "unknown".to_string()
            } else {
                code
            },
            message,
        },
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 << (attempt + 1))
}

fn rate_limit_remaining(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RATE_REMAINING_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct LeonarClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl LeonarClient {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Self::with_base_url(api_key, LEONAR_BASE_URL.to_string())
    }

    /// Base URL override, used by tests to point at a local stub.
    pub fn with_base_url(api_key: String, base_url: String) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build Leonar HTTP client")?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Sends a request, retrying on 429 with exponential backoff and mapping
    /// vendor error envelopes. `build` constructs a fresh builder per attempt
    /// since reqwest builders are single-use.
    async fn execute(
        &self,
        build: impl Fn(&Client) -> RequestBuilder,
    ) -> Result<Response, LeonarError> {
        for attempt in 0..MAX_ATTEMPTS {
            let response = build(&self.http)
                .bearer_auth(&self.api_key)
                .send()
                .await?;

            if let Some(remaining) = rate_limit_remaining(response.headers()) {
                if remaining < RATE_REMAINING_FLOOR {
                    warn!(remaining, "Leonar rate budget low, pausing 2s");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let wait = backoff_delay(attempt);
                warn!(
                    attempt = attempt + 1,
                    wait_secs = wait.as_secs(),
                    "Leonar returned 429, backing off"
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(map_api_error(status.as_u16(), &body));
            }

            return Ok(response);
        }

        Err(LeonarError::RateLimited {
            attempts: MAX_ATTEMPTS,
        })
    }

    /// GET /connected-accounts
    pub async fn connected_accounts(&self) -> Result<Vec<ConnectedAccount>, LeonarError> {
        let url = format!("{}/connected-accounts", self.base_url);
        let response = self.execute(|c| c.get(&url)).await?;
        let envelope: Envelope<Vec<ConnectedAccount>> = response.json().await?;
        Ok(envelope.data)
    }

    /// GET /sourcing/linkedin/locations: resolves a free-text place name to
    /// LinkedIn location ids through the given connected account.
    pub async fn linkedin_locations(
        &self,
        query: &str,
        account_id: &str,
    ) -> Result<Vec<LinkedInLocation>, LeonarError> {
        let url = format!("{}/sourcing/linkedin/locations", self.base_url);
        let response = self
            .execute(|c| {
                c.get(&url).query(&[
                    ("q", query),
                    ("account_id", account_id),
                    ("api_type", "recruiter"),
                ])
            })
            .await?;
        let envelope: Envelope<Vec<LinkedInLocation>> = response.json().await?;
        Ok(envelope.data)
    }

    /// POST /sourcing/linkedin/search: one page of live LinkedIn results.
    pub async fn linkedin_search(
        &self,
        request: &LinkedInSearchRequest,
    ) -> Result<SearchPage, LeonarError> {
        let url = format!("{}/sourcing/linkedin/search", self.base_url);
        let response = self.execute(|c| c.post(&url).json(request)).await?;
        let envelope: Envelope<SearchPage> = response.json().await?;
        Ok(envelope.data)
    }

    /// POST /sourcing/search: one page from the Leonar database or the CRM,
    /// depending on `source_type`.
    pub async fn sourcing_search(
        &self,
        request: &SourcingSearchRequest,
    ) -> Result<SearchPage, LeonarError> {
        let url = format!("{}/sourcing/search", self.base_url);
        let response = self.execute(|c| c.post(&url).json(request)).await?;
        let envelope: Envelope<SearchPage> = response.json().await?;
        Ok(envelope.data)
    }

    /// POST /sourcing/add-to-project: pushes one batch of profiles.
    pub async fn add_to_project(
        &self,
        project_id: &str,
        profiles: &[ProfilePayload],
    ) -> Result<AddToProjectResult, LeonarError> {
        let url = format!("{}/sourcing/add-to-project", self.base_url);
        let request = AddToProjectRequest {
            project_id,
            profiles,
        };
        let response = self.execute(|c| c.post(&url).json(&request)).await?;
        let envelope: Envelope<AddToProjectResult> = response.json().await?;
        Ok(envelope.data)
    }

    /// Walks GET /projects/{id}/entries page by page. A page that fails after
    /// retries ends the walk with what was collected so far and marks the
    /// result incomplete; exclusion matching degrades rather than blocking
    /// the search.
    pub async fn project_entries(&self, project_id: &str) -> EntryWalk {
        let url = format!("{}/projects/{}/entries", self.base_url, project_id);
        let mut walk = EntryWalk {
            entries: Vec::new(),
            complete: true,
        };
        let mut offset: u32 = 0;

        loop {
            let result = self
                .execute(|c| {
                    c.get(&url).query(&[
                        ("limit", ENTRIES_PAGE_SIZE.to_string()),
                        ("offset", offset.to_string()),
                    ])
                })
                .await;

            let page: EntriesPage = match result {
                Ok(response) => match response.json().await {
                    Ok(page) => page,
                    Err(err) => {
                        warn!(%err, offset, "failed to decode project entries page");
                        walk.complete = false;
                        break;
                    }
                },
                Err(err) => {
                    warn!(%err, offset, "failed to fetch project entries page");
                    walk.complete = false;
                    break;
                }
            };

            if page.data.is_empty() {
                break;
            }
            walk.entries.extend(page.data);
            if !page.meta.has_more {
                break;
            }
            offset += ENTRIES_PAGE_SIZE;
            tokio::time::sleep(Duration::from_millis(ENTRIES_PAGE_DELAY_MS)).await;
        }

        walk
    }

    /// POST /contacts/{id}/notes
    pub async fn add_note(&self, contact_id: &str, content: &str) -> Result<(), LeonarError> {
        let url = format!("{}/contacts/{}/notes", self.base_url, contact_id);
        let body = serde_json::json!({ "content": content });
        self.execute(|c| c.post(&url).json(&body)).await?;
        Ok(())
    }

    /// POST /contacts/{id}/tags
    pub async fn add_tag(&self, contact_id: &str, name: &str) -> Result<(), LeonarError> {
        let url = format!("{}/contacts/{}/tags", self.base_url, contact_id);
        let body = serde_json::json!({ "name": name });
        self.execute(|c| c.post(&url).json(&body)).await?;
        Ok(())
    }
}
