//! Criteria extraction: turns a free-text hiring brief into the structured
//! search criteria the sourcing endpoints consume.
//!
//! The extracted criteria go back to the browser for review; the user can
//! edit every field before launching a search, so the same types serialize
//! in both directions.

pub mod boolean;
pub mod handlers;
pub mod prompts;

use serde::{Deserialize, Serialize};

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, RECRUITER_PERSONA};
use crate::llm_client::{LlmClient, LlmError};
use prompts::EXTRACTION_PROMPT_TEMPLATE;

const EXTRACTION_MAX_TOKENS: u32 = 1500;

/// Default country filter when the model extracted none.
const DEFAULT_COUNTRY: &str = "France";

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// The raw hiring brief as entered by the recruiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobBrief {
    pub job_description: String,
    /// Transcript of the hiring-manager call, often empty.
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub region: String,
    /// Free text, e.g. "5-10 years".
    #[serde(default)]
    pub seniority: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncludeExclude {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Locations {
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YearsExperience {
    #[serde(default)]
    pub min: u32,
    #[serde(default)]
    pub max: u32,
}

impl YearsExperience {
    /// An all-zero range means "not specified" and must not be sent to the
    /// LinkedIn search endpoint, which rejects it.
    pub fn is_set(&self) -> bool {
        self.min > 0 || self.max > 0
    }
}

/// Structured criteria extracted from a brief. Every field defaults so a
/// partial model response still deserializes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub job_titles: IncludeExclude,
    #[serde(default)]
    pub companies: IncludeExclude,
    #[serde(default)]
    pub locations: Locations,
    #[serde(default)]
    pub years_experience: YearsExperience,
    #[serde(default)]
    pub boolean_query: String,
    #[serde(default)]
    pub keywords: IncludeExclude,
    /// Two-line summary of the target profile, reused by the scoring prompt.
    #[serde(default)]
    pub summary: String,
}

impl SearchCriteria {
    /// Country filter for database/CRM searches, falling back to France when
    /// the model extracted none.
    pub fn countries_or_default(&self) -> Vec<String> {
        if self.locations.countries.is_empty() {
            vec![DEFAULT_COUNTRY.to_string()]
        } else {
            self.locations.countries.clone()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Asks the model to derive structured criteria from the brief.
pub async fn extract_search_criteria(
    llm: &LlmClient,
    brief: &JobBrief,
) -> Result<SearchCriteria, LlmError> {
    let prompt = EXTRACTION_PROMPT_TEMPLATE
        .replace("{job_description}", &brief.job_description)
        .replace("{transcript}", &brief.transcript)
        .replace("{region}", &brief.region)
        .replace("{seniority}", &brief.seniority);
    let system = format!("{RECRUITER_PERSONA} {JSON_ONLY_SYSTEM}");

    llm.call_json(&prompt, &system, EXTRACTION_MAX_TOKENS).await
}
