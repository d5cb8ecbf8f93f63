//! Serde models for the Leonar API payloads this tool touches.
//!
//! The vendor contract is consumed as-is: request structs omit optional
//! fields entirely (`skip_serializing_if`) the way the API expects, and
//! response structs carry a flattened `extra` map so vendor fields we do not
//! interpret still survive the search → score → push round trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::criteria::{IncludeExclude, YearsExperience};

// ────────────────────────────────────────────────────────────────────────────
// Envelopes
// ────────────────────────────────────────────────────────────────────────────

/// Most Leonar responses wrap their payload in `{"data": ...}`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T: Default> {
    #[serde(default)]
    pub data: T,
}

// ────────────────────────────────────────────────────────────────────────────
// Accounts & locations
// ────────────────────────────────────────────────────────────────────────────

/// A LinkedIn account connected to the Leonar workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedAccount {
    pub id: String,
    pub name: String,
    pub license_type: Option<String>,
    /// Vendor-reported account API status, shown verbatim in the UI.
    pub api_status: Option<Value>,
}

/// A LinkedIn location lookup hit. Ids arrive as strings or numbers
/// depending on the account type, so they are normalized on deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedInLocation {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
}

/// Accepts a JSON string or number and yields a `String`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        S(String),
        N(i64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::S(s) => s,
        StringOrNumber::N(n) => n.to_string(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Profiles
// ────────────────────────────────────────────────────────────────────────────

/// A candidate profile as returned by any of the three search back-ends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub profile_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub total_years_experience: Option<f64>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub educations: Vec<Education>,
    pub current_job: Option<Value>,
    pub picture_url: Option<String>,
    /// LinkedIn search flags profiles already present in the target project.
    #[serde(default)]
    pub already_in_project: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    /// Lowercased `"first last"` form used for duplicate and exclusion
    /// matching. Empty when neither name is present.
    pub fn full_name_key(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("").trim().to_lowercase();
        let last = self.last_name.as_deref().unwrap_or("").trim().to_lowercase();
        format!("{first} {last}").trim().to_string()
    }

    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Experience {
    pub title: Option<String>,
    pub company_name: Option<String>,
    #[serde(default)]
    pub is_current: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Education {
    pub diploma: Option<String>,
    pub specialization: Option<String>,
    pub educational_establishment: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ────────────────────────────────────────────────────────────────────────────
// Search requests & pages
// ────────────────────────────────────────────────────────────────────────────

/// POST /sourcing/linkedin/search payload. Optional members are omitted
/// entirely when absent; `years_experience` is only sent when at least one
/// bound is positive (the endpoint rejects an all-zero range).
#[derive(Debug, Clone, Serialize)]
pub struct LinkedInSearchRequest {
    pub project_id: String,
    pub account_id: String,
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_titles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<YearsExperience>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boolean_query: Option<String>,
}

/// POST /sourcing/search payload for Leonar Source or CRM contacts.
#[derive(Debug, Clone, Serialize)]
pub struct SourcingSearchRequest {
    pub project_id: String,
    pub source_type: String,
    pub filters: SourcingFilters,
    pub page: u32,
    pub page_size: u32,
}

/// The `filters` object for /sourcing/search. Sub-filters the user left
/// empty are omitted rather than sent as empty objects.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourcingFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_titles: Option<IncludeExclude>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<IncludeExclude>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<FilterLocations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<YearsExperience>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub companies: Option<CompaniesFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts_filters: Option<ContactsFilters>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterLocations {
    pub countries: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompaniesFilter {
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactsFilters {
    pub contact_types: Vec<String>,
}

/// One page of search results from either search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub profiles: Vec<Profile>,
    pub total_count: Option<u64>,
    #[serde(default)]
    pub has_more: bool,
    /// Leonar Source sets this when the filter combination matches nothing
    /// it considers searchable.
    #[serde(default)]
    pub filters_too_strict: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Project entries & write-back
// ────────────────────────────────────────────────────────────────────────────

/// An entry already present in a Leonar project. Only the contact identity
/// fields matter here (exclusion matching).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectEntry {
    #[serde(default)]
    pub contact: EntryContact,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryContact {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub linkedin_profile: Option<String>,
}

impl EntryContact {
    pub fn full_name_key(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("").trim().to_lowercase();
        let last = self.last_name.as_deref().unwrap_or("").trim().to_lowercase();
        format!("{first} {last}").trim().to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntriesPage {
    #[serde(default)]
    pub data: Vec<ProjectEntry>,
    #[serde(default)]
    pub meta: EntriesMeta,
}

/// Result of walking a project's entry list. `complete` is false when a page
/// failed after retries and the list only covers what was collected so far.
#[derive(Debug, Clone, Default)]
pub struct EntryWalk {
    pub entries: Vec<ProjectEntry>,
    pub complete: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntriesMeta {
    #[serde(default)]
    pub has_more: bool,
}

/// POST /sourcing/add-to-project payload.
#[derive(Debug, Serialize)]
pub struct AddToProjectRequest<'a> {
    pub project_id: &'a str,
    pub profiles: &'a [ProfilePayload],
}

/// The projection of a scored profile sent back to Leonar. Identity fields
/// are always present (empty strings when unknown, as the endpoint expects);
/// enrichment fields are sent only when the profile carries them.
#[derive(Debug, Clone, Serialize)]
pub struct ProfilePayload {
    pub profile_id: String,
    pub first_name: String,
    pub last_name: String,
    pub headline: String,
    pub linkedin_url: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_job: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiences: Option<Vec<Experience>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub educations: Option<Vec<Education>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_years_experience: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
}

impl From<&Profile> for ProfilePayload {
    fn from(p: &Profile) -> Self {
        ProfilePayload {
            profile_id: p.profile_id.clone(),
            first_name: p.first_name.clone().unwrap_or_default(),
            last_name: p.last_name.clone().unwrap_or_default(),
            headline: p.headline.clone().unwrap_or_default(),
            linkedin_url: p.linkedin_url.clone().unwrap_or_default(),
            location: p.location.clone().unwrap_or_default(),
            current_job: p.current_job.clone(),
            experiences: (!p.experiences.is_empty()).then(|| p.experiences.clone()),
            educations: (!p.educations.is_empty()).then(|| p.educations.clone()),
            skills: (!p.skills.is_empty()).then(|| p.skills.clone()),
            total_years_experience: p.total_years_experience,
            picture_url: p.picture_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddToProjectResult {
    #[serde(default)]
    pub added: u64,
    #[serde(default)]
    pub contact_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_roundtrip_preserves_unknown_fields() {
        let raw = json!({
            "profile_id": "p-1",
            "first_name": "Ada",
            "last_name": "Martin",
            "skills": ["credit risk"],
            "vendor_only_field": {"nested": true}
        });
        let profile: Profile = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(profile.profile_id, "p-1");
        assert!(profile.extra.contains_key("vendor_only_field"));

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["vendor_only_field"], raw["vendor_only_field"]);
    }

    #[test]
    fn test_full_name_key_lowercases_and_trims() {
        let profile = Profile {
            first_name: Some("  Ada ".to_string()),
            last_name: Some("MARTIN".to_string()),
            ..Profile::default()
        };
        assert_eq!(profile.full_name_key(), "ada martin");
    }

    #[test]
    fn test_full_name_key_empty_when_unnamed() {
        assert_eq!(Profile::default().full_name_key(), "");
    }

    #[test]
    fn test_location_id_accepts_number() {
        let loc: LinkedInLocation =
            serde_json::from_value(json!({"id": 102277331, "title": "Lyon"})).unwrap();
        assert_eq!(loc.id, "102277331");
    }

    #[test]
    fn test_location_id_accepts_string() {
        let loc: LinkedInLocation =
            serde_json::from_value(json!({"id": "fr:0", "title": "France"})).unwrap();
        assert_eq!(loc.id, "fr:0");
    }

    #[test]
    fn test_linkedin_request_omits_empty_optionals() {
        let req = LinkedInSearchRequest {
            project_id: "proj".to_string(),
            account_id: "acc".to_string(),
            page: 1,
            page_size: 25,
            job_titles: None,
            location_ids: None,
            years_experience: None,
            boolean_query: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("job_titles"));
        assert!(!obj.contains_key("location_ids"));
        assert!(!obj.contains_key("years_experience"));
        assert!(!obj.contains_key("boolean_query"));
    }

    #[test]
    fn test_profile_payload_skips_absent_enrichment() {
        let profile = Profile {
            profile_id: "p-2".to_string(),
            first_name: Some("Jo".to_string()),
            ..Profile::default()
        };
        let payload = ProfilePayload::from(&profile);
        let value = serde_json::to_value(&payload).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj["first_name"], "Jo");
        assert_eq!(obj["last_name"], "");
        assert!(!obj.contains_key("experiences"));
        assert!(!obj.contains_key("skills"));
        assert!(!obj.contains_key("picture_url"));
    }

    #[test]
    fn test_search_page_defaults_when_fields_missing() {
        let page: SearchPage = serde_json::from_value(json!({})).unwrap();
        assert!(page.profiles.is_empty());
        assert!(!page.has_more);
        assert!(!page.filters_too_strict);
        assert_eq!(page.total_count, None);
    }

    #[test]
    fn test_envelope_defaults_missing_data() {
        let envelope: Envelope<Vec<ConnectedAccount>> = serde_json::from_value(json!({})).unwrap();
        assert!(envelope.data.is_empty());
    }
}
