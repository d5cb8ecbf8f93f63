//! Profile scoring: batches of candidates go to the model with the brief and
//! come back as 0-10 scores with one-line justifications.
//!
//! Profiles are condensed before prompting (a handful of experiences, a
//! truncated summary) to keep batch prompts inside the token budget. Scores
//! are merged back onto the full profiles by `profile_id`; a profile the
//! model skipped scores zero.

pub mod handlers;
pub mod prompts;

use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::criteria::JobBrief;
use crate::leonar::types::Profile;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, RECRUITER_PERSONA};
use crate::llm_client::{LlmClient, LlmError};
use prompts::SCORING_PROMPT_TEMPLATE;

pub const SCORING_BATCH_SIZE: usize = 10;
const SCORING_MAX_TOKENS: u32 = 4000;
const BATCH_DELAY_MS: u64 = 300;

// Prompt condensation limits per profile.
const MAX_EXPERIENCES: usize = 4;
const MAX_EDUCATIONS: usize = 2;
const MAX_SKILLS: usize = 10;
const MAX_SUMMARY_CHARS: usize = 200;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// One score line from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileScore {
    #[serde(default)]
    pub profile_id: String,
    #[serde(deserialize_with = "clamped_score")]
    pub score: u8,
    #[serde(default)]
    pub justification: String,
}

/// A profile with its score attached, as returned to the browser. The inner
/// profile flattens so the object round-trips through the push step intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredProfile {
    #[serde(flatten)]
    pub profile: Profile,
    pub score: u8,
    pub justification: String,
}

/// Accepts integer or float scores and clamps into 0..=10; the model
/// occasionally returns 7.5 despite instructions.
fn clamped_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.round().clamp(0.0, 10.0) as u8)
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// Scores every profile in batches, then merges the scores back and sorts
/// best-first. Any batch failure aborts the run.
pub async fn score_all(
    llm: &LlmClient,
    profiles: &[Profile],
    brief: &JobBrief,
    criteria_summary: &str,
    exclusions: &[String],
) -> Result<Vec<ScoredProfile>, LlmError> {
    let mut scores: Vec<ProfileScore> = Vec::with_capacity(profiles.len());

    for (index, batch) in profiles.chunks(SCORING_BATCH_SIZE).enumerate() {
        if index > 0 {
            tokio::time::sleep(Duration::from_millis(BATCH_DELAY_MS)).await;
        }
        let batch_scores = score_batch(llm, batch, brief, criteria_summary, exclusions).await?;
        scores.extend(batch_scores);
        info!(
            scored = scores.len(),
            total = profiles.len(),
            "scoring progress"
        );
    }

    Ok(merge_scores(profiles, scores))
}

async fn score_batch(
    llm: &LlmClient,
    batch: &[Profile],
    brief: &JobBrief,
    criteria_summary: &str,
    exclusions: &[String],
) -> Result<Vec<ProfileScore>, LlmError> {
    let prompt = build_scoring_prompt(batch, brief, criteria_summary, exclusions);
    let system = format!("{RECRUITER_PERSONA} {JSON_ONLY_SYSTEM}");
    llm.call_json(&prompt, &system, SCORING_MAX_TOKENS).await
}

fn build_scoring_prompt(
    batch: &[Profile],
    brief: &JobBrief,
    criteria_summary: &str,
    exclusions: &[String],
) -> String {
    let mut profiles_text = String::new();
    for (index, profile) in batch.iter().enumerate() {
        profiles_text.push('\n');
        profiles_text.push_str(&format_profile(index, profile));
    }

    let exclusions_section = if exclusions.is_empty() {
        String::new()
    } else {
        format!(
            "\nADDITIONAL EXCLUSION KEYWORDS: {}\n",
            exclusions.join(", ")
        )
    };

    SCORING_PROMPT_TEMPLATE
        .replace("{job_description}", &brief.job_description)
        .replace("{transcript}", &brief.transcript)
        .replace("{criteria_summary}", criteria_summary)
        .replace("{region}", &brief.region)
        .replace("{exclusions_section}", &exclusions_section)
        .replace("{profiles}", &profiles_text)
}

/// Renders one profile as a compact text block for the scoring prompt.
fn format_profile(index: usize, profile: &Profile) -> String {
    let mut experiences = String::new();
    for exp in profile.experiences.iter().take(MAX_EXPERIENCES) {
        let current = if exp.is_current { " (current)" } else { "" };
        let period = match exp.start_date.as_deref() {
            Some(start) => format!(
                " [{} -> {}]",
                start,
                exp.end_date.as_deref().unwrap_or("present")
            ),
            None => String::new(),
        };
        let _ = writeln!(
            experiences,
            "  - {} @ {}{}{}",
            exp.title.as_deref().unwrap_or("N/A"),
            exp.company_name.as_deref().unwrap_or("N/A"),
            current,
            period
        );
    }

    let mut education = String::new();
    for edu in profile.educations.iter().take(MAX_EDUCATIONS) {
        let _ = writeln!(
            education,
            "  - {} {} @ {}",
            edu.diploma.as_deref().unwrap_or(""),
            edu.specialization.as_deref().unwrap_or(""),
            edu.educational_establishment.as_deref().unwrap_or("")
        );
    }

    let skills = if profile.skills.is_empty() {
        "N/A".to_string()
    } else {
        profile
            .skills
            .iter()
            .take(MAX_SKILLS)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };

    let summary: String = profile
        .summary
        .as_deref()
        .unwrap_or("N/A")
        .chars()
        .take(MAX_SUMMARY_CHARS)
        .collect();

    let years = profile
        .total_years_experience
        .map(|y| y.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    let profile_id = if profile.profile_id.is_empty() {
        "N/A"
    } else {
        &profile.profile_id
    };

    format!(
        "--- PROFILE {} (ID: {}) ---\n\
         Name: {}\n\
         Headline: {}\n\
         Location: {}\n\
         Years of experience: {}\n\
         Summary: {}\n\
         Skills: {}\n\
         Experience:\n{}Education:\n{}",
        index + 1,
        profile_id,
        profile.display_name(),
        profile.headline.as_deref().unwrap_or("N/A"),
        profile.location.as_deref().unwrap_or("N/A"),
        years,
        summary,
        skills,
        experiences,
        education
    )
}

/// Pairs scores with profiles by id and sorts best-first. Unscored profiles
/// sink to the bottom with a zero. The sort is stable so equal scores keep
/// their search order.
pub fn merge_scores(profiles: &[Profile], scores: Vec<ProfileScore>) -> Vec<ScoredProfile> {
    let by_id: HashMap<String, ProfileScore> = scores
        .into_iter()
        .map(|score| (score.profile_id.clone(), score))
        .collect();

    let mut merged: Vec<ScoredProfile> = profiles
        .iter()
        .map(|profile| match by_id.get(&profile.profile_id) {
            Some(score) => ScoredProfile {
                profile: profile.clone(),
                score: score.score,
                justification: score.justification.clone(),
            },
            None => ScoredProfile {
                profile: profile.clone(),
                score: 0,
                justification: "Not scored".to_string(),
            },
        })
        .collect();

    merged.sort_by(|a, b| b.score.cmp(&a.score));
    merged
}
