#![allow(dead_code)]

// Prompt constants for batch profile scoring.
// The system prompt is composed from llm_client::prompts fragments.

/// Scoring prompt template. Replace `{job_description}`, `{transcript}`,
/// `{criteria_summary}`, `{region}`, `{exclusions_section}` and `{profiles}`
/// before sending.
pub const SCORING_PROMPT_TEMPLATE: &str = r#"Score each candidate profile below from 0 to 10 against the role.

JOB DESCRIPTION:
{job_description}

HIRING MANAGER BRIEF:
{transcript}

CRITERIA SUMMARY: {criteria_summary}
TARGET REGION: {region}
{exclusions_section}
PROFILES:
{profiles}

Respond ONLY with a JSON array:
[
    {
        "profile_id": "id",
        "score": 8,
        "justification": "1-2 lines max"
    }
]

SCORING SCALE:
- 8-10: excellent match (experience, skills, sector and education all aligned)
- 6-7: good match, minor gaps
- 4-5: partial match
- 0-3: weak match

Use ALL the available data (skills, education, track record, summary). Be demanding and differentiating."#;
