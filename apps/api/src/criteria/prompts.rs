#![allow(dead_code)]

// Prompt constants for criteria extraction.
// The system prompt is composed from llm_client::prompts fragments.

/// Extraction prompt template. Replace `{job_description}`, `{transcript}`,
/// `{region}` and `{seniority}` before sending.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract structured search criteria from the hiring brief below.

JOB DESCRIPTION:
{job_description}

HIRING MANAGER BRIEF TRANSCRIPT:
{transcript}

TARGET REGION: {region}
SENIORITY: {seniority}

Respond ONLY with valid JSON:
{
    "job_titles": {
        "include": ["title variant 1", "title variant 2"],
        "exclude": ["title to exclude"]
    },
    "companies": {
        "include": [],
        "exclude": ["company to exclude"]
    },
    "locations": {
        "countries": ["France"],
        "regions": ["region name"]
    },
    "years_experience": {
        "min": 5,
        "max": 10
    },
    "boolean_query": "complete LinkedIn boolean expression",
    "keywords": {
        "include": ["keyword 1", "keyword 2"],
        "exclude": ["keyword to exclude"]
    },
    "summary": "Two-line summary of the target profile"
}

Be precise on job titles and include both French and English variants.
Use exact region names (e.g. Île-de-France, Auvergne-Rhône-Alpes).
Keywords must be simple terms (skills, tools, sectors), one term per item, no boolean operators.
Derive years_experience from the stated seniority.

For boolean_query, build a complete, valid, ready-to-send LinkedIn boolean expression:
- Group the essential title variants AND the key sector keywords
- Operators AND, OR, NOT always in UPPERCASE
- Always "AND NOT" for exclusions, never a bare NOT
- Double quotes around every multi-word phrase (e.g. "directeur commercial")
- Do not include locations (they go through the separate location filter)
- Aim for under 800 characters, keep only the discriminating terms
- Example: ("directeur commercial" OR "sales director") AND (assurance OR IARD) AND NOT (junior OR stagiaire)
- boolean_query must be a single-line STRING, never an array."#;
