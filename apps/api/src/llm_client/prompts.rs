// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains the cross-cutting fragments.

/// System prompt fragment that enforces JSON-only output.
/// Both the extraction and scoring system prompts build on this.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Recruiter persona fragment shared by both LLM calls. The tool targets
/// finance-sector search and the scoring rubric assumes it.
pub const RECRUITER_PERSONA: &str =
    "You are an expert recruiter specialized in finance-sector hiring.";
