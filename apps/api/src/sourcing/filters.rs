//! Filter construction and post-search cleanup.
//!
//! The cleanup order matters: dedupe first, then drop profiles already in
//! the project, then the region safety net. Each step runs on whatever the
//! previous one kept.

use std::collections::HashSet;

use crate::criteria::{IncludeExclude, SearchCriteria};
use crate::leonar::types::{
    CompaniesFilter, ContactsFilters, FilterLocations, Profile, ProjectEntry, SourcingFilters,
};
use crate::sourcing::SourceType;

/// Builds the filters object for /sourcing/search from the edited criteria.
/// Sub-filters the user left empty are omitted; the years range is always
/// sent since the endpoint treats 0..0 as unbounded.
pub fn build_sourcing_filters(
    criteria: &SearchCriteria,
    extra_exclusions: &[String],
    source_type: SourceType,
) -> SourcingFilters {
    let mut filters = SourcingFilters::default();

    let titles = &criteria.job_titles;
    if !titles.include.is_empty() || !titles.exclude.is_empty() {
        filters.job_titles = Some(titles.clone());
    }

    let keyword_exclude = merge_exclusions(&criteria.keywords.exclude, extra_exclusions);
    if !criteria.keywords.include.is_empty() || !keyword_exclude.is_empty() {
        filters.keywords = Some(IncludeExclude {
            include: criteria.keywords.include.clone(),
            exclude: keyword_exclude,
        });
    }

    filters.locations = Some(FilterLocations {
        countries: criteria.countries_or_default(),
        states: (!criteria.locations.regions.is_empty())
            .then(|| criteria.locations.regions.clone()),
    });

    filters.years_experience = Some(criteria.years_experience);

    if !criteria.companies.exclude.is_empty() {
        filters.companies = Some(CompaniesFilter {
            exclude: criteria.companies.exclude.clone(),
        });
    }

    if source_type == SourceType::Contacts {
        filters.contacts_filters = Some(ContactsFilters {
            contact_types: vec!["candidate".to_string()],
        });
    }

    filters
}

/// Merges the criteria exclusions with the user's extra keywords, dropping
/// duplicates while keeping first-seen order.
fn merge_exclusions(from_criteria: &[String], extra: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    from_criteria
        .iter()
        .chain(extra.iter())
        .filter(|kw| !kw.trim().is_empty())
        .filter(|kw| seen.insert(kw.trim().to_string()))
        .map(|kw| kw.trim().to_string())
        .collect()
}

/// Drops duplicate profiles, matching by LinkedIn URL first and lowercased
/// full name second. Profiles with neither are always kept.
pub fn deduplicate(profiles: Vec<Profile>) -> Vec<Profile> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(profiles.len());

    for profile in profiles {
        let url = profile.linkedin_url.clone().unwrap_or_default();
        let name = profile.full_name_key();

        if !url.is_empty() && seen_urls.contains(&url) {
            continue;
        }
        if !name.is_empty() && seen_names.contains(&name) {
            continue;
        }

        if !url.is_empty() {
            seen_urls.insert(url);
        }
        if !name.is_empty() {
            seen_names.insert(name);
        }
        unique.push(profile);
    }

    unique
}

/// Removes profiles already present in the project, matching by URL or name
/// against the fetched entries. Returns the kept profiles and the skip count.
pub fn exclude_existing(
    profiles: Vec<Profile>,
    entries: &[ProjectEntry],
) -> (Vec<Profile>, usize) {
    let mut existing_urls: HashSet<&str> = HashSet::new();
    let mut existing_names: HashSet<String> = HashSet::new();

    for entry in entries {
        let name = entry.contact.full_name_key();
        if !name.is_empty() {
            existing_names.insert(name);
        }
        if let Some(url) = entry.contact.linkedin_profile.as_deref() {
            if !url.is_empty() {
                existing_urls.insert(url);
            }
        }
    }

    let mut kept = Vec::with_capacity(profiles.len());
    let mut skipped = 0;
    for profile in profiles {
        let url = profile.linkedin_url.as_deref().unwrap_or("");
        let name = profile.full_name_key();

        if (!url.is_empty() && existing_urls.contains(url))
            || (!name.is_empty() && existing_names.contains(&name))
        {
            skipped += 1;
            continue;
        }
        kept.push(profile);
    }

    (kept, skipped)
}

/// Post-search location safety net for database results, which sometimes
/// ignore the location filter. Profiles without a location are kept; a term
/// must be longer than two characters to count.
pub fn filter_by_region(profiles: Vec<Profile>, region: &str) -> (Vec<Profile>, Vec<Profile>) {
    if region.trim().is_empty() {
        return (profiles, Vec::new());
    }

    let region_lower = region.trim().to_lowercase();
    let terms: Vec<String> = region_lower
        .replace(',', " ")
        .split_whitespace()
        .filter(|term| term.chars().count() > 2)
        .map(|term| term.to_string())
        .collect();

    let mut matched = Vec::new();
    let mut excluded = Vec::new();
    for profile in profiles {
        let location = profile
            .location
            .as_deref()
            .unwrap_or("")
            .to_lowercase();
        if location.is_empty() || terms.iter().any(|term| location.contains(term)) {
            matched.push(profile);
        } else {
            excluded.push(profile);
        }
    }

    (matched, excluded)
}
