// SPDX-License-Identifier: MIT

//! Directory search and filtering.
//!
//! Filters run in memory over the fetched page, matching the original
//! behavior of the directory views. An area filter matches a profile
//! when the profile carries at least one of the requested tags.

use crate::models::Profile;

/// Directory filter parsed from the listing query string.
#[derive(Debug, Default)]
pub struct DirectoryFilter {
    /// Expertise tags; empty means no area filtering
    pub areas: Vec<String>,
    /// Case-insensitive substring match on the display name
    pub name: Option<String>,
}

impl DirectoryFilter {
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty() && self.name.is_none()
    }
}

/// Whether a profile has at least one of the wanted area tags.
pub fn matches_areas(profile: &Profile, wanted: &[String]) -> bool {
    wanted.is_empty()
        || profile
            .areas
            .iter()
            .any(|area| wanted.iter().any(|w| w.eq_ignore_ascii_case(area)))
}

/// Whether a profile's display name contains the query.
pub fn matches_name(profile: &Profile, query: &str) -> bool {
    profile
        .display_name()
        .to_lowercase()
        .contains(&query.to_lowercase())
}

/// Apply the filter to a fetched page of profiles.
pub fn apply_filter(profiles: Vec<Profile>, filter: &DirectoryFilter) -> Vec<Profile> {
    if filter.is_empty() {
        return profiles;
    }

    profiles
        .into_iter()
        .filter(|p| matches_areas(p, &filter.areas))
        .filter(|p| {
            filter
                .name
                .as_deref()
                .map(|q| matches_name(p, q))
                .unwrap_or(true)
        })
        .collect()
}
