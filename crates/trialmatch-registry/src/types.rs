//! Flat trial records produced by the registry client.

use serde::{Deserialize, Serialize};

/// Sentinel identifier for the synthetic record returned on transport
/// failure.
pub const REGISTRY_ERROR_ID: &str = "REGISTRY_ERROR";

/// Sentinel identifier for the synthetic record returned when neither the
/// local nor the nationwide tier found any recruiting study.
pub const NO_TRIALS_ID: &str = "NO_TRIALS_FOUND";

/// One clinical trial, flattened from the registry's nested study format.
///
/// Ephemeral: built per search response, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// NCT identifier, or a sentinel for synthetic records.
    pub registry_id: String,
    pub title: String,
    /// Display form, e.g. "Phase 2".
    pub phase: String,
    /// Display form, e.g. "Recruiting".
    pub status: String,
    /// "City State" of the first listed site, or the requested location.
    pub location: String,
    pub facility: String,
    pub sponsor: String,
    /// Detail page on the registry.
    pub link: String,
    /// True iff this record came from the unscoped fallback query.
    pub is_nationwide: bool,
}

impl TrialRecord {
    /// Synthetic record for a registry transport failure.
    ///
    /// Keeps search results well-formed when the registry is unreachable:
    /// callers render it instead of special-casing an error path.
    pub fn unavailable(condition: &str, location: &str, diagnostic: &str) -> Self {
        Self {
            registry_id: REGISTRY_ERROR_ID.to_string(),
            title: format!("Unable to fetch trials for {} at this time", condition),
            phase: "N/A".to_string(),
            status: format!("Registry Unavailable: {}", diagnostic),
            location: location.to_string(),
            facility: "ClinicalTrials.gov".to_string(),
            sponsor: "System".to_string(),
            link: "https://clinicaltrials.gov".to_string(),
            is_nationwide: false,
        }
    }

    /// Synthetic record for an empty result after both query tiers.
    pub fn no_matches(condition: &str, location: &str) -> Self {
        Self {
            registry_id: NO_TRIALS_ID.to_string(),
            title: format!("No recruiting trials found for {}", condition),
            phase: "N/A".to_string(),
            status: "No Matches".to_string(),
            location: location.to_string(),
            facility: "ClinicalTrials.gov".to_string(),
            sponsor: "System".to_string(),
            link: "https://clinicaltrials.gov".to_string(),
            is_nationwide: false,
        }
    }

    /// Whether this is one of the synthetic sentinel records.
    pub fn is_synthetic(&self) -> bool {
        self.registry_id == REGISTRY_ERROR_ID || self.registry_id == NO_TRIALS_ID
    }
}
