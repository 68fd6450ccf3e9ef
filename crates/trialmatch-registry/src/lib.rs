//! ClinicalTrials.gov registry client for TrialMatch.
//!
//! Normalizes free-text locations into the registry's query formats, issues
//! locality-scoped study searches with a one-shot nationwide fallback, and
//! flattens the registry's nested records into [`TrialRecord`]s.

pub mod client;
pub mod error;
pub mod location;
pub mod parse;
pub mod types;

pub use client::{HttpStudyFetcher, RegistryClient, StudiesPage, StudyFetcher, StudyQuery};
pub use error::RegistryError;
pub use location::{normalize, NormalizedLocation};
pub use types::{TrialRecord, NO_TRIALS_ID, REGISTRY_ERROR_ID};
