//! Shared vocabulary used across the TrialMatch crates.
//!
//! The slot enumeration is the single source of truth for field names on
//! both sides of the NLU boundary: gateway output is filtered through
//! [`SlotKey::parse`], so unknown keys can never reach the conversation
//! state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Intent label returned by the NLU gateway for one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Goodbye,
    FindTrials,
    /// Anything unrecognized, and the degraded value when the gateway fails.
    #[default]
    Other,
}

impl Intent {
    /// Wire label for this intent.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Goodbye => "goodbye",
            Intent::FindTrials => "find_trials",
            Intent::Other => "other",
        }
    }

    /// Parse a wire label. Unknown labels fold into [`Intent::Other`].
    pub fn parse(label: &str) -> Intent {
        match label {
            "greeting" => Intent::Greeting,
            "goodbye" => Intent::Goodbye,
            "find_trials" => Intent::FindTrials,
            _ => Intent::Other,
        }
    }
}

/// A named field of the patient's clinical profile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SlotKey {
    CancerType,
    Stage,
    Age,
    Sex,
    Location,
    Comorbidity,
    PriorTreatment,
}

impl SlotKey {
    /// Wire name for this slot.
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKey::CancerType => "cancer_type",
            SlotKey::Stage => "stage",
            SlotKey::Age => "age",
            SlotKey::Sex => "sex",
            SlotKey::Location => "location",
            SlotKey::Comorbidity => "comorbidity",
            SlotKey::PriorTreatment => "prior_treatment",
        }
    }

    /// Parse a wire name. Returns `None` for names outside the fixed set,
    /// which callers drop at the boundary.
    pub fn parse(name: &str) -> Option<SlotKey> {
        match name {
            "cancer_type" => Some(SlotKey::CancerType),
            "stage" => Some(SlotKey::Stage),
            "age" => Some(SlotKey::Age),
            "sex" => Some(SlotKey::Sex),
            "location" => Some(SlotKey::Location),
            "comorbidity" => Some(SlotKey::Comorbidity),
            "prior_treatment" => Some(SlotKey::PriorTreatment),
            _ => None,
        }
    }

    /// All slot keys, in the order used for prompting and display.
    pub fn all() -> &'static [SlotKey] {
        &[
            SlotKey::CancerType,
            SlotKey::Stage,
            SlotKey::Age,
            SlotKey::Sex,
            SlotKey::Location,
            SlotKey::Comorbidity,
            SlotKey::PriorTreatment,
        ]
    }
}

/// An ordered slot-name → value mapping.
///
/// Used both as NLU gateway output and as the known-slot context passed back
/// into the gateway. Values are non-empty strings; absence of a slot is
/// absence of the key.
pub type SlotValues = BTreeMap<SlotKey, String>;
