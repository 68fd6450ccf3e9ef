//! User-facing reply text.
//!
//! Every string a patient can see is composed here, so the engine stays
//! readable and the wording stays consistent across intents.

use trialmatch_core::SlotKey;
use trialmatch_registry::{TrialRecord, NO_TRIALS_ID, REGISTRY_ERROR_ID};

use crate::state::ConversationState;

pub fn greeting() -> String {
    "Hello! I can help you find clinical trials. What type of cancer are you researching?"
        .to_string()
}

pub fn farewell() -> String {
    "Goodbye! Feel free to return anytime you need help finding clinical trials.".to_string()
}

pub fn intake_required() -> String {
    "I need to collect your information first. Please complete the intake form before we chat."
        .to_string()
}

/// Targeted prompt for the highest-priority missing field, or a generic
/// clarification when nothing is missing.
pub fn clarification(missing: Option<SlotKey>) -> String {
    match missing {
        Some(key) => format!("Please tell me your {}.", field_name(key)),
        None => "Could you clarify your request?".to_string(),
    }
}

/// Confirmation line echoed after a successful intake submission.
pub fn intake_confirmation(state: &ConversationState) -> String {
    format!(
        "Thanks! I have: {}, stage {}, age {}, {}, in {}. Ask me to find trials whenever you're ready.",
        state.cancer_type.as_deref().unwrap_or("unknown"),
        state.stage.as_deref().unwrap_or("unknown"),
        state.age.map(|a| a.to_string()).unwrap_or_else(|| "unknown".to_string()),
        state.sex.as_deref().unwrap_or("unknown"),
        state.location.as_deref().unwrap_or("unknown"),
    )
}

/// Header line for a search reply, keyed on what the registry client
/// actually returned: local trials, nationwide fallback trials, an empty
/// outcome, or the unavailability record.
pub fn search_results(state: &ConversationState, records: &[TrialRecord]) -> String {
    let cancer_type = state.cancer_type.as_deref().unwrap_or("cancer");
    let location = state.location.as_deref().unwrap_or("your area");

    match records.first() {
        Some(first) if first.registry_id == REGISTRY_ERROR_ID => {
            "I'm having trouble connecting to ClinicalTrials.gov right now. \
             Please try again in a moment, or visit ClinicalTrials.gov directly."
                .to_string()
        }
        Some(first) if first.registry_id == NO_TRIALS_ID => format!(
            "I couldn't find any recruiting trials for {} right now. \
             You might try a different location or visit ClinicalTrials.gov directly.",
            cancer_type
        ),
        Some(first) if first.is_nationwide => format!(
            "I didn't find trials in {}, but I found {} recruiting trials nationwide:",
            location,
            records.len()
        ),
        Some(_) => format!(
            "Here are some {} clinical trials in {}:",
            cancer_type, location
        ),
        None => format!(
            "I couldn't find any recruiting trials for {} right now.",
            cancer_type
        ),
    }
}

/// Human wording for a slot in prompts.
fn field_name(key: SlotKey) -> &'static str {
    match key {
        SlotKey::CancerType => "cancer type",
        SlotKey::Stage => "stage",
        SlotKey::Age => "age",
        SlotKey::Sex => "sex",
        SlotKey::Location => "location",
        SlotKey::Comorbidity => "comorbidities",
        SlotKey::PriorTreatment => "prior treatments",
    }
}
