//! Per-session conversation state.
//!
//! One [`ConversationState`] per session, exclusively owned by the
//! [`crate::store::SessionStore`]. All turn-level mutation happens on a
//! local snapshot and lands in the store through a single atomic put, so an
//! abandoned turn never leaves a half-merged profile behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trialmatch_core::config::ChatConfig;
use trialmatch_core::{SlotKey, SlotValues};

/// The patient profile collected for one session.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationState {
    pub cancer_type: Option<String>,
    pub stage: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub location: Option<String>,
    /// Insertion order preserved.
    pub comorbidities: Vec<String>,
    /// Insertion order preserved.
    pub prior_treatments: Vec<String>,
    /// True only after an intake submission set all mandatory fields in one
    /// atomic update. Conversational slot-filling never flips this.
    pub intake_complete: bool,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl Default for ConversationState {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            cancer_type: None,
            stage: None,
            age: None,
            sex: None,
            location: None,
            comorbidities: Vec::new(),
            prior_treatments: Vec::new(),
            intake_complete: false,
            created_at: now,
            last_active_at: now,
        }
    }
}

/// One-time bulk submission of the mandatory patient profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeSubmission {
    pub cancer_type: String,
    pub stage: String,
    pub age: u32,
    pub sex: String,
    pub location: String,
    #[serde(default)]
    pub comorbidities: Vec<String>,
    #[serde(default)]
    pub prior_treatments: Vec<String>,
}

impl ConversationState {
    /// Apply an intake submission: every field in one atomic update.
    ///
    /// Optional lists are truncated to the configured caps. The caller has
    /// already validated that mandatory fields are present.
    pub fn apply_intake(&mut self, submission: &IntakeSubmission, config: &ChatConfig) {
        self.cancer_type = Some(submission.cancer_type.clone());
        self.stage = Some(submission.stage.clone());
        self.age = Some(submission.age);
        self.sex = Some(submission.sex.clone());
        self.location = Some(submission.location.clone());
        self.comorbidities = capped(&submission.comorbidities, config.max_comorbidities);
        self.prior_treatments =
            capped(&submission.prior_treatments, config.max_prior_treatments);
        self.intake_complete = true;
        self.last_active_at = Utc::now();
    }

    /// Merge NLU-extracted slots into the profile.
    ///
    /// Scalar slots overwrite — the most recent utterance wins. List slots
    /// append, deduplicated, preserving insertion order. An age mention
    /// that does not parse as an integer is ignored.
    pub fn apply_slots(&mut self, slots: &SlotValues, config: &ChatConfig) {
        for (key, value) in slots {
            match key {
                SlotKey::CancerType => self.cancer_type = Some(value.clone()),
                SlotKey::Stage => self.stage = Some(value.clone()),
                SlotKey::Age => match value.parse::<u32>() {
                    Ok(age) => self.age = Some(age),
                    Err(_) => {
                        tracing::debug!(value = %value, "Ignoring unparsable age mention");
                    }
                },
                SlotKey::Sex => self.sex = Some(value.clone()),
                SlotKey::Location => self.location = Some(value.clone()),
                SlotKey::Comorbidity => {
                    append_unique(&mut self.comorbidities, value, config.max_comorbidities);
                }
                SlotKey::PriorTreatment => {
                    append_unique(
                        &mut self.prior_treatments,
                        value,
                        config.max_prior_treatments,
                    );
                }
            }
        }
    }

    /// Whether a trial search may run for this session.
    pub fn is_query_ready(&self) -> bool {
        self.intake_complete && self.cancer_type.is_some() && self.location.is_some()
    }

    /// The highest-priority missing mandatory field, in fixed prompting
    /// order: cancer type, then stage, then location.
    pub fn missing_field(&self) -> Option<SlotKey> {
        if self.cancer_type.is_none() {
            Some(SlotKey::CancerType)
        } else if self.stage.is_none() {
            Some(SlotKey::Stage)
        } else if self.location.is_none() {
            Some(SlotKey::Location)
        } else {
            None
        }
    }

    /// Currently known scalar slots, passed to the NLU gateway as context.
    pub fn known_slots(&self) -> SlotValues {
        let mut slots = SlotValues::new();
        if let Some(ref v) = self.cancer_type {
            slots.insert(SlotKey::CancerType, v.clone());
        }
        if let Some(ref v) = self.stage {
            slots.insert(SlotKey::Stage, v.clone());
        }
        if let Some(age) = self.age {
            slots.insert(SlotKey::Age, age.to_string());
        }
        if let Some(ref v) = self.sex {
            slots.insert(SlotKey::Sex, v.clone());
        }
        if let Some(ref v) = self.location {
            slots.insert(SlotKey::Location, v.clone());
        }
        slots
    }

    /// Mark the session active now.
    pub fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }
}

fn capped(values: &[String], cap: usize) -> Vec<String> {
    let mut out = Vec::new();
    for v in values {
        append_unique(&mut out, v, cap);
    }
    out
}

fn append_unique(list: &mut Vec<String>, value: &str, cap: usize) {
    if list.len() >= cap {
        tracing::debug!(value = %value, "List slot at capacity; dropping");
        return;
    }
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}
