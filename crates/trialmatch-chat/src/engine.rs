//! Conversation engine: the per-turn state machine.
//!
//! One turn reads a session snapshot, merges NLU output, dispatches on
//! intent, optionally searches the registry, and commits the snapshot back
//! with a single atomic write. Downstream failures never cross the turn
//! boundary: an NLU error degrades to a clarification prompt and registry
//! failures arrive pre-packaged as synthetic trial records.

use std::sync::Arc;

use async_trait::async_trait;

use trialmatch_core::config::ChatConfig;
use trialmatch_core::Intent;
use trialmatch_nlu::{NluGateway, NluOutcome};
use trialmatch_registry::{RegistryClient, StudyFetcher, TrialRecord};

use crate::error::ChatError;
use crate::reply;
use crate::state::{ConversationState, IntakeSubmission};
use crate::store::{SessionStore, SessionSummary};

/// Trial search as the engine consumes it.
///
/// Infallible by contract: implementations convert their own failures into
/// synthetic records (see the registry client).
#[async_trait]
pub trait TrialSearch: Send + Sync {
    async fn search(
        &self,
        condition: &str,
        location: &str,
        stage: Option<&str>,
        age: Option<u32>,
    ) -> Vec<TrialRecord>;
}

#[async_trait]
impl<F: StudyFetcher> TrialSearch for RegistryClient<F> {
    async fn search(
        &self,
        condition: &str,
        location: &str,
        stage: Option<&str>,
        age: Option<u32>,
    ) -> Vec<TrialRecord> {
        RegistryClient::search(self, condition, location, stage, age).await
    }
}

/// Reply for one conversational turn.
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub response: String,
    /// Present only for search turns.
    pub trials: Option<Vec<TrialRecord>>,
}

/// Acknowledgement of a successful intake submission.
#[derive(Debug, Clone)]
pub struct IntakeConfirmation {
    pub message: String,
}

/// Central conversation engine. One instance serves all sessions.
pub struct ConversationEngine {
    nlu: Arc<dyn NluGateway>,
    trials: Arc<dyn TrialSearch>,
    store: SessionStore,
    config: ChatConfig,
}

impl ConversationEngine {
    pub fn new(nlu: Arc<dyn NluGateway>, trials: Arc<dyn TrialSearch>, config: ChatConfig) -> Self {
        Self {
            nlu,
            trials,
            store: SessionStore::new(),
            config,
        }
    }

    /// Handle the one-time intake submission for a session.
    ///
    /// All mandatory fields must be present; they are applied in a single
    /// atomic update and the session becomes query-ready.
    pub fn submit_intake(
        &self,
        session_id: &str,
        submission: IntakeSubmission,
    ) -> Result<IntakeConfirmation, ChatError> {
        validate_intake(&submission)?;

        let mut state = self.store.snapshot(session_id)?;
        state.apply_intake(&submission, &self.config);
        let message = reply::intake_confirmation(&state);
        self.store.put(session_id, state)?;

        tracing::info!(session_id, "Intake complete");
        Ok(IntakeConfirmation { message })
    }

    /// Handle one conversational message for a session.
    pub async fn handle_message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<TurnReply, ChatError> {
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.len() > self.config.max_message_length {
            return Err(ChatError::MessageTooLong(self.config.max_message_length));
        }

        let mut state = self.store.snapshot(session_id)?;

        // Intake gate: no slot merging, no NLU, just guidance.
        if !state.intake_complete {
            self.store.put(session_id, state)?;
            return Ok(TurnReply {
                response: reply::intake_required(),
                trials: None,
            });
        }

        // NLU failures degrade to "no entities, default intent" so the turn
        // ends in a clarification prompt instead of an error.
        let outcome = match self.nlu.extract(text, &state.known_slots()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "NLU gateway failed; degrading");
                NluOutcome::default()
            }
        };
        tracing::debug!(session_id, intent = outcome.intent.as_str(), "Turn classified");

        state.apply_slots(&outcome.slots, &self.config);

        let turn = match outcome.intent {
            Intent::Greeting => TurnReply {
                response: reply::greeting(),
                trials: None,
            },
            Intent::Goodbye => TurnReply {
                response: reply::farewell(),
                trials: None,
            },
            Intent::FindTrials if state.is_query_ready() => {
                let condition = state.cancer_type.clone().unwrap_or_default();
                let location = state.location.clone().unwrap_or_default();
                let records = self
                    .trials
                    .search(&condition, &location, state.stage.as_deref(), state.age)
                    .await;
                TurnReply {
                    response: reply::search_results(&state, &records),
                    trials: Some(records),
                }
            }
            // A find-trials ask on an incomplete profile falls through to
            // clarification, same as anything unrecognized.
            Intent::FindTrials | Intent::Other => TurnReply {
                response: reply::clarification(state.missing_field()),
                trials: None,
            },
        };

        state.touch();
        self.store.put(session_id, state)?;
        Ok(turn)
    }

    /// End a session, discarding its state. Idempotent: ending an unknown
    /// session is a no-op. Returns whether the session existed.
    pub fn end_session(&self, session_id: &str) -> Result<bool, ChatError> {
        let existed = self.store.remove(session_id)?;
        tracing::info!(session_id, existed, "Session ended");
        Ok(existed)
    }

    /// Summaries of all live sessions.
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>, ChatError> {
        self.store.list()
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    /// Snapshot a session's state, if it exists.
    pub fn session_state(&self, session_id: &str) -> Result<Option<ConversationState>, ChatError> {
        self.store.get(session_id)
    }
}

fn validate_intake(submission: &IntakeSubmission) -> Result<(), ChatError> {
    if submission.cancer_type.trim().is_empty() {
        return Err(ChatError::MissingIntakeField("cancer_type"));
    }
    if submission.stage.trim().is_empty() {
        return Err(ChatError::MissingIntakeField("stage"));
    }
    if submission.age == 0 {
        return Err(ChatError::MissingIntakeField("age"));
    }
    if submission.sex.trim().is_empty() {
        return Err(ChatError::MissingIntakeField("sex"));
    }
    if submission.location.trim().is_empty() {
        return Err(ChatError::MissingIntakeField("location"));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
