//! Session store: explicit ownership of all conversation state.
//!
//! A mapping from opaque session id to [`ConversationState`] behind
//! get/put/delete. The store does not serialize turns: callers keep
//! at-most-one in-flight turn per session id (the transport layer's
//! responsibility), while different sessions proceed fully in parallel.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ChatError;
use crate::state::ConversationState;

/// Observability summary of one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub intake_complete: bool,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

/// In-memory session map. State lives for the process lifetime only.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, ConversationState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the session's state, or a fresh default for an unknown
    /// id. Does not insert: a session is created by the turn-ending
    /// [`SessionStore::put`], so an abandoned turn leaves nothing behind.
    pub fn snapshot(&self, session_id: &str) -> Result<ConversationState, ChatError> {
        let sessions = self.lock()?;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }

    /// The session's state, if the session exists.
    pub fn get(&self, session_id: &str) -> Result<Option<ConversationState>, ChatError> {
        let sessions = self.lock()?;
        Ok(sessions.get(session_id).cloned())
    }

    /// Atomically replace the session's state. This is the only write.
    pub fn put(&self, session_id: &str, state: ConversationState) -> Result<(), ChatError> {
        let mut sessions = self.lock()?;
        sessions.insert(session_id.to_string(), state);
        Ok(())
    }

    /// Remove a session. Idempotent: removing an unknown id is a no-op.
    /// Returns whether the session existed.
    pub fn remove(&self, session_id: &str) -> Result<bool, ChatError> {
        let mut sessions = self.lock()?;
        Ok(sessions.remove(session_id).is_some())
    }

    /// Summaries of all live sessions.
    pub fn list(&self) -> Result<Vec<SessionSummary>, ChatError> {
        let sessions = self.lock()?;
        Ok(sessions
            .iter()
            .map(|(id, state)| SessionSummary {
                session_id: id.clone(),
                intake_complete: state.intake_complete,
                created_at: state.created_at,
                last_active_at: state.last_active_at,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, ConversationState>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|e| ChatError::StoreError(format!("session lock poisoned: {}", e)))
    }
}
