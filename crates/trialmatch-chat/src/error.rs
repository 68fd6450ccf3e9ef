//! Error types for the conversation engine.
//!
//! Only caller-side contract violations surface as errors. Situations that
//! call for conversational guidance (messages before intake, vague
//! requests) are normal replies, and downstream failures (NLU, registry)
//! are absorbed before they reach a turn boundary.

/// Errors from the conversation engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("intake submission is missing required field: {0}")]
    MissingIntakeField(&'static str),
    #[error("session store error: {0}")]
    StoreError(String),
}
