//! The NLU gateway contract.
//!
//! The conversation engine consumes intent classification and entity
//! extraction through this trait and never sees the model behind it.

use async_trait::async_trait;

use trialmatch_core::{Intent, SlotValues};

/// Errors from an NLU gateway implementation.
///
/// The conversation engine catches these at the boundary and degrades to
/// `Intent::Other` with no slots, so a model failure costs one clarification
/// prompt rather than the turn.
#[derive(Debug, thiserror::Error)]
pub enum NluError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("model server returned status {0}")]
    Status(u16),
    #[error("could not decode model response: {0}")]
    Decode(String),
    #[error("model request timed out")]
    Timeout,
}

/// One utterance's worth of NLU output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NluOutcome {
    /// Classified intent, `Other` when nothing matched.
    pub intent: Intent,
    /// Extracted slot values, filtered to the fixed slot enumeration.
    /// Absent slots are absent keys; values are never empty strings.
    pub slots: SlotValues,
}

/// Intent classification and entity extraction over raw utterance text.
///
/// Implementations must be idempotent and side-effect-free from the
/// caller's perspective. `context` carries the slots already known for the
/// session so the model can resolve elliptical follow-ups ("stage 3" after
/// a cancer type is known).
#[async_trait]
pub trait NluGateway: Send + Sync {
    async fn extract(&self, text: &str, context: &SlotValues)
        -> Result<NluOutcome, NluError>;
}
