//! NLU gateway boundary for TrialMatch.
//!
//! Defines the contract the conversation engine consumes, an HTTP adapter
//! for the hosted intent/entity model server, and a rule-based fallback
//! gateway for running without one.

pub mod gateway;
pub mod http;
pub mod rules;

pub use gateway::{NluError, NluGateway, NluOutcome};
pub use http::HttpNluGateway;
pub use rules::RuleNlu;
