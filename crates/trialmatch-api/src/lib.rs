//! TrialMatch API crate - axum HTTP server and route handlers.
//!
//! Thin transport over the conversation engine: intake submission,
//! conversational messages, session lifecycle, and health checks.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
