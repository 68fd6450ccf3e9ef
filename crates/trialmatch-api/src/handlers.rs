//! Route handler functions for all API endpoints.
//!
//! Each handler extracts its JSON/path parameters via axum extractors,
//! delegates to the conversation engine, and returns JSON responses.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trialmatch_chat::{IntakeSubmission, SessionSummary};
use trialmatch_registry::TrialRecord;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct IntakeRequest {
    /// Omitted on the first contact; the server mints one.
    pub session_id: Option<String>,
    #[serde(flatten)]
    pub submission: IntakeSubmission,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IntakeResponse {
    pub session_id: String,
    pub response: String,
    pub intake_complete: bool,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub session_id: String,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trials: Option<Vec<TrialRecord>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EndSessionResponse {
    pub session_id: String,
    pub ended: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub active_sessions: usize,
}

// =============================================================================
// Handler functions
// =============================================================================

/// POST /intake - one-time bulk submission of the patient profile.
pub async fn submit_intake(
    State(state): State<AppState>,
    Json(request): Json<IntakeRequest>,
) -> Result<Json<IntakeResponse>, ApiError> {
    let session_id = resolve_session_id(request.session_id);
    let confirmation = state.engine.submit_intake(&session_id, request.submission)?;
    Ok(Json(IntakeResponse {
        session_id,
        response: confirmation.message,
        intake_complete: true,
    }))
}

/// POST /message - one conversational turn.
pub async fn handle_message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let session_id = resolve_session_id(request.session_id);
    let turn = state.engine.handle_message(&session_id, &request.message).await?;
    Ok(Json(MessageResponse {
        session_id,
        response: turn.response,
        trials: turn.trials,
    }))
}

/// DELETE /sessions/{id} - end a session. Idempotent: the acknowledgement
/// is the same whether or not the session existed.
pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<EndSessionResponse>, ApiError> {
    state.engine.end_session(&session_id)?;
    Ok(Json(EndSessionResponse {
        session_id,
        ended: true,
    }))
}

/// GET /sessions - summaries of all live sessions.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let sessions = state.engine.list_sessions()?;
    Ok(Json(SessionsResponse { sessions }))
}

/// GET /health - liveness and basic counters.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        active_sessions: state.engine.session_count(),
    })
}

/// Use the caller's session id, or mint one for a first contact.
fn resolve_session_id(requested: Option<String>) -> String {
    match requested {
        Some(id) if !id.trim().is_empty() => id,
        _ => Uuid::new_v4().to_string(),
    }
}
