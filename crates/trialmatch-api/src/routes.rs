//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, request tracing, a body limit,
//! and all endpoint handlers.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
///
/// CORS is permissive: the web frontend is served from arbitrary origins
/// during development. Tighten for production deployments.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/intake", post(handlers::submit_intake))
        .route("/message", post(handlers::handle_message))
        .route("/sessions", get(handlers::list_sessions))
        .route("/sessions/{id}", delete(handlers::end_session))
        .layer(DefaultBodyLimit::max(64 * 1024)) // profiles and messages are small
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server on the given port.
///
/// Binds to 127.0.0.1 (localhost only).
pub async fn start_server(
    port: u16,
    state: AppState,
) -> Result<(), trialmatch_core::TrialMatchError> {
    let addr = format!("127.0.0.1:{}", port);
    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| trialmatch_core::TrialMatchError::Api(format!("Failed to bind: {}", e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| trialmatch_core::TrialMatchError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
