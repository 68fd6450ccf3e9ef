//! TrialMatch application binary - composition root.
//!
//! Ties together the TrialMatch crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Initialize tracing
//! 3. Select the NLU gateway (hosted model server, or the rule fallback)
//! 4. Build the registry client and conversation engine
//! 5. Start the axum REST API server

mod cli;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use trialmatch_api::{routes, AppState};
use trialmatch_chat::{ConversationEngine, TrialSearch};
use trialmatch_core::TrialMatchConfig;
use trialmatch_nlu::{HttpNluGateway, NluGateway, RuleNlu};
use trialmatch_registry::RegistryClient;

use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), trialmatch_core::TrialMatchError> {
    let args = CliArgs::parse();

    let config_path = args.resolve_config_path();
    let config = TrialMatchConfig::load_or_default(&config_path);

    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level.clone())),
        )
        .init();

    tracing::info!(config = %config_path.display(), %log_level, "TrialMatch starting");

    // NLU gateway: hosted model server when configured, rule-based
    // fallback otherwise.
    let nlu: Arc<dyn NluGateway> = match config.nlu.endpoint {
        Some(ref endpoint) => {
            tracing::info!(%endpoint, "Using hosted NLU model server");
            Arc::new(HttpNluGateway::new(
                endpoint.clone(),
                Duration::from_secs(config.nlu.timeout_secs),
            ))
        }
        None => {
            tracing::info!("No NLU endpoint configured; using rule-based gateway");
            Arc::new(RuleNlu::new())
        }
    };

    let registry: Arc<dyn TrialSearch> = Arc::new(RegistryClient::from_config(&config.registry));

    let engine = ConversationEngine::new(nlu, registry, config.chat.clone());
    let state = AppState::new(engine);

    let port = args.resolve_port(config.general.port);
    routes::start_server(port, state).await
}
