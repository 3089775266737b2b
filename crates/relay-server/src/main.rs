//! HTTP server entry point.
//!
//! Loads configuration and credentials once, builds the shared agent
//! service client, and serves the relay until shutdown.

use std::sync::Arc;

use anyhow::{Context, Result};
use relay_client::{AgentsClient, TokenProvider};
use relay_config::RelayConfig;
use relay_engine::{Orchestrator, PollPolicy};
use relay_server::{router, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .compact()
        .init();

    let config = RelayConfig::from_env().context("loading configuration")?;
    let credentials =
        TokenProvider::from_env().context("resolving agent service credentials")?;

    let agents = Arc::new(AgentsClient::new(
        &config.project_endpoint,
        &config.agent_id,
        credentials,
    ));

    let policy = PollPolicy {
        run_timeout: config.run_timeout,
        initial_interval: config.poll_initial,
        max_interval: config.poll_max,
    };

    let state = Arc::new(AppState {
        orchestrator: Orchestrator::new(agents, policy),
    });

    let app = router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    info!("starting relay on {} (agent {})", addr, config.agent_id);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
