//! Webhook server runtime.
//!
//! Deliveries are acknowledged with 202 before any sync work happens;
//! processing runs on a spawned task and its failures are observable only
//! in the process log. The startup backfill runs alongside the server.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

use bridge_github::GithubClient;
use bridge_youtrack::YoutrackClient;

use crate::backfill::run_initial_import;
use crate::config::BridgeConfig;
use crate::dispatcher::handle_webhook_event;

pub struct BridgeState {
    pub config: BridgeConfig,
    pub github: GithubClient,
    pub youtrack: YoutrackClient,
}

impl BridgeState {
    pub fn from_config(config: BridgeConfig) -> Result<Self> {
        let github = GithubClient::new(
            &config.github_api_base,
            &config.github_token,
            config.repo.clone(),
        )?;
        let youtrack = YoutrackClient::new(&config.youtrack_url, &config.youtrack_token)?;
        Ok(Self {
            config,
            github,
            youtrack,
        })
    }
}

/// Binds the configured address, kicks off the initial import, and serves
/// webhook deliveries until ctrl-c.
pub async fn run_bridge_server(config: BridgeConfig) -> Result<()> {
    let state = Arc::new(BridgeState::from_config(config)?);

    let listener = TcpListener::bind(state.config.bind.as_str())
        .await
        .with_context(|| format!("failed to bind {}", state.config.bind))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve bound webhook server address")?;
    tracing::info!(
        addr = local_addr.to_string().as_str(),
        repo = state.config.repo.as_slug().as_str(),
        project = state.config.youtrack_project.as_str(),
        "webhook server listening"
    );

    if state.config.skip_initial_import {
        tracing::info!("initial import skipped by configuration");
    } else {
        let import_state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(error) = run_initial_import(
                &import_state.github,
                &import_state.youtrack,
                &import_state.config,
            )
            .await
            {
                let detail = format!("{error:#}");
                tracing::error!(error = detail.as_str(), "initial import failed");
            }
        });
    }

    let app = build_bridge_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("webhook server exited unexpectedly")?;
    Ok(())
}

pub(crate) fn build_bridge_router(state: Arc<BridgeState>) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook))
        .route("/healthz", get(handle_health))
        .with_state(state)
}

async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Acknowledges the delivery immediately, then processes it out of band.
/// The sender gets no success or failure signal for the sync itself.
async fn handle_webhook(
    State(state): State<Arc<BridgeState>>,
    body: String,
) -> impl IntoResponse {
    tokio::spawn(async move {
        if let Err(error) =
            handle_webhook_event(&state.github, &state.youtrack, &state.config, &body).await
        {
            let detail = format!("{error:#}");
            tracing::error!(error = detail.as_str(), "webhook event processing failed");
        }
    });
    (StatusCode::ACCEPTED, "Accepted")
}
