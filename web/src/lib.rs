/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod auth;
pub mod endpoints;
pub mod error;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::{Router, middleware};
use common::consts::NOTIFICATION_PATH;
use common::types::ServerState;
use ingest::IngestService;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub notification_token: Arc<String>,
    pub ingest: IngestService,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(NOTIFICATION_PATH, post(endpoints::results::post_new_result))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authorize_notification,
        ))
        .route("/api/health", get(endpoints::get_health))
        .fallback(endpoints::handle_404)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve_web(state: Arc<ServerState>) -> Result<()> {
    let app_state = AppState {
        notification_token: Arc::new(state.notification_token.clone()),
        ingest: IngestService::from_state(&state).context("Failed to set up result ingestion")?,
    };

    let server_url = format!("{}:{}", state.cli.ip, state.cli.port);
    let listener = tokio::net::TcpListener::bind(&server_url)
        .await
        .with_context(|| format!("Failed to bind {}", server_url))?;

    info!(address = %server_url, "Listening for build results");
    axum::serve(listener, create_router(app_state))
        .await
        .context("Web server stopped")
}
