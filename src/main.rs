/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Result;
use clap::Parser;
use common::init_state;
use common::types::Cli;
use connector::{ContinuousIntegrationService, JenkinsService};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", cli.log_level))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let _guard = match (&cli.sentry_dsn, cli.report_errors) {
        (Some(dsn), true) => Some(sentry::init(dsn.as_str())),
        _ => None,
    };

    let state = init_state(cli).await?;

    match JenkinsService::from_cli(&state.cli, state.ci_token.clone()) {
        Ok(jenkins) => match jenkins.health().await {
            Ok(()) => info!(url = %state.cli.ci_url, "Jenkins reachable"),
            Err(e) => warn!(error = %e, "Jenkins not reachable, results will still be accepted"),
        },
        Err(e) => warn!(error = %e, "Invalid Jenkins configuration"),
    }

    web::serve_web(Arc::clone(&state)).await
}
