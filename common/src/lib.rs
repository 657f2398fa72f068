/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod consts;
pub mod database;
pub mod error;
pub mod input;
pub mod types;

use anyhow::{Context, Result};
use database::connect_db;
use input::load_secret;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;
use types::*;

pub async fn init_state(cli: Cli) -> Result<Arc<ServerState>> {
    info!(ip = %cli.ip, port = cli.port, "Starting Conduit server");

    let notification_token = load_secret(&cli.notification_token_file);
    if notification_token.is_empty() {
        anyhow::bail!(
            "Notification token file {} is empty or unreadable",
            cli.notification_token_file
        );
    }

    let ci_token = cli.ci_token_file.as_deref().map(load_secret);

    let db = connect_db(&cli)
        .await
        .context("Failed to initialize database")?;

    let (results, _) = broadcast::channel(RESULT_EVENT_CAPACITY);

    Ok(Arc::new(ServerState {
        db,
        cli,
        ci_token,
        notification_token,
        results,
    }))
}
