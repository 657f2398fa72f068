/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::input::{greater_than_zero, port_in_range};
use chrono::NaiveDateTime;
use clap::Parser;
use entity::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

pub const RESULT_EVENT_CAPACITY: usize = 256;

#[derive(Parser, Debug, Clone)]
#[command(name = "Conduit", display_name = "Conduit", bin_name = "conduit-server", author = "Wavelens", version, about, long_about = None)]
pub struct Cli {
    #[arg(long, env = "CONDUIT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
    #[arg(long, env = "CONDUIT_IP", default_value = "127.0.0.1")]
    pub ip: String,
    #[arg(long, env = "CONDUIT_PORT", value_parser = port_in_range, default_value_t = 3000)]
    pub port: u16,
    #[arg(long, env = "CONDUIT_DATABASE_URL")]
    pub database_url: Option<String>,
    #[arg(long, env = "CONDUIT_DATABASE_URL_FILE")]
    pub database_url_file: Option<String>,
    #[arg(long, env = "CONDUIT_CI_URL", default_value = "http://127.0.0.1:8080")]
    pub ci_url: String,
    #[arg(long, env = "CONDUIT_CI_USERNAME", default_value = "conduit")]
    pub ci_username: String,
    #[arg(long, env = "CONDUIT_CI_TOKEN_FILE")]
    pub ci_token_file: Option<String>,
    /// Id of the credentials entry Jenkins uses to check out repositories.
    #[arg(long, env = "CONDUIT_CI_CREDENTIALS_KEY", default_value = "conduit-git")]
    pub ci_credentials_key: String,
    #[arg(long, env = "CONDUIT_CI_REQUEST_TIMEOUT", value_parser = greater_than_zero::<u64>, default_value = "30")]
    pub ci_request_timeout: u64,
    /// Public url of this server as reachable from the CI agents.
    #[arg(long, env = "CONDUIT_NOTIFICATION_URL", default_value = "http://127.0.0.1:3000")]
    pub notification_url: String,
    #[arg(long, env = "CONDUIT_NOTIFICATION_TOKEN_FILE")]
    pub notification_token_file: String,
    /// Build timeout in minutes written into every generated pipeline.
    #[arg(long, env = "CONDUIT_BUILD_TIMEOUT", value_parser = greater_than_zero::<u32>, default_value = "30")]
    pub build_timeout: u32,
    #[arg(long, env = "CONDUIT_FETCH_BUILD_LOGS", default_value = "true")]
    pub fetch_build_logs: bool,
    #[arg(long, env = "CONDUIT_REPORT_ERRORS", default_value = "false")]
    pub report_errors: bool,
    #[arg(long, env = "CONDUIT_SENTRY_DSN")]
    pub sentry_dsn: Option<String>,
}

#[derive(Debug)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub cli: Cli,
    pub ci_token: Option<String>,
    pub notification_token: String,
    pub results: broadcast::Sender<ResultEvent>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BaseResponse<T> {
    pub error: bool,
    pub message: T,
}

/// Emitted once a result has been stored, for whoever listens for new
/// results of a participation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEvent {
    pub result_id: Uuid,
    pub participation_id: Uuid,
    pub submission_id: Uuid,
    pub successful: bool,
    pub completion_date: NaiveDateTime,
}

pub type EBuildLogEntry = build_log_entry::Entity;
pub type EExercise = exercise::Entity;
pub type EFeedback = feedback::Entity;
pub type EParticipation = participation::Entity;
pub type EResult = result::Entity;
pub type ESubmission = submission::Entity;

pub type MBuildLogEntry = build_log_entry::Model;
pub type MExercise = exercise::Model;
pub type MFeedback = feedback::Model;
pub type MParticipation = participation::Model;
pub type MResult = result::Model;
pub type MSubmission = submission::Model;

pub type ABuildLogEntry = build_log_entry::ActiveModel;
pub type AExercise = exercise::ActiveModel;
pub type AFeedback = feedback::ActiveModel;
pub type AParticipation = participation::ActiveModel;
pub type AResult = result::ActiveModel;
pub type ASubmission = submission::ActiveModel;

pub type CBuildLogEntry = build_log_entry::Column;
pub type CExercise = exercise::Column;
pub type CFeedback = feedback::Column;
pub type CParticipation = participation::Column;
pub type CResult = result::Column;
pub type CSubmission = submission::Column;
