/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use entity::exercise::ProgrammingLanguage;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use super::consts::PAYLOAD_EXCERPT_LENGTH;

#[derive(Debug, Error)]
pub enum CiError {
    #[error(
        "no build plan template for {language} (static analysis: {static_analysis}, sequential runs: {sequential_runs})"
    )]
    TemplateNotFound {
        language: ProgrammingLanguage,
        static_analysis: bool,
        sequential_runs: bool,
    },
    #[error("template token {0} has no value")]
    UnresolvedToken(String),
    #[error("repository node not found: {0}")]
    RepositoryNodeNotFound(String),
    #[error("invalid plan configuration: {0}")]
    InvalidConfiguration(String),
    #[error("malformed notification payload: {reason}")]
    MalformedPayload { reason: String, payload: String },
    #[error("CI server answered {status} on {path}: {message}")]
    CiConnector {
        status: u16,
        path: String,
        message: String,
    },
    #[error("CI server not reachable on {path}: {message}")]
    Transport { path: String, message: String },
    #[error("no participation uses build plan {0}")]
    UnknownPlan(String),
    #[error("ambiguous submission for participation {participation}: {reason}")]
    CorrelationAmbiguity { participation: Uuid, reason: String },
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl CiError {
    pub fn malformed_payload(reason: impl Into<String>, payload: &str) -> Self {
        CiError::MalformedPayload {
            reason: reason.into(),
            payload: payload_excerpt(payload),
        }
    }

    /// Transport failures and server-side hiccups may succeed on a later
    /// attempt; everything else needs a change in configuration or data.
    pub fn is_retryable(&self) -> bool {
        match self {
            CiError::Transport { .. } => true,
            CiError::CiConnector { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub type CiResult<T> = Result<T, CiError>;

pub fn payload_excerpt(payload: &str) -> String {
    if payload.chars().count() <= PAYLOAD_EXCERPT_LENGTH {
        return payload.to_string();
    }

    let mut excerpt: String = payload.chars().take(PAYLOAD_EXCERPT_LENGTH).collect();
    excerpt.push_str("...");
    excerpt
}
