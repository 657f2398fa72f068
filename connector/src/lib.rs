/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod builds;
pub mod document;
pub mod endpoints;
pub mod folders;
pub mod plans;
pub mod service;

use common::error::{CiError, CiResult};
use common::input::{check_plan_key, truncate_chars};
use endpoints::JenkinsEndpoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

pub use document::{ConfigurationShape, PlanDocument, RepositoryKind};
pub use service::{ContinuousIntegrationService, JenkinsService};

pub type RequestType = reqwest::Method;

const ERROR_HEADER: &str = "X-Error";
const ERROR_MESSAGE_LENGTH: usize = 500;

#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub server_url: Url,
    pub username: String,
    pub token: Option<String>,
    pub timeout: Duration,
    client: reqwest::Client,
}

impl RequestConfig {
    pub fn new(
        server_url: &str,
        username: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> CiResult<Self> {
        let server_url = Url::parse(server_url).map_err(|e| {
            CiError::InvalidConfiguration(format!("invalid CI url {}: {}", server_url, e))
        })?;

        // Jenkins answers most POSTs with a redirect to the job page
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| CiError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            server_url,
            username: username.into(),
            token,
            timeout,
            client,
        })
    }
}

/// A Jenkins job inside its folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanKey {
    pub project_key: String,
    pub plan_key: String,
}

impl PlanKey {
    pub fn new(project_key: impl Into<String>, plan_key: impl Into<String>) -> Self {
        Self {
            project_key: project_key.into(),
            plan_key: plan_key.into(),
        }
    }

    pub fn validate(&self) -> CiResult<()> {
        check_plan_key(&self.project_key)
            .and_then(|_| check_plan_key(&self.plan_key))
            .map_err(|e| CiError::InvalidConfiguration(format!("{}: {}", self, e)))
    }
}

impl fmt::Display for PlanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project_key, self.plan_key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    /// Copy the configuration of an existing plan.
    Copy(PlanKey),
    /// Create the plan from a rendered configuration document.
    Document(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    Inactive,
    Queued,
    Building,
}

fn get_client(
    config: &RequestConfig,
    endpoint: JenkinsEndpoint<'_>,
    request_type: RequestType,
) -> CiResult<reqwest::RequestBuilder> {
    let url = endpoint.url(&config.server_url)?;
    let mut client = config
        .client
        .request(request_type, url)
        .timeout(config.timeout);

    if let Some(token) = &config.token {
        client = client.basic_auth(&config.username, Some(token));
    }

    Ok(client)
}

async fn send(
    request: reqwest::RequestBuilder,
    endpoint: JenkinsEndpoint<'_>,
) -> CiResult<reqwest::Response> {
    let res = request.send().await.map_err(|e| CiError::Transport {
        path: endpoint.path(),
        message: e.to_string(),
    })?;

    let status = res.status();
    if status.is_success() || (status.is_redirection() && endpoint.redirects_on_success()) {
        return Ok(res);
    }

    if status.is_redirection() {
        let location = res
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        return Err(CiError::CiConnector {
            status: status.as_u16(),
            path: endpoint.path(),
            message: format!("unexpected redirect to '{}'", location),
        });
    }

    let header = res
        .headers()
        .get(ERROR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let message = match header {
        Some(message) => message,
        None => {
            let body = res.text().await.unwrap_or_default();
            let body = body.trim();
            if body.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                truncate_chars(body, ERROR_MESSAGE_LENGTH)
            }
        }
    };

    Err(CiError::CiConnector {
        status: status.as_u16(),
        path: endpoint.path(),
        message,
    })
}

async fn read_text(res: reqwest::Response, endpoint: JenkinsEndpoint<'_>) -> CiResult<String> {
    res.text().await.map_err(|e| CiError::Transport {
        path: endpoint.path(),
        message: e.to_string(),
    })
}

pub(crate) fn is_not_found(e: &CiError) -> bool {
    matches!(e, CiError::CiConnector { status: 404, .. })
}

pub(crate) fn is_already_exists(e: &CiError) -> bool {
    matches!(e, CiError::CiConnector { status: 400, message, .. } if message.contains("already exists"))
}

pub async fn health(config: &RequestConfig) -> CiResult<()> {
    let endpoint = JenkinsEndpoint::Root;
    send(get_client(config, endpoint, RequestType::GET)?, endpoint).await?;
    Ok(())
}
