/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use async_trait::async_trait;
use common::error::CiResult;
use common::types::Cli;
use std::time::Duration;

use crate::document::RepositoryKind;
use crate::{PlanKey, PlanSource, PlanStatus, RequestConfig, builds, folders, plans};

/// Operations provisioning and ingestion need from a CI server. One
/// implementation per CI backend.
#[async_trait]
pub trait ContinuousIntegrationService: Send + Sync {
    async fn health(&self) -> CiResult<()>;

    async fn create_project(&self, project_key: &str) -> CiResult<()>;
    async fn delete_project(&self, project_key: &str) -> CiResult<()>;

    async fn create_or_copy_plan(&self, source: PlanSource, target: &PlanKey) -> CiResult<()>;
    async fn get_plan_config(&self, plan: &PlanKey) -> CiResult<String>;
    async fn update_plan_config(&self, plan: &PlanKey, configuration: &str) -> CiResult<()>;
    async fn update_plan_repository(
        &self,
        plan: &PlanKey,
        kind: RepositoryKind,
        new_url: &str,
        previous_url: &str,
    ) -> CiResult<()>;

    async fn enable_plan(&self, plan: &PlanKey) -> CiResult<()>;
    async fn trigger_build(&self, plan: &PlanKey) -> CiResult<()>;
    async fn delete_plan(&self, plan: &PlanKey) -> CiResult<()>;
    async fn plan_exists(&self, plan: &PlanKey) -> CiResult<bool>;
    async fn get_plan_status(&self, plan: &PlanKey) -> CiResult<PlanStatus>;
    async fn get_build_logs(&self, plan: &PlanKey) -> CiResult<String>;
}

#[derive(Debug, Clone)]
pub struct JenkinsService {
    config: RequestConfig,
}

impl JenkinsService {
    pub fn new(config: RequestConfig) -> Self {
        Self { config }
    }

    pub fn from_cli(cli: &Cli, token: Option<String>) -> CiResult<Self> {
        let config = RequestConfig::new(
            &cli.ci_url,
            cli.ci_username.clone(),
            token,
            Duration::from_secs(cli.ci_request_timeout),
        )?;

        Ok(Self::new(config))
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }
}

#[async_trait]
impl ContinuousIntegrationService for JenkinsService {
    async fn health(&self) -> CiResult<()> {
        crate::health(&self.config).await
    }

    async fn create_project(&self, project_key: &str) -> CiResult<()> {
        folders::create_project(&self.config, project_key).await
    }

    async fn delete_project(&self, project_key: &str) -> CiResult<()> {
        folders::delete_project(&self.config, project_key).await
    }

    async fn create_or_copy_plan(&self, source: PlanSource, target: &PlanKey) -> CiResult<()> {
        plans::create_or_copy_plan(&self.config, source, target).await
    }

    async fn get_plan_config(&self, plan: &PlanKey) -> CiResult<String> {
        plans::get_plan_config(&self.config, plan).await
    }

    async fn update_plan_config(&self, plan: &PlanKey, configuration: &str) -> CiResult<()> {
        plans::update_plan_config(&self.config, plan, configuration).await
    }

    async fn update_plan_repository(
        &self,
        plan: &PlanKey,
        kind: RepositoryKind,
        new_url: &str,
        previous_url: &str,
    ) -> CiResult<()> {
        plans::update_plan_repository(&self.config, plan, kind, new_url, previous_url).await
    }

    async fn enable_plan(&self, plan: &PlanKey) -> CiResult<()> {
        plans::enable_plan(&self.config, plan).await
    }

    async fn trigger_build(&self, plan: &PlanKey) -> CiResult<()> {
        builds::trigger_build(&self.config, plan).await
    }

    async fn delete_plan(&self, plan: &PlanKey) -> CiResult<()> {
        plans::delete_plan(&self.config, plan).await
    }

    async fn plan_exists(&self, plan: &PlanKey) -> CiResult<bool> {
        plans::plan_exists(&self.config, plan).await
    }

    async fn get_plan_status(&self, plan: &PlanKey) -> CiResult<PlanStatus> {
        plans::get_plan_status(&self.config, plan).await
    }

    async fn get_build_logs(&self, plan: &PlanKey) -> CiResult<String> {
        builds::get_build_logs(&self.config, plan).await
    }
}
