/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::*;
use tracing::info;

pub async fn trigger_build(config: &RequestConfig, plan: &PlanKey) -> CiResult<()> {
    let endpoint = JenkinsEndpoint::TriggerBuild {
        project: &plan.project_key,
        plan: &plan.plan_key,
    };

    send(get_client(config, endpoint, RequestType::POST)?, endpoint).await?;
    info!(plan = %plan, "Triggered build");
    Ok(())
}

/// Console output of the last build as rendered by Jenkins (HTML).
pub async fn get_build_logs(config: &RequestConfig, plan: &PlanKey) -> CiResult<String> {
    let endpoint = JenkinsEndpoint::LastBuildConsole {
        project: &plan.project_key,
        plan: &plan.plan_key,
    };

    let res = send(get_client(config, endpoint, RequestType::GET)?, endpoint).await?;
    read_text(res, endpoint).await
}
