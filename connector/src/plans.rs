/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::*;
use serde::Deserialize;
use tracing::{debug, info, instrument};

#[derive(Debug, Deserialize)]
struct JobInfo {
    #[serde(default, rename = "inQueue")]
    in_queue: bool,
    #[serde(default, rename = "lastBuild")]
    last_build: Option<BuildInfo>,
}

#[derive(Debug, Deserialize)]
struct BuildInfo {
    #[serde(default)]
    building: bool,
}

const JOB_INFO_TREE: &str = "inQueue,lastBuild[building]";

fn plan_context(plan: &PlanKey, e: CiError) -> CiError {
    match e {
        CiError::RepositoryNodeNotFound(message) => {
            CiError::RepositoryNodeNotFound(format!("{}: {}", plan, message))
        }
        CiError::InvalidConfiguration(message) => {
            CiError::InvalidConfiguration(format!("{}: {}", plan, message))
        }
        e => e,
    }
}

pub async fn create_plan(config: &RequestConfig, plan: &PlanKey, configuration: &str) -> CiResult<()> {
    plan.validate()?;

    let endpoint = JenkinsEndpoint::CreatePlan {
        project: &plan.project_key,
    };
    let request = get_client(config, endpoint, RequestType::POST)?
        .query(&[("name", plan.plan_key.as_str())])
        .header(reqwest::header::CONTENT_TYPE, "application/xml")
        .body(configuration.to_string());

    send(request, endpoint).await?;
    info!(plan = %plan, "Created build plan");
    Ok(())
}

/// Creates `target` from the configuration of `source`. Both plans may live
/// in different folders.
pub async fn copy_plan(config: &RequestConfig, source: &PlanKey, target: &PlanKey) -> CiResult<()> {
    let configuration = get_plan_config(config, source).await?;
    create_plan(config, target, &configuration).await?;
    debug!(source = %source, target = %target, "Copied build plan");
    Ok(())
}

#[instrument(skip(config, source), fields(target = %target))]
pub async fn create_or_copy_plan(
    config: &RequestConfig,
    source: PlanSource,
    target: &PlanKey,
) -> CiResult<()> {
    match source {
        PlanSource::Copy(source) => copy_plan(config, &source, target).await,
        PlanSource::Document(configuration) => create_plan(config, target, &configuration).await,
    }
}

pub async fn get_plan_config(config: &RequestConfig, plan: &PlanKey) -> CiResult<String> {
    let endpoint = JenkinsEndpoint::PlanConfig {
        project: &plan.project_key,
        plan: &plan.plan_key,
    };

    let res = send(get_client(config, endpoint, RequestType::GET)?, endpoint).await?;
    read_text(res, endpoint).await
}

pub async fn update_plan_config(
    config: &RequestConfig,
    plan: &PlanKey,
    configuration: &str,
) -> CiResult<()> {
    let endpoint = JenkinsEndpoint::PlanConfig {
        project: &plan.project_key,
        plan: &plan.plan_key,
    };
    let request = get_client(config, endpoint, RequestType::POST)?
        .header(reqwest::header::CONTENT_TYPE, "application/xml")
        .body(configuration.to_string());

    send(request, endpoint).await?;
    Ok(())
}

/// Points the checkout of one repository kind at `new_url`. Only the url
/// inside the stored configuration changes.
#[instrument(skip(config), fields(plan = %plan))]
pub async fn update_plan_repository(
    config: &RequestConfig,
    plan: &PlanKey,
    kind: RepositoryKind,
    new_url: &str,
    previous_url: &str,
) -> CiResult<()> {
    let raw = get_plan_config(config, plan).await?;

    let mut document = PlanDocument::parse(raw).map_err(|e| plan_context(plan, e))?;
    document
        .update_repository(kind, new_url, previous_url)
        .map_err(|e| plan_context(plan, e))?;

    update_plan_config(config, plan, document.to_xml()).await?;
    info!(kind = %kind, "Updated plan repository");
    Ok(())
}

pub async fn enable_plan(config: &RequestConfig, plan: &PlanKey) -> CiResult<()> {
    let endpoint = JenkinsEndpoint::EnablePlan {
        project: &plan.project_key,
        plan: &plan.plan_key,
    };

    send(get_client(config, endpoint, RequestType::POST)?, endpoint).await?;
    Ok(())
}

/// Deletes a plan. A missing plan counts as deleted.
pub async fn delete_plan(config: &RequestConfig, plan: &PlanKey) -> CiResult<()> {
    let endpoint = JenkinsEndpoint::DeletePlan {
        project: &plan.project_key,
        plan: &plan.plan_key,
    };

    match send(get_client(config, endpoint, RequestType::POST)?, endpoint).await {
        Ok(_) => {
            info!(plan = %plan, "Deleted build plan");
            Ok(())
        }
        Err(e) if is_not_found(&e) => Ok(()),
        Err(e) => Err(e),
    }
}

pub async fn plan_exists(config: &RequestConfig, plan: &PlanKey) -> CiResult<bool> {
    let endpoint = JenkinsEndpoint::PlanApi {
        project: &plan.project_key,
        plan: &plan.plan_key,
    };

    match send(get_client(config, endpoint, RequestType::GET)?, endpoint).await {
        Ok(_) => Ok(true),
        Err(e) if is_not_found(&e) => Ok(false),
        Err(e) => Err(e),
    }
}

pub async fn get_plan_status(config: &RequestConfig, plan: &PlanKey) -> CiResult<PlanStatus> {
    let endpoint = JenkinsEndpoint::PlanApi {
        project: &plan.project_key,
        plan: &plan.plan_key,
    };
    let request = get_client(config, endpoint, RequestType::GET)?.query(&[("tree", JOB_INFO_TREE)]);

    let res = send(request, endpoint).await?;
    let body = read_text(res, endpoint).await?;
    let info: JobInfo = serde_json::from_str(&body).map_err(|e| CiError::CiConnector {
        status: 200,
        path: endpoint.path(),
        message: format!("unexpected job info: {}", e),
    })?;

    Ok(if info.in_queue {
        PlanStatus::Queued
    } else if info.last_build.is_some_and(|b| b.building) {
        PlanStatus::Building
    } else {
        PlanStatus::Inactive
    })
}
