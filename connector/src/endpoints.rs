/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use common::error::{CiError, CiResult};
use url::Url;

/// REST paths of the Jenkins API, parameterized by folder (project) and job
/// (plan) names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JenkinsEndpoint<'a> {
    Root,
    CreateFolder,
    DeleteFolder { project: &'a str },
    CreatePlan { project: &'a str },
    PlanConfig { project: &'a str, plan: &'a str },
    PlanApi { project: &'a str, plan: &'a str },
    EnablePlan { project: &'a str, plan: &'a str },
    TriggerBuild { project: &'a str, plan: &'a str },
    DeletePlan { project: &'a str, plan: &'a str },
    LastBuildConsole { project: &'a str, plan: &'a str },
}

impl<'a> JenkinsEndpoint<'a> {
    pub fn segments(&self) -> Vec<&'a str> {
        match *self {
            JenkinsEndpoint::Root => vec!["api", "json"],
            JenkinsEndpoint::CreateFolder => vec!["createItem"],
            JenkinsEndpoint::DeleteFolder { project } => vec!["job", project, "doDelete"],
            JenkinsEndpoint::CreatePlan { project } => vec!["job", project, "createItem"],
            JenkinsEndpoint::PlanConfig { project, plan } => {
                vec!["job", project, "job", plan, "config.xml"]
            }
            JenkinsEndpoint::PlanApi { project, plan } => {
                vec!["job", project, "job", plan, "api", "json"]
            }
            JenkinsEndpoint::EnablePlan { project, plan } => {
                vec!["job", project, "job", plan, "enable"]
            }
            JenkinsEndpoint::TriggerBuild { project, plan } => {
                vec!["job", project, "job", plan, "build"]
            }
            JenkinsEndpoint::DeletePlan { project, plan } => {
                vec!["job", project, "job", plan, "doDelete"]
            }
            JenkinsEndpoint::LastBuildConsole { project, plan } => vec![
                "job",
                project,
                "job",
                plan,
                "lastBuild",
                "logText",
                "progressiveHtml",
            ],
        }
    }

    /// Jenkins answers these actions with a redirect to the affected page.
    pub fn redirects_on_success(&self) -> bool {
        matches!(
            self,
            JenkinsEndpoint::CreateFolder
                | JenkinsEndpoint::DeleteFolder { .. }
                | JenkinsEndpoint::CreatePlan { .. }
                | JenkinsEndpoint::EnablePlan { .. }
                | JenkinsEndpoint::TriggerBuild { .. }
                | JenkinsEndpoint::DeletePlan { .. }
        )
    }

    pub fn path(&self) -> String {
        format!("/{}", self.segments().join("/"))
    }

    /// Appends the endpoint to `base`, keeping any path prefix Jenkins is
    /// served under. Segments are percent-encoded.
    pub fn url(&self, base: &Url) -> CiResult<Url> {
        let mut url = base.clone();

        url.path_segments_mut()
            .map_err(|_| {
                CiError::InvalidConfiguration(format!("{} cannot be used as CI base url", base))
            })?
            .pop_if_empty()
            .extend(self.segments());

        Ok(url)
    }
}
