/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::*;
use common::input::check_plan_key;
use quick_xml::escape::escape;
use tracing::{debug, info};

fn folder_config(description: &str) -> String {
    format!(
        "<?xml version='1.1' encoding='UTF-8'?>\n\
         <com.cloudbees.hudson.plugins.folder.Folder plugin=\"cloudbees-folder\">\n  \
         <description>{}</description>\n  \
         <properties/>\n  \
         <folderViews class=\"com.cloudbees.hudson.plugins.folder.views.DefaultFolderViewHolder\"/>\n  \
         <healthMetrics/>\n\
         </com.cloudbees.hudson.plugins.folder.Folder>\n",
        escape(description)
    )
}

/// Creates the folder holding all plans of an exercise. An existing folder
/// is left alone.
pub async fn create_project(config: &RequestConfig, project_key: &str) -> CiResult<()> {
    check_plan_key(project_key)
        .map_err(|e| CiError::InvalidConfiguration(format!("{}: {}", project_key, e)))?;

    let endpoint = JenkinsEndpoint::CreateFolder;
    let request = get_client(config, endpoint, RequestType::POST)?
        .query(&[("name", project_key)])
        .header(reqwest::header::CONTENT_TYPE, "application/xml")
        .body(folder_config(project_key));

    match send(request, endpoint).await {
        Ok(_) => {
            info!(project = %project_key, "Created CI project");
            Ok(())
        }
        Err(e) if is_already_exists(&e) => {
            debug!(project = %project_key, "CI project already exists");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Deletes a folder with all its plans. A missing folder counts as deleted.
pub async fn delete_project(config: &RequestConfig, project_key: &str) -> CiResult<()> {
    let endpoint = JenkinsEndpoint::DeleteFolder {
        project: project_key,
    };

    match send(get_client(config, endpoint, RequestType::POST)?, endpoint).await {
        Ok(_) => {
            info!(project = %project_key, "Deleted CI project");
            Ok(())
        }
        Err(e) if is_not_found(&e) => {
            debug!(project = %project_key, "CI project already deleted");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
