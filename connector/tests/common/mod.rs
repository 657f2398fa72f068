/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! In-process stand-in for the Jenkins REST API.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use connector::{JenkinsService, RequestConfig};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct Job {
    pub config: String,
    pub enabled: bool,
    pub builds: u32,
    pub in_queue: bool,
    pub building: bool,
    pub console: String,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub folders: BTreeSet<String>,
    pub jobs: BTreeMap<(String, String), Job>,
    pub authorization: Vec<Option<String>>,
    /// Answer read requests with a redirect to the login page.
    pub login_redirect: bool,
}

pub type Shared = Arc<Mutex<FakeState>>;

pub struct FakeJenkins {
    pub url: String,
    pub state: Shared,
}

impl FakeJenkins {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState::default()));

        let app = Router::new()
            .route("/api/json", get(root))
            .route("/createItem", post(create_folder))
            .route("/job/{project}/doDelete", post(delete_folder))
            .route("/job/{project}/createItem", post(create_job))
            .route(
                "/job/{project}/job/{plan}/config.xml",
                get(get_config).post(post_config),
            )
            .route("/job/{project}/job/{plan}/api/json", get(job_info))
            .route("/job/{project}/job/{plan}/enable", post(enable_job))
            .route("/job/{project}/job/{plan}/build", post(build_job))
            .route("/job/{project}/job/{plan}/doDelete", post(delete_job))
            .route(
                "/job/{project}/job/{plan}/lastBuild/logText/progressiveHtml",
                get(console),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    pub fn service(&self) -> JenkinsService {
        let config = RequestConfig::new(
            &self.url,
            "conduit",
            Some("api-token".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();

        JenkinsService::new(config)
    }

    pub fn add_job(&self, project: &str, plan: &str, job: Job) {
        let mut state = self.state.lock().unwrap();
        state.folders.insert(project.to_string());
        state
            .jobs
            .insert((project.to_string(), plan.to_string()), job);
    }

    pub fn job(&self, project: &str, plan: &str) -> Option<Job> {
        self.state
            .lock()
            .unwrap()
            .jobs
            .get(&(project.to_string(), plan.to_string()))
            .cloned()
    }
}

fn record(state: &Shared, headers: &HeaderMap) {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.lock().unwrap().authorization.push(auth);
}

fn login_redirect() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/login?from=%2F")], "").into_response()
}

fn already_exists(name: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        [("X-Error", format!("A job already exists with the name {}", name))],
        "",
    )
        .into_response()
}

async fn root(State(state): State<Shared>, headers: HeaderMap) -> impl IntoResponse {
    record(&state, &headers);
    r#"{"mode":"NORMAL"}"#
}

async fn create_folder(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(&state, &headers);
    let Some(name) = query.get("name") else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let mut state = state.lock().unwrap();
    if !state.folders.insert(name.clone()) {
        return already_exists(name);
    }

    StatusCode::FOUND.into_response()
}

async fn delete_folder(State(state): State<Shared>, Path(project): Path<String>) -> StatusCode {
    let mut state = state.lock().unwrap();
    if !state.folders.remove(&project) {
        return StatusCode::NOT_FOUND;
    }

    state.jobs.retain(|(p, _), _| p != &project);
    StatusCode::FOUND
}

async fn create_job(
    State(state): State<Shared>,
    Path(project): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    let Some(name) = query.get("name") else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let mut state = state.lock().unwrap();
    if !state.folders.contains(&project) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let key = (project, name.clone());
    if state.jobs.contains_key(&key) {
        return already_exists(name);
    }

    state.jobs.insert(
        key,
        Job {
            config: body,
            ..Default::default()
        },
    );
    StatusCode::OK.into_response()
}

async fn get_config(
    State(state): State<Shared>,
    Path((project, plan)): Path<(String, String)>,
) -> Response {
    let state = state.lock().unwrap();
    if state.login_redirect {
        return login_redirect();
    }

    match state.jobs.get(&(project, plan)) {
        Some(job) => job.config.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn post_config(
    State(state): State<Shared>,
    Path((project, plan)): Path<(String, String)>,
    body: String,
) -> StatusCode {
    match state.lock().unwrap().jobs.get_mut(&(project, plan)) {
        Some(job) => {
            job.config = body;
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn job_info(
    State(state): State<Shared>,
    Path((project, plan)): Path<(String, String)>,
) -> Response {
    let state = state.lock().unwrap();
    if state.login_redirect {
        return login_redirect();
    }

    match state.jobs.get(&(project, plan)) {
        Some(job) => format!(
            r#"{{"_class":"org.jenkinsci.plugins.workflow.job.WorkflowJob","inQueue":{},"lastBuild":{{"building":{}}}}}"#,
            job.in_queue, job.building
        )
        .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn enable_job(
    State(state): State<Shared>,
    Path((project, plan)): Path<(String, String)>,
) -> StatusCode {
    match state.lock().unwrap().jobs.get_mut(&(project, plan)) {
        Some(job) => {
            job.enabled = true;
            StatusCode::FOUND
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn build_job(
    State(state): State<Shared>,
    Path((project, plan)): Path<(String, String)>,
) -> StatusCode {
    match state.lock().unwrap().jobs.get_mut(&(project, plan)) {
        Some(job) => {
            job.builds += 1;
            job.in_queue = true;
            StatusCode::CREATED
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn delete_job(
    State(state): State<Shared>,
    Path((project, plan)): Path<(String, String)>,
) -> StatusCode {
    match state.lock().unwrap().jobs.remove(&(project, plan)) {
        Some(_) => StatusCode::FOUND,
        None => StatusCode::NOT_FOUND,
    }
}

async fn console(
    State(state): State<Shared>,
    Path((project, plan)): Path<(String, String)>,
) -> Response {
    match state.lock().unwrap().jobs.get(&(project, plan)) {
        Some(job) if job.builds > 0 || !job.console.is_empty() => job.console.clone().into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
