/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#![allow(dead_code)]

use axum_test::TestServer;
use chrono::NaiveDate;
use common::types::*;
use entity::exercise::ProgrammingLanguage;
use entity::participation::ParticipationKind;
use entity::result::AssessmentType;
use ingest::{DatabaseStore, IngestService};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;
use web::{AppState, create_router};

pub const TOKEN: &str = "notification-secret";
pub const NEW_RESULT: &str = "/api/public/programming-exercises/new-result";

pub fn create_mock_cli() -> Cli {
    Cli {
        log_level: "debug".to_string(),
        ip: "127.0.0.1".to_string(),
        port: 3000,
        database_url: Some("mock://test".to_string()),
        database_url_file: None,
        ci_url: "http://127.0.0.1:8080".to_string(),
        ci_username: "conduit".to_string(),
        ci_token_file: None,
        ci_credentials_key: "conduit-git".to_string(),
        ci_request_timeout: 30,
        notification_url: "http://127.0.0.1:3000".to_string(),
        notification_token_file: "notification_token".to_string(),
        build_timeout: 30,
        fetch_build_logs: false,
        report_errors: false,
        sentry_dsn: None,
    }
}

pub fn create_mock_state(db: DatabaseConnection) -> Arc<ServerState> {
    let (results, _) = broadcast::channel(RESULT_EVENT_CAPACITY);

    Arc::new(ServerState {
        db,
        cli: create_mock_cli(),
        ci_token: None,
        notification_token: TOKEN.to_string(),
        results,
    })
}

pub fn create_server(db: DatabaseConnection) -> TestServer {
    let state = create_mock_state(db);
    let app_state = AppState {
        notification_token: Arc::new(state.notification_token.clone()),
        ingest: IngestService::new(
            Arc::new(DatabaseStore::new(Arc::clone(&state))),
            None,
            state.results.clone(),
        ),
    };

    TestServer::new(create_router(app_state)).unwrap()
}

pub fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

pub fn date() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

pub fn exercise() -> MExercise {
    MExercise {
        id: Uuid::new_v4(),
        title: "Sorting".to_string(),
        project_key: "EIST".to_string(),
        programming_language: ProgrammingLanguage::Java,
        due_date: None,
        allow_late_rated: false,
        static_analysis_enabled: false,
        sequential_test_runs: false,
        test_repository_url: "https://git.example.org/eist/eist-tests.git".to_string(),
        created_at: date(),
    }
}

pub fn participation(exercise: &MExercise) -> MParticipation {
    MParticipation {
        id: Uuid::new_v4(),
        exercise: exercise.id,
        kind: ParticipationKind::Student,
        build_plan_id: Some("EIST-STUDENT1".to_string()),
        repository_url: "https://git.example.org/eist/eist-student1.git".to_string(),
        created_at: date(),
    }
}

pub fn submission(participation: &MParticipation) -> MSubmission {
    MSubmission {
        id: Uuid::new_v4(),
        participation: participation.id,
        commit_hash: Some("abc123".to_string()),
        submission_date: date(),
        build_failed: false,
        fallback: false,
    }
}

pub fn result(submission: &MSubmission, build_number: i64) -> MResult {
    MResult {
        id: Uuid::new_v4(),
        submission: submission.id,
        participation: submission.participation,
        assessment_type: AssessmentType::Automatic,
        successful: true,
        rated: true,
        completion_date: date(),
        build_number: Some(build_number),
        test_case_count: 1,
        passed_test_case_count: 1,
        code_issue_count: 0,
    }
}

pub fn notification(full_name: &str) -> Value {
    json!({
        "fullName": full_name,
        "commits": [{"hash": "abc123", "repositorySlug": "eist-student1"}],
        "isBuildSuccessful": true,
        "buildTestSummary": "1 test",
        "results": [{"name": "SortTest", "testCases": [{"name": "testSort"}]}]
    })
}
