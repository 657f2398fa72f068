/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use connector::{ContinuousIntegrationService, PlanKey, PlanSource, PlanStatus, RepositoryKind};
use entity::exercise::ProgrammingLanguage;
use entity::participation::ParticipationKind;
use ingest::{IngestService, ResultRecord, ResultStore};
use mockall::mock;
use sea_orm::DbErr;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

pub use ::common::error::{CiError, CiResult};
pub use ::common::types::*;

pub const PLAN: &str = "EIST-STUDENT1";
pub const REPOSITORY: &str = "https://git.example.org/eist/eist-student1.git";

mock! {
    pub Ci {}

    #[async_trait]
    impl ContinuousIntegrationService for Ci {
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
}

#[derive(Debug, Default)]
pub struct MemoryState {
    pub exercises: Vec<MExercise>,
    pub participations: Vec<MParticipation>,
    pub submissions: Vec<MSubmission>,
    pub results: Vec<MResult>,
    pub feedback: Vec<MFeedback>,
    pub build_logs: Vec<MBuildLogEntry>,
}

/// In-memory stand in for the database. Lookups sleep briefly so that
/// unsynchronized callers would interleave.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn with(exercise: MExercise, participation: MParticipation) -> Self {
        let store = MemoryStore::default();
        {
            let mut state = store.state.lock().unwrap();
            state.exercises.push(exercise);
            state.participations.push(participation);
        }
        store
    }

    pub fn add_submission(&self, submission: MSubmission) {
        self.state.lock().unwrap().submissions.push(submission);
    }

    pub fn results(&self) -> Vec<MResult> {
        self.state.lock().unwrap().results.clone()
    }

    pub fn submissions(&self) -> Vec<MSubmission> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn feedback(&self) -> Vec<MFeedback> {
        let mut feedback = self.state.lock().unwrap().feedback.clone();
        feedback.sort_by_key(|f| f.position);
        feedback
    }

    pub fn build_logs(&self) -> Vec<MBuildLogEntry> {
        self.state.lock().unwrap().build_logs.clone()
    }
}

async fn pause() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn find_participation_by_plan(
        &self,
        project_key: &str,
        plan_key: &str,
    ) -> CiResult<Option<(MParticipation, MExercise)>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .participations
            .iter()
            .find(|p| p.build_plan_id.as_deref() == Some(plan_key))
            .and_then(|p| {
                state
                    .exercises
                    .iter()
                    .find(|e| e.id == p.exercise && e.project_key == project_key)
                    .map(|e| (p.clone(), e.clone()))
            }))
    }

    async fn find_results_by_build_number(
        &self,
        participation: Uuid,
        build_number: i64,
    ) -> CiResult<Vec<MResult>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .results
            .iter()
            .filter(|r| r.participation == participation && r.build_number == Some(build_number))
            .cloned()
            .collect())
    }

    async fn find_submission(&self, submission: Uuid) -> CiResult<Option<MSubmission>> {
        let state = self.state.lock().unwrap();
        Ok(state.submissions.iter().find(|s| s.id == submission).cloned())
    }

    async fn find_submissions_by_commit(
        &self,
        participation: Uuid,
        commit_hash: &str,
    ) -> CiResult<Vec<MSubmission>> {
        pause().await;
        let state = self.state.lock().unwrap();
        let mut submissions: Vec<_> = state
            .submissions
            .iter()
            .filter(|s| s.participation == participation && s.commit_hash.as_deref() == Some(commit_hash))
            .cloned()
            .collect();
        submissions.sort_by_key(|s| s.submission_date);
        Ok(submissions)
    }

    async fn find_latest_submission_without_result(
        &self,
        participation: Uuid,
    ) -> CiResult<Option<MSubmission>> {
        pause().await;
        let state = self.state.lock().unwrap();
        Ok(state
            .submissions
            .iter()
            .filter(|s| s.participation == participation)
            .filter(|s| !state.results.iter().any(|r| r.submission == s.id))
            .max_by_key(|s| s.submission_date)
            .cloned())
    }

    async fn find_result_for_submission(&self, submission: Uuid) -> CiResult<Option<MResult>> {
        let state = self.state.lock().unwrap();
        Ok(state.results.iter().find(|r| r.submission == submission).cloned())
    }

    async fn save_result(&self, record: ResultRecord) -> CiResult<MResult> {
        pause().await;
        let mut state = self.state.lock().unwrap();

        if state.results.iter().any(|r| r.submission == record.submission.id) {
            return Err(CiError::Database(DbErr::Custom(
                "duplicate key value violates unique constraint \"result_submission_key\"".to_string(),
            )));
        }

        if record.submission_is_new {
            state.submissions.push(record.submission.clone());
        } else if let Some(submission) = state
            .submissions
            .iter_mut()
            .find(|s| s.id == record.submission.id)
        {
            submission.build_failed = record.submission.build_failed;
        }

        state.results.push(record.result.clone());
        state.feedback.extend(record.feedback);
        Ok(record.result)
    }

    async fn replace_build_logs(
        &self,
        submission: Uuid,
        entries: Vec<MBuildLogEntry>,
    ) -> CiResult<()> {
        let mut state = self.state.lock().unwrap();
        state.build_logs.retain(|e| e.submission != submission);
        state.build_logs.extend(entries);
        Ok(())
    }
}

pub fn at(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn create_exercise(due_date: Option<NaiveDateTime>, static_analysis: bool) -> MExercise {
    MExercise {
        id: Uuid::new_v4(),
        title: "Sorting".to_string(),
        project_key: "EIST".to_string(),
        programming_language: ProgrammingLanguage::Java,
        due_date,
        allow_late_rated: false,
        static_analysis_enabled: static_analysis,
        sequential_test_runs: false,
        test_repository_url: "https://git.example.org/eist/eist-tests.git".to_string(),
        created_at: at(0),
    }
}

pub fn create_participation(exercise: &MExercise) -> MParticipation {
    MParticipation {
        id: Uuid::new_v4(),
        exercise: exercise.id,
        kind: ParticipationKind::Student,
        build_plan_id: Some(PLAN.to_string()),
        repository_url: REPOSITORY.to_string(),
        created_at: at(0),
    }
}

pub fn create_submission(
    participation: &MParticipation,
    commit_hash: Option<&str>,
    date: NaiveDateTime,
) -> MSubmission {
    MSubmission {
        id: Uuid::new_v4(),
        participation: participation.id,
        commit_hash: commit_hash.map(str::to_string),
        submission_date: date,
        build_failed: false,
        fallback: false,
    }
}

/// Notification for `EIST-STUDENT1` with one passing and one failing test.
pub fn notification(build_number: i64, commit_hash: &str) -> Value {
    json!({
        "fullName": format!("EIST » {} #{}", PLAN, build_number),
        "commits": [
            {"hash": "tests-head", "repositorySlug": "eist-tests"},
            {"hash": commit_hash, "repositorySlug": "eist-student1"}
        ],
        "isBuildSuccessful": false,
        "buildTestSummary": "2 tests, 1 failure",
        "runDate": "2025-06-01T11:00:00Z",
        "results": [{
            "name": "SortTest",
            "testCases": [
                {"name": "testEmpty", "classname": "SortTest", "time": 0.01},
                {"name": "testSort", "classname": "SortTest", "time": 0.02,
                 "failures": [{"message": "expected [1, 2] but was [2, 1]", "type": "AssertionError"}]}
            ]
        }],
        "logs": []
    })
}

pub struct Harness {
    pub store: MemoryStore,
    pub service: IngestService,
    pub events: broadcast::Receiver<ResultEvent>,
    pub exercise: MExercise,
    pub participation: MParticipation,
}

pub fn harness(exercise: MExercise, ci: Option<MockCi>) -> Harness {
    let participation = create_participation(&exercise);
    let store = MemoryStore::with(exercise.clone(), participation.clone());
    let (sender, events) = broadcast::channel(16);
    let ci = ci.map(|ci| Arc::new(ci) as Arc<dyn ContinuousIntegrationService>);

    Harness {
        service: IngestService::new(Arc::new(store.clone()), ci, sender),
        store,
        events,
        exercise,
        participation,
    }
}
