/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#![allow(dead_code)]

use async_trait::async_trait;
use builder::renderer::{RendererConfig, TemplateRenderer};
use chrono::NaiveDate;
use connector::{ContinuousIntegrationService, PlanKey, PlanSource, PlanStatus, RepositoryKind};
use entity::exercise::ProgrammingLanguage;
use entity::participation::ParticipationKind;
use entity::{exercise, participation};
use mockall::mock;
use uuid::Uuid;

pub use ::common::error::{CiError, CiResult};

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

pub const CREDENTIALS: &str = "conduit-git";
pub const TEMPLATE_REPOSITORY: &str = "https://git.example.org/eist/eist-exercise.git";
pub const SOLUTION_REPOSITORY: &str = "https://git.example.org/eist/eist-solution.git";
pub const TEST_REPOSITORY: &str = "https://git.example.org/eist/eist-tests.git";

pub fn create_renderer() -> TemplateRenderer {
    TemplateRenderer::new(RendererConfig {
        notifications_url: "https://conduit.example.org/api/public/programming-exercises/new-result"
            .to_string(),
        notifications_token: "notification-secret".to_string(),
        build_timeout: 30,
        credentials_key: CREDENTIALS.to_string(),
    })
}

pub fn create_exercise(language: ProgrammingLanguage, static_analysis: bool) -> exercise::Model {
    exercise::Model {
        id: Uuid::new_v4(),
        title: "Sorting".to_string(),
        project_key: "EIST".to_string(),
        programming_language: language,
        due_date: None,
        allow_late_rated: false,
        static_analysis_enabled: static_analysis,
        sequential_test_runs: false,
        test_repository_url: TEST_REPOSITORY.to_string(),
        created_at: NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
    }
}

pub fn create_participation(
    exercise: &exercise::Model,
    build_plan_id: Option<&str>,
    repository_url: &str,
) -> participation::Model {
    participation::Model {
        id: Uuid::new_v4(),
        exercise: exercise.id,
        kind: ParticipationKind::Student,
        build_plan_id: build_plan_id.map(str::to_string),
        repository_url: repository_url.to_string(),
        created_at: exercise.created_at,
    }
}
