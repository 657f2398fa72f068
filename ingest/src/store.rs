/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use async_trait::async_trait;
use common::error::{CiError, CiResult};
use common::types::*;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Everything written for one ingested build. Stored in a single
/// transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub submission: MSubmission,
    /// The submission does not exist yet and is inserted with the result.
    pub submission_is_new: bool,
    pub result: MResult,
    pub feedback: Vec<MFeedback>,
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// The participation owning `plan_key`, provided its exercise lives in
    /// the `project_key` folder.
    async fn find_participation_by_plan(
        &self,
        project_key: &str,
        plan_key: &str,
    ) -> CiResult<Option<(MParticipation, MExercise)>>;

    /// Build numbers restart when a plan is recreated, so there may be
    /// several.
    async fn find_results_by_build_number(
        &self,
        participation: Uuid,
        build_number: i64,
    ) -> CiResult<Vec<MResult>>;

    async fn find_submission(&self, submission: Uuid) -> CiResult<Option<MSubmission>>;

    /// Oldest first.
    async fn find_submissions_by_commit(
        &self,
        participation: Uuid,
        commit_hash: &str,
    ) -> CiResult<Vec<MSubmission>>;

    async fn find_latest_submission_without_result(
        &self,
        participation: Uuid,
    ) -> CiResult<Option<MSubmission>>;

    async fn find_result_for_submission(&self, submission: Uuid) -> CiResult<Option<MResult>>;

    async fn save_result(&self, record: ResultRecord) -> CiResult<MResult>;

    /// Replaces every stored log entry of the submission.
    async fn replace_build_logs(
        &self,
        submission: Uuid,
        entries: Vec<MBuildLogEntry>,
    ) -> CiResult<()>;
}

#[derive(Debug, Clone)]
pub struct DatabaseStore {
    state: Arc<ServerState>,
}

impl DatabaseStore {
    pub fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }
}

fn submission_active_model(submission: &MSubmission) -> ASubmission {
    ASubmission {
        id: Set(submission.id),
        participation: Set(submission.participation),
        commit_hash: Set(submission.commit_hash.clone()),
        submission_date: Set(submission.submission_date),
        build_failed: Set(submission.build_failed),
        fallback: Set(submission.fallback),
    }
}

fn result_active_model(result: &MResult) -> AResult {
    AResult {
        id: Set(result.id),
        submission: Set(result.submission),
        participation: Set(result.participation),
        assessment_type: Set(result.assessment_type),
        successful: Set(result.successful),
        rated: Set(result.rated),
        completion_date: Set(result.completion_date),
        build_number: Set(result.build_number),
        test_case_count: Set(result.test_case_count),
        passed_test_case_count: Set(result.passed_test_case_count),
        code_issue_count: Set(result.code_issue_count),
    }
}

fn feedback_active_model(feedback: MFeedback) -> AFeedback {
    AFeedback {
        id: Set(feedback.id),
        result: Set(feedback.result),
        position: Set(feedback.position),
        test_name: Set(feedback.test_name),
        positive: Set(feedback.positive),
        detail_text: Set(feedback.detail_text),
        kind: Set(feedback.kind),
    }
}

fn build_log_active_model(entry: MBuildLogEntry) -> ABuildLogEntry {
    ABuildLogEntry {
        id: Set(entry.id),
        submission: Set(entry.submission),
        position: Set(entry.position),
        time: Set(entry.time),
        log: Set(entry.log),
    }
}

#[async_trait]
impl ResultStore for DatabaseStore {
    async fn find_participation_by_plan(
        &self,
        project_key: &str,
        plan_key: &str,
    ) -> CiResult<Option<(MParticipation, MExercise)>> {
        let participation = EParticipation::find()
            .filter(CParticipation::BuildPlanId.eq(plan_key))
            .one(&self.state.db)
            .await?;

        let Some(participation) = participation else {
            return Ok(None);
        };

        let exercise = EExercise::find_by_id(participation.exercise)
            .one(&self.state.db)
            .await?
            .ok_or_else(|| {
                CiError::InvalidConfiguration(format!(
                    "participation {} references missing exercise {}",
                    participation.id, participation.exercise
                ))
            })?;

        if exercise.project_key != project_key {
            debug!(
                plan = plan_key,
                expected = %exercise.project_key,
                received = project_key,
                "Plan belongs to another project"
            );
            return Ok(None);
        }

        Ok(Some((participation, exercise)))
    }

    async fn find_results_by_build_number(
        &self,
        participation: Uuid,
        build_number: i64,
    ) -> CiResult<Vec<MResult>> {
        Ok(EResult::find()
            .filter(CResult::Participation.eq(participation))
            .filter(CResult::BuildNumber.eq(build_number))
            .order_by_desc(CResult::CompletionDate)
            .all(&self.state.db)
            .await?)
    }

    async fn find_submission(&self, submission: Uuid) -> CiResult<Option<MSubmission>> {
        Ok(ESubmission::find_by_id(submission)
            .one(&self.state.db)
            .await?)
    }

    async fn find_submissions_by_commit(
        &self,
        participation: Uuid,
        commit_hash: &str,
    ) -> CiResult<Vec<MSubmission>> {
        Ok(ESubmission::find()
            .filter(CSubmission::Participation.eq(participation))
            .filter(CSubmission::CommitHash.eq(commit_hash))
            .order_by_asc(CSubmission::SubmissionDate)
            .all(&self.state.db)
            .await?)
    }

    async fn find_latest_submission_without_result(
        &self,
        participation: Uuid,
    ) -> CiResult<Option<MSubmission>> {
        Ok(ESubmission::find()
            .left_join(entity::result::Entity)
            .filter(CSubmission::Participation.eq(participation))
            .filter(CResult::Id.is_null())
            .order_by_desc(CSubmission::SubmissionDate)
            .one(&self.state.db)
            .await?)
    }

    async fn find_result_for_submission(&self, submission: Uuid) -> CiResult<Option<MResult>> {
        Ok(EResult::find()
            .filter(CResult::Submission.eq(submission))
            .one(&self.state.db)
            .await?)
    }

    async fn save_result(&self, record: ResultRecord) -> CiResult<MResult> {
        let txn = self.state.db.begin().await?;

        if record.submission_is_new {
            submission_active_model(&record.submission)
                .insert(&txn)
                .await?;
        } else if record.submission.build_failed {
            ESubmission::update_many()
                .col_expr(CSubmission::BuildFailed, Expr::value(true))
                .filter(CSubmission::Id.eq(record.submission.id))
                .exec(&txn)
                .await?;
        }

        let result = result_active_model(&record.result).insert(&txn).await?;

        if !record.feedback.is_empty() {
            EFeedback::insert_many(record.feedback.into_iter().map(feedback_active_model))
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(result)
    }

    async fn replace_build_logs(
        &self,
        submission: Uuid,
        entries: Vec<MBuildLogEntry>,
    ) -> CiResult<()> {
        let txn = self.state.db.begin().await?;

        EBuildLogEntry::delete_many()
            .filter(CBuildLogEntry::Submission.eq(submission))
            .exec(&txn)
            .await?;

        if !entries.is_empty() {
            EBuildLogEntry::insert_many(entries.into_iter().map(build_log_active_model))
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }
}
