/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{NaiveDateTime, Utc};
use common::error::{CiError, CiResult};
use common::types::*;
use connector::{ContinuousIntegrationService, JenkinsService, PlanKey};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

use crate::build_logs;
use crate::correlator::{self, Correlation};
use crate::feedback;
use crate::locks::ParticipationLocks;
use crate::notification::NormalizedBuildResult;
use crate::store::{DatabaseStore, ResultRecord, ResultStore};

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Ingested(MResult),
    /// Redelivery of a build that already has a result.
    Duplicate(MResult),
}

impl IngestOutcome {
    pub fn result(&self) -> &MResult {
        match self {
            IngestOutcome::Ingested(result) | IngestOutcome::Duplicate(result) => result,
        }
    }
}

enum Stored {
    Duplicate(MResult),
    Created {
        result: MResult,
        submission: MSubmission,
    },
}

#[derive(Clone)]
pub struct IngestService {
    store: Arc<dyn ResultStore>,
    ci: Option<Arc<dyn ContinuousIntegrationService>>,
    locks: ParticipationLocks,
    results: broadcast::Sender<ResultEvent>,
}

impl IngestService {
    pub fn new(
        store: Arc<dyn ResultStore>,
        ci: Option<Arc<dyn ContinuousIntegrationService>>,
        results: broadcast::Sender<ResultEvent>,
    ) -> Self {
        Self {
            store,
            ci,
            locks: ParticipationLocks::new(),
            results,
        }
    }

    /// Database backed service. Logs are only fetched from Jenkins when
    /// enabled in the configuration.
    pub fn from_state(state: &Arc<ServerState>) -> CiResult<Self> {
        let ci: Option<Arc<dyn ContinuousIntegrationService>> = if state.cli.fetch_build_logs {
            Some(Arc::new(JenkinsService::from_cli(
                &state.cli,
                state.ci_token.clone(),
            )?))
        } else {
            None
        };

        Ok(Self::new(
            Arc::new(DatabaseStore::new(Arc::clone(state))),
            ci,
            state.results.clone(),
        ))
    }

    pub fn locks(&self) -> &ParticipationLocks {
        &self.locks
    }

    #[instrument(skip_all)]
    pub async fn process_notification(&self, payload: &str) -> CiResult<IngestOutcome> {
        let build = match NormalizedBuildResult::from_payload(payload) {
            Ok(build) => build,
            Err(e) => {
                if let CiError::MalformedPayload { reason, payload } = &e {
                    warn!(reason = %reason, payload = %payload, "Rejected build notification");
                }
                return Err(e);
            }
        };

        self.process_build(build).await
    }

    #[instrument(skip_all, fields(plan = %build.plan_key, build_number = build.build_number))]
    pub async fn process_build(&self, build: NormalizedBuildResult) -> CiResult<IngestOutcome> {
        let (participation, exercise) = self
            .store
            .find_participation_by_plan(&build.project_key, &build.plan_key)
            .await?
            .ok_or_else(|| CiError::UnknownPlan(build.plan_key.clone()))?;

        let now = Utc::now().naive_utc();

        let stored = self
            .correlate_and_store(&exercise, &participation, &build, now)
            .await;
        self.locks.prune();

        let (result, submission) = match stored? {
            Stored::Duplicate(result) => {
                info!(result = %result.id, "Ignoring redelivered build");
                return Ok(IngestOutcome::Duplicate(result));
            }
            Stored::Created { result, submission } => (result, submission),
        };

        info!(
            result = %result.id,
            submission = %submission.id,
            successful = result.successful,
            rated = result.rated,
            "Stored build result"
        );

        if let Err(e) = self
            .store_build_logs(&exercise, &submission, &build, now)
            .await
        {
            error!(error = %e, submission = %submission.id, "Failed to store build logs");
        }

        let event = ResultEvent {
            result_id: result.id,
            participation_id: participation.id,
            submission_id: submission.id,
            successful: result.successful,
            completion_date: result.completion_date,
        };
        if self.results.send(event).is_err() {
            debug!("No listeners for result events");
        }

        Ok(IngestOutcome::Ingested(result))
    }

    async fn correlate_and_store(
        &self,
        exercise: &MExercise,
        participation: &MParticipation,
        build: &NormalizedBuildResult,
        now: NaiveDateTime,
    ) -> CiResult<Stored> {
        let _guard = self.locks.lock(participation.id).await;

        let (submission, is_new) =
            match correlator::correlate(self.store.as_ref(), participation, build, now).await? {
                Correlation::Duplicate(result) => return Ok(Stored::Duplicate(result)),
                Correlation::Target { submission, is_new } => (submission, is_new),
            };

        let result = correlator::new_result(exercise, &submission, build, now);
        let drafts = feedback::synthesize(build, exercise.static_analysis_enabled);
        let record = ResultRecord {
            feedback: feedback::into_models(drafts, result.id),
            submission: submission.clone(),
            submission_is_new: is_new,
            result,
        };

        let result = self.store.save_result(record).await?;
        Ok(Stored::Created { result, submission })
    }

    /// Runs after the participation lock is released since it may talk to
    /// the CI server. A failure here leaves the stored result intact.
    async fn store_build_logs(
        &self,
        exercise: &MExercise,
        submission: &MSubmission,
        build: &NormalizedBuildResult,
        now: NaiveDateTime,
    ) -> CiResult<()> {
        let fallback_time = build.run_date.unwrap_or(now);

        let entries = if !build.log_lines.is_empty() {
            build_logs::extract(&build.log_lines, fallback_time)
        } else if let Some(ci) = &self.ci {
            let plan = PlanKey::new(exercise.project_key.clone(), build.plan_key.clone());
            let console = ci.get_build_logs(&plan).await?;
            build_logs::parse_html_console(&console, fallback_time)
        } else {
            return Ok(());
        };

        let entries = build_logs::filter(entries, exercise.programming_language);
        debug!(entries = entries.len(), "Storing build logs");

        self.store
            .replace_build_logs(submission.id, build_logs::into_models(entries, submission.id))
            .await
    }
}
