/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::NaiveDateTime;
use common::error::{CiError, CiResult};
use common::types::*;
use entity::result::AssessmentType;
use tracing::{debug, info};
use uuid::Uuid;

use crate::notification::NormalizedBuildResult;
use crate::store::ResultStore;

#[derive(Debug, Clone, PartialEq)]
pub enum Correlation {
    /// The build was already ingested.
    Duplicate(MResult),
    Target {
        submission: MSubmission,
        is_new: bool,
    },
}

/// Finds the submission a build result belongs to. Must run while the
/// participation's lock is held.
pub async fn correlate(
    store: &dyn ResultStore,
    participation: &MParticipation,
    build: &NormalizedBuildResult,
    now: NaiveDateTime,
) -> CiResult<Correlation> {
    let commit_hash = build.assignment_commit(&participation.repository_url);

    if let Some(existing) = find_duplicate(store, participation, build, commit_hash).await? {
        debug!(result = %existing.id, build_number = build.build_number, "Build already ingested");
        return Ok(Correlation::Duplicate(existing));
    }

    if let Some(commit_hash) = commit_hash {
        let submissions = store
            .find_submissions_by_commit(participation.id, commit_hash)
            .await?;

        if !submissions.is_empty() {
            let mut open = Vec::new();
            for submission in submissions {
                if store.find_result_for_submission(submission.id).await?.is_none() {
                    open.push(submission);
                }
            }

            return match open.len() {
                0 => {
                    info!(commit = commit_hash, "Rebuild of an assessed commit, adding submission");
                    Ok(Correlation::Target {
                        submission: synthesize_submission(participation.id, Some(commit_hash), build, now),
                        is_new: true,
                    })
                }
                1 => Ok(Correlation::Target {
                    submission: mark_build_failed(open.remove(0), build),
                    is_new: false,
                }),
                n => Err(CiError::CorrelationAmbiguity {
                    participation: participation.id,
                    reason: format!("{} submissions without result for commit {}", n, commit_hash),
                }),
            };
        }
    }

    if let Some(submission) = store
        .find_latest_submission_without_result(participation.id)
        .await?
    {
        return Ok(Correlation::Target {
            submission: mark_build_failed(submission, build),
            is_new: false,
        });
    }

    info!(participation = %participation.id, "No submission found for build, creating fallback");
    Ok(Correlation::Target {
        submission: synthesize_submission(participation.id, commit_hash, build, now),
        is_new: true,
    })
}

/// A stored result only stands for the same build if commit and run date
/// agree as well, since a recreated plan starts counting builds from one
/// again.
async fn find_duplicate(
    store: &dyn ResultStore,
    participation: &MParticipation,
    build: &NormalizedBuildResult,
    commit_hash: Option<&str>,
) -> CiResult<Option<MResult>> {
    let candidates = store
        .find_results_by_build_number(participation.id, build.build_number)
        .await?;

    for existing in candidates {
        if build
            .run_date
            .is_some_and(|run_date| run_date != existing.completion_date)
        {
            continue;
        }

        let Some(commit_hash) = commit_hash else {
            return Ok(Some(existing));
        };

        let stored_commit = store
            .find_submission(existing.submission)
            .await?
            .and_then(|submission| submission.commit_hash);

        if stored_commit.as_deref() == Some(commit_hash) {
            return Ok(Some(existing));
        }
    }

    Ok(None)
}

fn synthesize_submission(
    participation: Uuid,
    commit_hash: Option<&str>,
    build: &NormalizedBuildResult,
    now: NaiveDateTime,
) -> MSubmission {
    MSubmission {
        id: Uuid::new_v4(),
        participation,
        commit_hash: commit_hash.map(str::to_string),
        submission_date: now,
        build_failed: build.no_tests_found,
        fallback: true,
    }
}

fn mark_build_failed(mut submission: MSubmission, build: &NormalizedBuildResult) -> MSubmission {
    if build.no_tests_found {
        submission.build_failed = true;
    }

    submission
}

/// Late submissions only count if the exercise allows it.
pub fn is_rated(exercise: &MExercise, submission: &MSubmission) -> bool {
    match exercise.due_date {
        None => true,
        Some(due_date) => submission.submission_date <= due_date || exercise.allow_late_rated,
    }
}

pub fn new_result(
    exercise: &MExercise,
    submission: &MSubmission,
    build: &NormalizedBuildResult,
    now: NaiveDateTime,
) -> MResult {
    MResult {
        id: Uuid::new_v4(),
        submission: submission.id,
        participation: submission.participation,
        assessment_type: AssessmentType::Automatic,
        successful: build.successful,
        rated: is_rated(exercise, submission),
        completion_date: build.run_date.unwrap_or(now),
        build_number: Some(build.build_number),
        test_case_count: build.test_outcomes.len() as i32,
        passed_test_case_count: build.passed_test_count() as i32,
        code_issue_count: build.code_issue_count() as i32,
    }
}
