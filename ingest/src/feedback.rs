/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use common::consts::{FEEDBACK_DETAIL_TEXT_MAX_LENGTH, SCA_FEEDBACK_IDENTIFIER};
use common::input::truncate_chars;
use common::types::MFeedback;
use entity::feedback::FeedbackType;
use uuid::Uuid;

use crate::notification::{NormalizedBuildResult, StaticCodeAnalysisReport, TestOutcome, TestStatus};

pub const UNKNOWN_REASON_MESSAGE: &str =
    "Unsuccessful for an unknown reason. Please contact your instructor for a more detailed feedback.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub test_name: String,
    pub positive: bool,
    pub detail_text: Option<String>,
}

/// Picks the detail text for a test case, first match wins.
pub fn select_message(outcome: &TestOutcome) -> Option<String> {
    if outcome.status == TestStatus::Passed {
        return outcome.success_message.clone();
    }

    outcome
        .error_message
        .clone()
        .or_else(|| outcome.failure_message.clone())
        .or_else(|| {
            outcome
                .error_type
                .as_ref()
                .map(|kind| format!("Unsuccessful due to an error of type: {}", kind))
        })
        .or_else(|| {
            outcome
                .failure_type
                .as_ref()
                .map(|kind| format!("Unsuccessful due to a failure of type: {}", kind))
        })
        .or_else(|| Some(UNKNOWN_REASON_MESSAGE.to_string()))
}

pub fn test_case_feedback(outcome: &TestOutcome) -> FeedbackDraft {
    FeedbackDraft {
        test_name: outcome.name.clone(),
        positive: outcome.status == TestStatus::Passed,
        detail_text: select_message(outcome),
    }
}

pub fn static_analysis_feedback(report: &StaticCodeAnalysisReport) -> Vec<FeedbackDraft> {
    report
        .issues
        .iter()
        .map(|issue| FeedbackDraft {
            test_name: format!("{}{}", SCA_FEEDBACK_IDENTIFIER, report.tool),
            positive: false,
            detail_text: serde_json::to_string(issue).ok(),
        })
        .collect()
}

/// Test feedback in reported order, followed by static analysis findings
/// when the exercise has them enabled.
pub fn synthesize(build: &NormalizedBuildResult, static_analysis_enabled: bool) -> Vec<FeedbackDraft> {
    let mut feedback: Vec<FeedbackDraft> = build.test_outcomes.iter().map(test_case_feedback).collect();

    if static_analysis_enabled {
        feedback.extend(
            build
                .static_analysis_reports
                .iter()
                .flat_map(static_analysis_feedback),
        );
    }

    feedback
}

pub fn into_models(drafts: Vec<FeedbackDraft>, result: Uuid) -> Vec<MFeedback> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(position, draft)| MFeedback {
            id: Uuid::new_v4(),
            result,
            position: position as i32,
            test_name: draft.test_name,
            positive: draft.positive,
            detail_text: draft
                .detail_text
                .map(|text| truncate_chars(&text, FEEDBACK_DETAIL_TEXT_MAX_LENGTH)),
            kind: FeedbackType::Automatic,
        })
        .collect()
}
