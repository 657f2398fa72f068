/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{DateTime, NaiveDateTime, Utc};
use common::consts::{FULL_NAME_TOKEN_COUNT, NO_TESTS_FOUND};
use common::error::{CiError, CiResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body the pipeline posts to the result notification endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultsNotification {
    pub full_name: String,
    #[serde(default)]
    pub commits: Vec<CommitNotification>,
    #[serde(default)]
    pub results: Vec<TestSuite>,
    #[serde(default)]
    pub static_code_analysis_reports: Vec<StaticCodeAnalysisReport>,
    pub is_build_successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_test_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitNotification {
    pub hash: String,
    #[serde(default)]
    pub repository_slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(default)]
    pub errors: Vec<TestCaseDetail>,
    #[serde(default)]
    pub failures: Vec<TestCaseDetail>,
    #[serde(default)]
    pub success_infos: Vec<TestCaseDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_with_stack_trace: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl TestCaseDetail {
    /// Stack trace if the runner sent one, plain message otherwise.
    pub fn most_informative_message(&self) -> Option<&str> {
        non_empty(self.message_with_stack_trace.as_deref())
            .or_else(|| non_empty(self.message.as_deref()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticCodeAnalysisReport {
    pub tool: String,
    #[serde(default)]
    pub issues: Vec<StaticCodeAnalysisIssue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticCodeAnalysisIssue {
    #[serde(default)]
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    Passed,
    Failed,
    Error,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            TestStatus::Passed => "PASSED",
            TestStatus::Failed => "FAILED",
            TestStatus::Error => "ERROR",
        };

        write!(f, "{}", status)
    }
}

/// One test case reduced to what feedback needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub name: String,
    pub status: TestStatus,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub failure_message: Option<String>,
    pub error_type: Option<String>,
    pub failure_type: Option<String>,
}

impl From<&TestCase> for TestOutcome {
    fn from(test_case: &TestCase) -> Self {
        let status = if !test_case.errors.is_empty() {
            TestStatus::Error
        } else if !test_case.failures.is_empty() {
            TestStatus::Failed
        } else {
            TestStatus::Passed
        };

        TestOutcome {
            name: test_case.name.clone(),
            status,
            success_message: first_message(&test_case.success_infos),
            error_message: first_message(&test_case.errors),
            failure_message: first_message(&test_case.failures),
            error_type: first_type(&test_case.errors),
            failure_type: first_type(&test_case.failures),
        }
    }
}

/// Identity of a build as encoded in `fullName`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildIdentity {
    pub project_key: String,
    pub plan_key: String,
    pub build_number: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBuildResult {
    pub project_key: String,
    pub plan_key: String,
    pub build_number: i64,
    pub successful: bool,
    pub no_tests_found: bool,
    pub commits: Vec<CommitNotification>,
    pub test_outcomes: Vec<TestOutcome>,
    pub static_analysis_reports: Vec<StaticCodeAnalysisReport>,
    pub log_lines: Vec<String>,
    pub run_date: Option<NaiveDateTime>,
}

impl NormalizedBuildResult {
    /// Parses a raw webhook body and identifies the plan it belongs to.
    pub fn from_payload(payload: &str) -> CiResult<Self> {
        let notification = parse_notification(payload)?;
        Self::from_notification(notification)
    }

    pub fn from_notification(notification: TestResultsNotification) -> CiResult<Self> {
        let identity = match parse_full_name(&notification.full_name) {
            Ok(identity) => identity,
            Err(reason) => {
                let serialized = serde_json::to_string(&notification).unwrap_or_default();
                return Err(CiError::malformed_payload(reason, &serialized));
            }
        };

        let test_outcomes: Vec<TestOutcome> = notification
            .results
            .iter()
            .flat_map(|suite| suite.test_cases.iter())
            .map(TestOutcome::from)
            .collect();

        let no_tests_found = match notification.build_test_summary.as_deref() {
            Some(summary) => summary == NO_TESTS_FOUND,
            None => test_outcomes.is_empty(),
        };

        Ok(NormalizedBuildResult {
            project_key: identity.project_key,
            plan_key: identity.plan_key,
            build_number: identity.build_number,
            successful: notification.is_build_successful && !no_tests_found,
            no_tests_found,
            commits: notification.commits,
            test_outcomes,
            static_analysis_reports: notification.static_code_analysis_reports,
            log_lines: notification.logs,
            run_date: notification.run_date.map(|date| date.naive_utc()),
        })
    }

    /// Commit of the assignment repository, matched by slug against the
    /// participation's repository url. Test repository commits are skipped
    /// when nothing matches.
    pub fn assignment_commit(&self, repository_url: &str) -> Option<&str> {
        self.commits
            .iter()
            .find(|commit| {
                !commit.repository_slug.is_empty() && repository_url.contains(&commit.repository_slug)
            })
            .or_else(|| {
                self.commits
                    .iter()
                    .find(|commit| !commit.repository_slug.ends_with("-tests"))
            })
            .map(|commit| commit.hash.as_str())
            .filter(|hash| !hash.is_empty())
    }

    pub fn passed_test_count(&self) -> usize {
        self.test_outcomes
            .iter()
            .filter(|outcome| outcome.status == TestStatus::Passed)
            .count()
    }

    pub fn code_issue_count(&self) -> usize {
        self.static_analysis_reports
            .iter()
            .map(|report| report.issues.len())
            .sum()
    }
}

pub fn parse_notification(payload: &str) -> CiResult<TestResultsNotification> {
    serde_json::from_str(payload)
        .map_err(|e| CiError::malformed_payload(format!("invalid notification: {}", e), payload))
}

/// Splits `<folder> » <plan> #<build-number>` into its parts. Anything but
/// exactly four whitespace separated tokens is rejected.
pub fn parse_full_name(full_name: &str) -> Result<BuildIdentity, String> {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    if tokens.len() != FULL_NAME_TOKEN_COUNT {
        return Err(format!(
            "full name {:?} has {} parts, expected {}",
            full_name,
            tokens.len(),
            FULL_NAME_TOKEN_COUNT
        ));
    }

    let build_number = tokens[3]
        .strip_prefix('#')
        .and_then(|number| number.parse::<i64>().ok())
        .ok_or_else(|| format!("full name {:?} has no build number", full_name))?;

    Ok(BuildIdentity {
        project_key: tokens[0].to_string(),
        plan_key: tokens[2].to_string(),
        build_number,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn first_message(details: &[TestCaseDetail]) -> Option<String> {
    details
        .iter()
        .find_map(TestCaseDetail::most_informative_message)
        .map(str::to_string)
}

fn first_type(details: &[TestCaseDetail]) -> Option<String> {
    details
        .iter()
        .find_map(|detail| non_empty(detail.kind.as_deref()))
        .map(str::to_string)
}
