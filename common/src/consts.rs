/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::ops::RangeInclusive;

pub const PORT_RANGE: RangeInclusive<usize> = 1..=65535;

/// Path the CI server posts build results to, relative to the server url.
pub const NOTIFICATION_PATH: &str = "/api/public/programming-exercises/new-result";

/// Summary the CI reports when the test stage ran without any test case.
pub const NO_TESTS_FOUND: &str = "No tests found";

/// Line ending understood by Jenkins inside XML text content.
pub const CI_LINE_ENDING: &str = "&#13;";

pub const STATIC_CODE_ANALYSIS_REPORT_DIR: &str = "staticCodeAnalysisReports";
pub const SCA_FEEDBACK_IDENTIFIER: &str = "SCAFeedbackIdentifier:";

pub const ASSIGNMENT_CHECKOUT_PATH: &str = "assignment";
pub const TESTS_CHECKOUT_PATH: &str = "tests";

/// A script node counts as a pipeline only if it starts with one of these.
pub const PIPELINE_SCRIPT_MARKERS: [&str; 2] = ["pipeline", "#!/usr/bin/env groovy"];

/// Whitespace separated parts of a build's full name:
/// `<folder> » <plan> #<build-number>`.
pub const FULL_NAME_TOKEN_COUNT: usize = 4;

pub const FEEDBACK_DETAIL_TEXT_MAX_LENGTH: usize = 5000;
pub const MAX_LOG_LINE_LENGTH: usize = 255;
pub const MAX_BUILD_LOG_ENTRIES: usize = 2000;
pub const PAYLOAD_EXCERPT_LENGTH: usize = 2000;
