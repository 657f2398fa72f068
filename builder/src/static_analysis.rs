/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use common::consts::{ASSIGNMENT_CHECKOUT_PATH, CI_LINE_ENDING, STATIC_CODE_ANALYSIS_REPORT_DIR};
use common::error::{CiError, CiResult};
use entity::exercise::ProgrammingLanguage;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaticCodeAnalysisTool {
    Spotbugs,
    Checkstyle,
    Pmd,
    PmdCpd,
    Swiftlint,
}

const JAVA_TOOLS: [StaticCodeAnalysisTool; 4] = [
    StaticCodeAnalysisTool::Spotbugs,
    StaticCodeAnalysisTool::Checkstyle,
    StaticCodeAnalysisTool::Pmd,
    StaticCodeAnalysisTool::PmdCpd,
];

const SWIFT_TOOLS: [StaticCodeAnalysisTool; 1] = [StaticCodeAnalysisTool::Swiftlint];

impl StaticCodeAnalysisTool {
    pub fn for_language(language: ProgrammingLanguage) -> &'static [StaticCodeAnalysisTool] {
        match language {
            ProgrammingLanguage::Java => &JAVA_TOOLS,
            ProgrammingLanguage::Swift => &SWIFT_TOOLS,
            _ => &[],
        }
    }

    /// Maven goal running the tool, for tools run through Maven.
    pub fn command(&self) -> Option<&'static str> {
        match self {
            StaticCodeAnalysisTool::Spotbugs => Some("spotbugs:spotbugs"),
            StaticCodeAnalysisTool::Checkstyle => Some("checkstyle:checkstyle"),
            StaticCodeAnalysisTool::Pmd => Some("pmd:pmd"),
            StaticCodeAnalysisTool::PmdCpd => Some("pmd:cpd"),
            StaticCodeAnalysisTool::Swiftlint => None,
        }
    }

    pub fn file_pattern(&self) -> &'static str {
        match self {
            StaticCodeAnalysisTool::Spotbugs => "spotbugsXml.xml",
            StaticCodeAnalysisTool::Checkstyle => "checkstyle-result.xml",
            StaticCodeAnalysisTool::Pmd => "pmd.xml",
            StaticCodeAnalysisTool::PmdCpd => "cpd.xml",
            StaticCodeAnalysisTool::Swiftlint => "swiftlint-result.xml",
        }
    }
}

impl fmt::Display for StaticCodeAnalysisTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StaticCodeAnalysisTool::Spotbugs => "SPOTBUGS",
            StaticCodeAnalysisTool::Checkstyle => "CHECKSTYLE",
            StaticCodeAnalysisTool::Pmd => "PMD",
            StaticCodeAnalysisTool::PmdCpd => "PMD_CPD",
            StaticCodeAnalysisTool::Swiftlint => "SWIFTLINT",
        };

        write!(f, "{}", s)
    }
}

/// Shell fragment running the analysis tools of `language` and collecting
/// their reports. Lines are joined with the CI line ending since the
/// fragment ends up inside the job XML.
pub fn generate_script(language: ProgrammingLanguage) -> CiResult<String> {
    let tools = StaticCodeAnalysisTool::for_language(language);
    let mut lines = vec![format!("mkdir {}", STATIC_CODE_ANALYSIS_REPORT_DIR)];

    match language {
        ProgrammingLanguage::Java => {
            let goals = tools
                .iter()
                .filter_map(|tool| tool.command())
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(format!("mvn {} -B", goals));

            for tool in tools {
                lines.push(format!(
                    "cp target/{} {} || true",
                    tool.file_pattern(),
                    STATIC_CODE_ANALYSIS_REPORT_DIR
                ));
            }
        }
        ProgrammingLanguage::Swift => {
            lines.push(format!("cp .swiftlint.yml {} || true", ASSIGNMENT_CHECKOUT_PATH));
            lines.push(format!(
                "swiftlint lint {} > {}/{}",
                ASSIGNMENT_CHECKOUT_PATH,
                STATIC_CODE_ANALYSIS_REPORT_DIR,
                StaticCodeAnalysisTool::Swiftlint.file_pattern()
            ));
        }
        _ => {
            return Err(CiError::InvalidConfiguration(format!(
                "no static code analysis tools for {}",
                language
            )));
        }
    }

    Ok(lines.join(CI_LINE_ENDING))
}
