/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Build plan rendering.
//!
//! A plan is rendered in two steps: the language pipeline gets its tokens
//! substituted, then the escaped pipeline is embedded into the base job
//! configuration. Substitution is literal, tokens are never evaluated.

use common::consts::{ASSIGNMENT_CHECKOUT_PATH, NOTIFICATION_PATH, TESTS_CHECKOUT_PATH};
use common::error::{CiError, CiResult};
use common::types::Cli;
use connector::RepositoryKind;
use entity::exercise::ProgrammingLanguage;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

use crate::static_analysis::generate_script;

pub const TOKEN_TEST_REPOSITORY: &str = "#testRepository";
pub const TOKEN_ASSIGNMENT_REPOSITORY: &str = "#assignmentRepository";
pub const TOKEN_GIT_CREDENTIALS: &str = "#gitCredentials";
pub const TOKEN_TESTS_CHECKOUT_PATH: &str = "#testsCheckoutPath";
pub const TOKEN_ASSIGNMENT_CHECKOUT_PATH: &str = "#assignmentCheckoutPath";
pub const TOKEN_NOTIFICATIONS_URL: &str = "#notificationsUrl";
pub const TOKEN_NOTIFICATIONS_TOKEN: &str = "#notificationsToken";
pub const TOKEN_DOCKER_IMAGE: &str = "#dockerImage";
pub const TOKEN_BUILD_TIMEOUT: &str = "#buildTimeout";
pub const TOKEN_STATIC_CODE_ANALYSIS_SCRIPT: &str = "#staticCodeAnalysisScript";
pub const TOKEN_PIPELINE_SCRIPT: &str = "#pipelineScript";

const ALL_TOKENS: [&str; 11] = [
    TOKEN_TEST_REPOSITORY,
    TOKEN_ASSIGNMENT_REPOSITORY,
    TOKEN_GIT_CREDENTIALS,
    TOKEN_TESTS_CHECKOUT_PATH,
    TOKEN_ASSIGNMENT_CHECKOUT_PATH,
    TOKEN_NOTIFICATIONS_URL,
    TOKEN_NOTIFICATIONS_TOKEN,
    TOKEN_DOCKER_IMAGE,
    TOKEN_BUILD_TIMEOUT,
    TOKEN_STATIC_CODE_ANALYSIS_SCRIPT,
    TOKEN_PIPELINE_SCRIPT,
];

const BASE_CONFIGURATION: &str = include_str!("../templates/jenkins/config.xml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateKey {
    pub language: ProgrammingLanguage,
    pub static_analysis: bool,
    pub sequential_runs: bool,
}

impl TemplateKey {
    pub fn new(language: ProgrammingLanguage, static_analysis: bool, sequential_runs: bool) -> Self {
        Self {
            language,
            static_analysis,
            sequential_runs,
        }
    }
}

static TEMPLATES: LazyLock<HashMap<TemplateKey, &'static str>> = LazyLock::new(|| {
    use ProgrammingLanguage::*;

    HashMap::from([
        (
            TemplateKey::new(Java, false, false),
            include_str!("../templates/jenkins/java/regularRuns/Jenkinsfile"),
        ),
        (
            TemplateKey::new(Java, true, false),
            include_str!("../templates/jenkins/java/regularRuns/Jenkinsfile-staticCodeAnalysis"),
        ),
        (
            TemplateKey::new(Java, false, true),
            include_str!("../templates/jenkins/java/sequentialRuns/Jenkinsfile"),
        ),
        (
            TemplateKey::new(Java, true, true),
            include_str!("../templates/jenkins/java/sequentialRuns/Jenkinsfile-staticCodeAnalysis"),
        ),
        (
            TemplateKey::new(Kotlin, false, false),
            include_str!("../templates/jenkins/kotlin/Jenkinsfile"),
        ),
        (
            TemplateKey::new(Python, false, false),
            include_str!("../templates/jenkins/python/Jenkinsfile"),
        ),
        (
            TemplateKey::new(C, false, false),
            include_str!("../templates/jenkins/c/Jenkinsfile"),
        ),
        (
            TemplateKey::new(Haskell, false, false),
            include_str!("../templates/jenkins/haskell/Jenkinsfile"),
        ),
        (
            TemplateKey::new(Swift, false, false),
            include_str!("../templates/jenkins/swift/Jenkinsfile"),
        ),
        (
            TemplateKey::new(Swift, true, false),
            include_str!("../templates/jenkins/swift/Jenkinsfile-staticCodeAnalysis"),
        ),
    ])
});

pub fn pipeline_template(key: TemplateKey) -> CiResult<&'static str> {
    TEMPLATES
        .get(&key)
        .copied()
        .ok_or(CiError::TemplateNotFound {
            language: key.language,
            static_analysis: key.static_analysis,
            sequential_runs: key.sequential_runs,
        })
}

pub fn docker_image(language: ProgrammingLanguage) -> Option<&'static str> {
    match language {
        ProgrammingLanguage::Java | ProgrammingLanguage::Kotlin => {
            Some("maven:3.9-eclipse-temurin-17")
        }
        ProgrammingLanguage::Python => Some("python:3.12-slim"),
        ProgrammingLanguage::C => Some("gcc:13"),
        ProgrammingLanguage::Haskell => Some("haskell:9.6"),
        ProgrammingLanguage::Swift => Some("swift:5.10"),
        _ => None,
    }
}

/// A repository checked out by a build plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    pub url: String,
    pub credentials_key: String,
    pub checkout_path: String,
    pub kind: RepositoryKind,
}

impl RepositoryReference {
    pub fn test(url: impl Into<String>, credentials_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credentials_key: credentials_key.into(),
            checkout_path: TESTS_CHECKOUT_PATH.to_string(),
            kind: RepositoryKind::Test,
        }
    }

    pub fn assignment(url: impl Into<String>, credentials_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credentials_key: credentials_key.into(),
            checkout_path: ASSIGNMENT_CHECKOUT_PATH.to_string(),
            kind: RepositoryKind::Assignment,
        }
    }

    /// The solution takes the place of the assignment in the solution plan.
    pub fn solution(url: impl Into<String>, credentials_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credentials_key: credentials_key.into(),
            checkout_path: ASSIGNMENT_CHECKOUT_PATH.to_string(),
            kind: RepositoryKind::Solution,
        }
    }
}

/// Values for every token of a pipeline template. Construction fails if a
/// token the template needs has no value.
#[derive(Debug, Clone)]
pub struct PipelineTokens {
    test_repository: RepositoryReference,
    assignment_repository: RepositoryReference,
    notifications_url: String,
    notifications_token: String,
    docker_image: String,
    build_timeout: u32,
    static_code_analysis_script: Option<String>,
}

impl PipelineTokens {
    pub fn new(
        config: &RendererConfig,
        key: TemplateKey,
        test_repository: &RepositoryReference,
        assignment_repository: &RepositoryReference,
    ) -> CiResult<Self> {
        let docker_image = docker_image(key.language)
            .ok_or_else(|| CiError::UnresolvedToken(TOKEN_DOCKER_IMAGE.to_string()))?;

        let static_code_analysis_script = if key.static_analysis {
            Some(generate_script(key.language)?)
        } else {
            None
        };

        let tokens = Self {
            test_repository: test_repository.clone(),
            assignment_repository: assignment_repository.clone(),
            notifications_url: config.notifications_url.clone(),
            notifications_token: config.notifications_token.clone(),
            docker_image: docker_image.to_string(),
            build_timeout: config.build_timeout,
            static_code_analysis_script,
        };

        tokens.validate(key)?;
        Ok(tokens)
    }

    fn validate(&self, key: TemplateKey) -> CiResult<()> {
        let required = [
            (TOKEN_TEST_REPOSITORY, self.test_repository.url.as_str()),
            (TOKEN_ASSIGNMENT_REPOSITORY, self.assignment_repository.url.as_str()),
            (TOKEN_GIT_CREDENTIALS, self.assignment_repository.credentials_key.as_str()),
            (TOKEN_TESTS_CHECKOUT_PATH, self.test_repository.checkout_path.as_str()),
            (TOKEN_ASSIGNMENT_CHECKOUT_PATH, self.assignment_repository.checkout_path.as_str()),
            (TOKEN_NOTIFICATIONS_URL, self.notifications_url.as_str()),
            (TOKEN_NOTIFICATIONS_TOKEN, self.notifications_token.as_str()),
        ];

        if let Some((token, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(CiError::UnresolvedToken(token.to_string()));
        }

        if self.build_timeout == 0 {
            return Err(CiError::UnresolvedToken(TOKEN_BUILD_TIMEOUT.to_string()));
        }

        if key.static_analysis && self.static_code_analysis_script.is_none() {
            return Err(CiError::UnresolvedToken(
                TOKEN_STATIC_CODE_ANALYSIS_SCRIPT.to_string(),
            ));
        }

        Ok(())
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            (TOKEN_TEST_REPOSITORY, self.test_repository.url.clone()),
            (TOKEN_ASSIGNMENT_REPOSITORY, self.assignment_repository.url.clone()),
            (
                TOKEN_GIT_CREDENTIALS,
                self.assignment_repository.credentials_key.clone(),
            ),
            (
                TOKEN_TESTS_CHECKOUT_PATH,
                self.test_repository.checkout_path.clone(),
            ),
            (
                TOKEN_ASSIGNMENT_CHECKOUT_PATH,
                self.assignment_repository.checkout_path.clone(),
            ),
            (TOKEN_NOTIFICATIONS_URL, self.notifications_url.clone()),
            (TOKEN_NOTIFICATIONS_TOKEN, self.notifications_token.clone()),
            (TOKEN_DOCKER_IMAGE, self.docker_image.clone()),
            (TOKEN_BUILD_TIMEOUT, self.build_timeout.to_string()),
        ];

        if let Some(script) = &self.static_code_analysis_script {
            pairs.push((TOKEN_STATIC_CODE_ANALYSIS_SCRIPT, script.clone()));
        }

        pairs
    }

    pub fn apply(&self, template: &str) -> String {
        self.pairs()
            .into_iter()
            .fold(template.to_string(), |text, (token, value)| {
                text.replace(token, &value)
            })
    }
}

/// Escapes pipeline text for the `<script>` element of a job configuration.
/// The order matters, later replacements must not touch earlier output.
pub fn escape_for_xml(script: &str) -> String {
    script
        .replace('\'', "&apos;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\\', "\\\\")
}

/// Tokens still present in a rendered document.
pub fn unresolved_tokens(text: &str) -> Vec<&'static str> {
    ALL_TOKENS
        .iter()
        .copied()
        .filter(|token| text.contains(token))
        .collect()
}

#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Full url the CI posts results to.
    pub notifications_url: String,
    pub notifications_token: String,
    pub build_timeout: u32,
    /// Jenkins credentials id used for every repository checkout.
    pub credentials_key: String,
}

impl RendererConfig {
    pub fn from_cli(cli: &Cli, notifications_token: impl Into<String>) -> Self {
        Self {
            notifications_url: format!(
                "{}{}",
                cli.notification_url.trim_end_matches('/'),
                NOTIFICATION_PATH
            ),
            notifications_token: notifications_token.into(),
            build_timeout: cli.build_timeout,
            credentials_key: cli.ci_credentials_key.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    config: RendererConfig,
}

impl TemplateRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn render(
        &self,
        language: ProgrammingLanguage,
        test_repository: &RepositoryReference,
        assignment_repository: &RepositoryReference,
        static_analysis_enabled: bool,
    ) -> CiResult<String> {
        self.render_plan(
            TemplateKey::new(language, static_analysis_enabled, false),
            test_repository,
            assignment_repository,
        )
    }

    pub fn render_plan(
        &self,
        key: TemplateKey,
        test_repository: &RepositoryReference,
        assignment_repository: &RepositoryReference,
    ) -> CiResult<String> {
        let template = pipeline_template(key)?;
        let tokens = PipelineTokens::new(&self.config, key, test_repository, assignment_repository)?;

        let pipeline = tokens.apply(template);
        let document = BASE_CONFIGURATION.replace(TOKEN_PIPELINE_SCRIPT, &escape_for_xml(&pipeline));

        debug!(
            language = %key.language,
            static_analysis = key.static_analysis,
            sequential_runs = key.sequential_runs,
            "Rendered build plan"
        );

        Ok(document)
    }
}
