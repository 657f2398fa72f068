/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Typed view on a Jenkins job `config.xml`.
//!
//! The document is kept as the raw text received from Jenkins. Parsing only
//! records where the interesting nodes live, so an update rewrites exactly
//! one span and leaves every other byte as it was.

use common::consts::PIPELINE_SCRIPT_MARKERS;
use common::error::{CiError, CiResult};
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

const SCRIPT_TAG: &[u8] = b"script";
const REMOTE_CONFIG_TAG: &[u8] = b"hudson.plugins.git.UserRemoteConfig";
const URL_TAG: &[u8] = b"url";
const NAME_TAG: &[u8] = b"name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepositoryKind {
    Assignment,
    Test,
    Solution,
}

impl RepositoryKind {
    /// Name a legacy plan gives the remote of this kind.
    pub fn remote_name(&self) -> &'static str {
        match self {
            RepositoryKind::Assignment | RepositoryKind::Solution => "assignment",
            RepositoryKind::Test => "tests",
        }
    }

    fn matches_url(&self, url: &str) -> bool {
        match self {
            RepositoryKind::Assignment | RepositoryKind::Solution => {
                url.ends_with("-exercise.git") || url.ends_with("-solution.git")
            }
            RepositoryKind::Test => url.ends_with("-tests.git"),
        }
    }
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RepositoryKind::Assignment => "ASSIGNMENT",
            RepositoryKind::Test => "TEST",
            RepositoryKind::Solution => "SOLUTION",
        };

        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Byte range of the script element's content in the raw document.
    pub script: Range<usize>,
    pub script_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteNode {
    pub name: Option<String>,
    pub url: String,
    span: UrlSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlSpan {
    Content(Range<usize>),
    /// `<url/>`: the range covers the whole tag.
    SelfClosing(Range<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyConfig {
    pub remotes: [RemoteNode; 2],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationShape {
    Pipeline(PipelineConfig),
    Legacy(LegacyConfig),
}

#[derive(Debug, Default)]
struct ScanResult {
    scripts: Vec<PipelineConfig>,
    remotes: Vec<RemoteNode>,
}

#[derive(Debug, Default)]
struct OpenRemote {
    name: Option<String>,
    url: Option<(String, UrlSpan)>,
}

fn invalid(e: impl fmt::Display) -> CiError {
    CiError::InvalidConfiguration(e.to_string())
}

fn scan(raw: &str) -> CiResult<ScanResult> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(false);

    let mut result = ScanResult::default();
    let mut stack: Vec<Vec<u8>> = Vec::new();

    let mut script: Option<(usize, String)> = None;
    let mut remote: Option<OpenRemote> = None;
    let mut url: Option<(usize, String)> = None;
    let mut name: Option<String> = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(invalid)?;
        let after = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                let tag = e.name().as_ref().to_vec();
                let parent_is_remote = stack.last().map(|t| t.as_slice()) == Some(REMOTE_CONFIG_TAG);

                if tag == SCRIPT_TAG {
                    script = Some((after, String::new()));
                } else if tag == REMOTE_CONFIG_TAG {
                    remote = Some(OpenRemote::default());
                } else if parent_is_remote && tag == URL_TAG {
                    url = Some((after, String::new()));
                } else if parent_is_remote && tag == NAME_TAG {
                    name = Some(String::new());
                }

                stack.push(tag);
            }
            Event::Empty(e) => {
                let tag = e.name();
                let parent_is_remote = stack.last().map(|t| t.as_slice()) == Some(REMOTE_CONFIG_TAG);

                if tag.as_ref() == SCRIPT_TAG {
                    result.scripts.push(PipelineConfig {
                        script: after..after,
                        script_text: String::new(),
                    });
                } else if parent_is_remote && tag.as_ref() == URL_TAG {
                    if let Some(open) = remote.as_mut() {
                        open.url = Some((String::new(), UrlSpan::SelfClosing(before..after)));
                    }
                }
            }
            Event::Text(_) if script.is_some() || url.is_some() || name.is_some() => {
                let text = unescape(&raw[before..after]).map_err(invalid)?;

                if let Some((_, buf)) = script.as_mut() {
                    buf.push_str(&text);
                }
                if let Some((_, buf)) = url.as_mut() {
                    buf.push_str(&text);
                }
                if let Some(buf) = name.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::CData(c) => {
                let text = std::str::from_utf8(&c).map_err(invalid)?;

                if let Some((_, buf)) = script.as_mut() {
                    buf.push_str(text);
                }
                if let Some((_, buf)) = url.as_mut() {
                    buf.push_str(text);
                }
            }
            Event::End(e) => {
                let tag = e.name();

                if tag.as_ref() == SCRIPT_TAG {
                    if let Some((start, text)) = script.take() {
                        result.scripts.push(PipelineConfig {
                            script: start..before,
                            script_text: text,
                        });
                    }
                } else if tag.as_ref() == URL_TAG {
                    if let (Some((start, text)), Some(open)) = (url.take(), remote.as_mut()) {
                        open.url = Some((text, UrlSpan::Content(start..before)));
                    }
                } else if tag.as_ref() == NAME_TAG {
                    if let (Some(text), Some(open)) = (name.take(), remote.as_mut()) {
                        open.name = Some(text.trim().to_string());
                    }
                } else if tag.as_ref() == REMOTE_CONFIG_TAG {
                    if let Some(open) = remote.take() {
                        let (url, span) = open
                            .url
                            .unwrap_or_else(|| (String::new(), UrlSpan::SelfClosing(before..before)));

                        result.remotes.push(RemoteNode {
                            name: open.name.filter(|n| !n.is_empty()),
                            url: url.trim().to_string(),
                            span,
                        });
                    }
                }

                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(result)
}

fn is_pipeline(script: &str) -> bool {
    let script = script.trim_start();
    PIPELINE_SCRIPT_MARKERS
        .iter()
        .any(|marker| script.starts_with(marker))
}

/// Classifies a plan document. A pipeline plan has exactly one script node
/// holding a pipeline, a legacy plan exactly two git remotes.
pub fn detect_configuration_shape(raw: &str) -> CiResult<ConfigurationShape> {
    let ScanResult { mut scripts, remotes } = scan(raw)?;

    if scripts.len() == 1 && is_pipeline(&scripts[0].script_text) {
        return Ok(ConfigurationShape::Pipeline(scripts.remove(0)));
    }

    match <[RemoteNode; 2]>::try_from(remotes) {
        Ok(remotes) => Ok(ConfigurationShape::Legacy(LegacyConfig { remotes })),
        Err(remotes) => Err(CiError::RepositoryNodeNotFound(format!(
            "expected one pipeline script or two git remotes, found {} script(s) and {} remote(s)",
            scripts.len(),
            remotes.len()
        ))),
    }
}

#[derive(Debug, Clone)]
pub struct PlanDocument {
    raw: String,
    shape: ConfigurationShape,
}

impl PlanDocument {
    pub fn parse(raw: impl Into<String>) -> CiResult<Self> {
        let raw = raw.into();
        let shape = detect_configuration_shape(&raw)?;
        Ok(Self { raw, shape })
    }

    pub fn shape(&self) -> &ConfigurationShape {
        &self.shape
    }

    pub fn to_xml(&self) -> &str {
        &self.raw
    }

    pub fn into_xml(self) -> String {
        self.raw
    }

    pub fn update_repository(
        &mut self,
        kind: RepositoryKind,
        new_url: &str,
        previous_url: &str,
    ) -> CiResult<()> {
        let raw = match &self.shape {
            ConfigurationShape::Pipeline(pipeline) => {
                replace_in_script(&self.raw, pipeline, new_url, previous_url)?
            }
            ConfigurationShape::Legacy(legacy) => replace_remote(&self.raw, legacy, kind, new_url)?,
        };

        self.shape = detect_configuration_shape(&raw)?;
        self.raw = raw;
        Ok(())
    }
}

fn replace_in_script(
    raw: &str,
    pipeline: &PipelineConfig,
    new_url: &str,
    previous_url: &str,
) -> CiResult<String> {
    if previous_url.is_empty() {
        return Err(CiError::RepositoryNodeNotFound(
            "previous repository url is empty".to_string(),
        ));
    }

    let body = &raw[pipeline.script.clone()];
    let escaped_previous = escape(previous_url);

    let replaced = if body.contains(&*escaped_previous) {
        body.replace(&*escaped_previous, &escape(new_url))
    } else if body.contains(previous_url) {
        // CDATA sections carry the url unescaped
        body.replace(previous_url, new_url)
    } else {
        return Err(CiError::RepositoryNodeNotFound(format!(
            "pipeline script does not reference {}",
            previous_url
        )));
    };

    let mut out = String::with_capacity(raw.len() + replaced.len() - body.len());
    out.push_str(&raw[..pipeline.script.start]);
    out.push_str(&replaced);
    out.push_str(&raw[pipeline.script.end..]);
    Ok(out)
}

fn replace_remote(
    raw: &str,
    legacy: &LegacyConfig,
    kind: RepositoryKind,
    new_url: &str,
) -> CiResult<String> {
    let tagged: Vec<&RemoteNode> = legacy
        .remotes
        .iter()
        .filter(|r| r.name.as_deref() == Some(kind.remote_name()))
        .collect();

    let candidates = if tagged.is_empty() {
        legacy
            .remotes
            .iter()
            .filter(|r| kind.matches_url(&r.url))
            .collect::<Vec<_>>()
    } else {
        tagged
    };

    let target = match candidates.as_slice() {
        [one] => *one,
        [] => {
            return Err(CiError::RepositoryNodeNotFound(format!(
                "no git remote matches repository kind {}",
                kind
            )));
        }
        _ => {
            return Err(CiError::RepositoryNodeNotFound(format!(
                "both git remotes match repository kind {}",
                kind
            )));
        }
    };

    let (range, replacement) = match &target.span {
        UrlSpan::Content(range) => (range.clone(), escape(new_url).into_owned()),
        UrlSpan::SelfClosing(range) => (range.clone(), format!("<url>{}</url>", escape(new_url))),
    };

    let mut out = String::with_capacity(raw.len() + replacement.len());
    out.push_str(&raw[..range.start]);
    out.push_str(&replacement);
    out.push_str(&raw[range.end..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIPELINE: &str = r#"<?xml version='1.1' encoding='UTF-8'?>
<flow-definition plugin="workflow-job">
  <definition class="org.jenkinsci.plugins.workflow.cps.CpsFlowDefinition">
    <script>pipeline {
  stages {
    stage(&apos;Checkout&apos;) {
      steps {
        checkout([$class: &apos;GitSCM&apos;, userRemoteConfigs: [[url: &apos;https://git.example.org/eist/eist-tests.git&apos;]]])
        checkout([$class: &apos;GitSCM&apos;, userRemoteConfigs: [[url: &apos;https://git.example.org/eist/eist-student1.git&apos;]]])
      }
    }
  }
}</script>
    <sandbox>true</sandbox>
  </definition>
</flow-definition>"#;

    fn legacy(first_name: Option<&str>, second_name: Option<&str>) -> String {
        let name = |n: Option<&str>| n.map(|n| format!("<name>{}</name>", n)).unwrap_or_default();
        format!(
            r#"<project>
  <scm class="hudson.plugins.git.GitSCM">
    <userRemoteConfigs>
      <hudson.plugins.git.UserRemoteConfig>{}
        <url>https://git.example.org/eist/eist-tests.git</url>
        <credentialsId>conduit-git</credentialsId>
      </hudson.plugins.git.UserRemoteConfig>
      <hudson.plugins.git.UserRemoteConfig>{}
        <url>https://git.example.org/eist/eist-exercise.git</url>
      </hudson.plugins.git.UserRemoteConfig>
    </userRemoteConfigs>
  </scm>
</project>"#,
            name(first_name),
            name(second_name)
        )
    }

    #[test]
    fn test_detect_pipeline() {
        match detect_configuration_shape(PIPELINE).unwrap() {
            ConfigurationShape::Pipeline(p) => {
                assert!(p.script_text.starts_with("pipeline {"));
                assert!(p.script_text.contains("'Checkout'"));
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_detect_legacy() {
        match detect_configuration_shape(&legacy(None, None)).unwrap() {
            ConfigurationShape::Legacy(l) => {
                assert_eq!(l.remotes[0].url, "https://git.example.org/eist/eist-tests.git");
                assert_eq!(l.remotes[1].url, "https://git.example.org/eist/eist-exercise.git");
                assert_eq!(l.remotes[0].name, None);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_script_that_is_not_a_pipeline_falls_back_to_legacy() {
        let raw = legacy(None, None).replace(
            "<scm ",
            "<builders><script>echo hello</script></builders><scm ",
        );

        assert!(matches!(
            detect_configuration_shape(&raw).unwrap(),
            ConfigurationShape::Legacy(_)
        ));
    }

    #[test]
    fn test_unknown_shape_is_rejected() {
        let err = detect_configuration_shape("<project><builders/></project>").unwrap_err();
        assert!(matches!(err, CiError::RepositoryNodeNotFound(_)));
    }

    #[test]
    fn test_groovy_shebang_counts_as_pipeline() {
        let raw = "<flow><script>#!/usr/bin/env groovy\nnode {}</script></flow>";
        assert!(matches!(
            detect_configuration_shape(raw).unwrap(),
            ConfigurationShape::Pipeline(_)
        ));
    }

    #[test]
    fn test_pipeline_update_touches_only_the_url() {
        let mut document = PlanDocument::parse(PIPELINE).unwrap();
        document
            .update_repository(
                RepositoryKind::Assignment,
                "https://git.example.org/eist/eist-student2.git",
                "https://git.example.org/eist/eist-student1.git",
            )
            .unwrap();

        let expected = PIPELINE.replace("eist-student1.git", "eist-student2.git");
        assert_eq!(document.to_xml(), expected);
    }

    #[test]
    fn test_pipeline_update_without_previous_url_fails() {
        let mut document = PlanDocument::parse(PIPELINE).unwrap();
        let err = document
            .update_repository(
                RepositoryKind::Test,
                "https://git.example.org/eist/new-tests.git",
                "https://git.example.org/other/old-tests.git",
            )
            .unwrap_err();

        assert!(matches!(err, CiError::RepositoryNodeNotFound(_)));
        assert_eq!(document.to_xml(), PIPELINE);
    }

    #[test]
    fn test_legacy_update_by_suffix() {
        let raw = legacy(None, None);
        let mut document = PlanDocument::parse(raw.clone()).unwrap();
        document
            .update_repository(
                RepositoryKind::Test,
                "https://ci/foo-tests.git",
                "https://ci/old-tests.git",
            )
            .unwrap();

        assert_eq!(
            document.to_xml(),
            raw.replace("https://git.example.org/eist/eist-tests.git", "https://ci/foo-tests.git")
        );
    }

    #[test]
    fn test_legacy_update_prefers_name_tag() {
        // the tagged "assignment" remote carries a tests url, so the suffix
        // heuristic would pick the other node
        let raw = legacy(Some("assignment"), Some("tests"));
        let mut document = PlanDocument::parse(raw.clone()).unwrap();
        document
            .update_repository(
                RepositoryKind::Assignment,
                "https://ci/student3-exercise.git",
                "https://git.example.org/eist/eist-tests.git",
            )
            .unwrap();

        let expected = raw.replacen(
            "https://git.example.org/eist/eist-tests.git",
            "https://ci/student3-exercise.git",
            1,
        );
        assert_eq!(document.to_xml(), expected);
    }

    #[test]
    fn test_legacy_update_escapes_url() {
        let raw = legacy(None, None);
        let mut document = PlanDocument::parse(raw).unwrap();
        document
            .update_repository(RepositoryKind::Test, "https://ci/a&b-tests.git", "")
            .unwrap();

        assert!(document.to_xml().contains("<url>https://ci/a&amp;b-tests.git</url>"));
        match document.shape() {
            ConfigurationShape::Legacy(l) => assert_eq!(l.remotes[0].url, "https://ci/a&b-tests.git"),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_legacy_update_without_match_fails() {
        let raw = legacy(None, None).replace("eist-exercise.git", "eist-student.git");
        let mut document = PlanDocument::parse(raw).unwrap();
        let err = document
            .update_repository(RepositoryKind::Assignment, "https://ci/x-exercise.git", "")
            .unwrap_err();

        assert!(matches!(err, CiError::RepositoryNodeNotFound(_)));
    }
}
