/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{NaiveDateTime, NaiveTime};
use common::consts::{MAX_BUILD_LOG_ENTRIES, MAX_LOG_LINE_LENGTH};
use common::input::truncate_chars;
use common::types::MBuildLogEntry;
use entity::exercise::ProgrammingLanguage;
use scraper::{ElementRef, Html, Node};
use uuid::Uuid;

pub const PIPELINE_START_MARKER: &str = "[Pipeline] Start of Pipeline";
const PIPELINE_STEP_PREFIX: &str = "[Pipeline]";
const ECHOED_COMMAND_PREFIX: char = '+';

/// Info, error and the two reset sequences Jenkins emits. Other escape
/// sequences stay in the text.
const ANSI_CODES: [&str; 4] = ["\u{1b}[1;34m", "\u{1b}[1;31m", "\u{1b}[0m", "\u{1b}[m"];

const MAVEN_NOISE: &[&str] = &[
    "[INFO] Downloading",
    "[INFO] Downloaded",
    "Downloading from",
    "Downloaded from",
    "Progress (",
    "[INFO] Scanning for projects",
    "[INFO] ------",
    "[INFO] Total time",
    "[INFO] Finished at",
    "[WARNING] Using platform encoding",
    "[ERROR] -> [Help 1]",
    "[ERROR] Re-run Maven",
    "[ERROR] To see the full stack trace",
    "[ERROR] For more information",
    "NOTE: Maven is executing in offline mode",
];

const GRADLE_NOISE: &[&str] = &[
    "Starting a Gradle Daemon",
    "Download https://",
    "> Task ",
    "BUILD SUCCESSFUL in",
    "Deprecated Gradle features were used",
];

const PIP_NOISE: &[&str] = &[
    "Collecting ",
    "Downloading ",
    "Requirement already satisfied",
    "Installing collected packages",
    "Successfully installed",
];

const SWIFT_NOISE: &[&str] = &["Fetching https://", "Cloning https://", "Resolving https://"];

const HASKELL_NOISE: &[&str] = &["Downloading ", "Selected mirror", "Updating package index"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub time: NaiveDateTime,
    pub text: String,
}

pub fn strip_ansi(line: &str) -> String {
    ANSI_CODES
        .iter()
        .fold(line.to_string(), |text, code| text.replace(code, ""))
}

pub fn is_pipeline_log(lines: &[String]) -> bool {
    lines.iter().any(|line| line.contains(PIPELINE_START_MARKER))
}

/// Turns the log lines a build reported into entries, reading pipeline
/// output directly and everything else as the legacy HTML console.
pub fn extract(lines: &[String], fallback_time: NaiveDateTime) -> Vec<LogLine> {
    if is_pipeline_log(lines) {
        parse_pipeline_log(lines, fallback_time)
    } else {
        parse_html_console(&lines.join("<br>"), fallback_time)
    }
}

pub fn parse_pipeline_log(lines: &[String], fallback_time: NaiveDateTime) -> Vec<LogLine> {
    lines
        .iter()
        .flat_map(|line| line.lines())
        .filter(|line| !line.trim_start().starts_with(PIPELINE_STEP_PREFIX))
        .map(|line| match split_rfc3339_prefix(line) {
            Some((time, text)) => LogLine {
                time,
                text: text.to_string(),
            },
            None => LogLine {
                time: fallback_time,
                text: line.to_string(),
            },
        })
        .collect()
}

/// Legacy console: lines separated by `<br>`, each optionally led by a
/// `<b>` element carrying the timestamp.
pub fn parse_html_console(html: &str, fallback_time: NaiveDateTime) -> Vec<LogLine> {
    html.split("<br>")
        .flat_map(|chunk| chunk.split("<br/>"))
        .flat_map(|chunk| chunk.split("<br />"))
        .flat_map(|chunk| chunk.lines())
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| parse_html_line(chunk, fallback_time))
        .collect()
}

fn parse_html_line(chunk: &str, fallback_time: NaiveDateTime) -> LogLine {
    let fragment = Html::parse_fragment(chunk);
    let root = fragment.root_element();

    let timestamp = root
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "b")
        .map(|element| element.text().collect::<String>());

    let text: String = root
        .descendants()
        .filter(|node| !node.ancestors().filter_map(ElementRef::wrap).any(|a| a.value().name() == "b"))
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        })
        .collect();

    LogLine {
        time: timestamp
            .as_deref()
            .and_then(|stamp| parse_timestamp(stamp.trim(), fallback_time))
            .unwrap_or(fallback_time),
        text: text.trim_start().to_string(),
    }
}

fn parse_timestamp(stamp: &str, fallback_time: NaiveDateTime) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveTime::parse_from_str(stamp, "%H:%M:%S")
                .ok()
                .map(|time| fallback_time.date().and_time(time))
        })
}

fn split_rfc3339_prefix(line: &str) -> Option<(NaiveDateTime, &str)> {
    let (stamp, rest) = line.split_once(' ')?;
    let stamp = stamp.trim_start_matches('[').trim_end_matches(']');
    chrono::DateTime::parse_from_rfc3339(stamp)
        .ok()
        .map(|time| (time.naive_utc(), rest))
}

fn noise_for(language: ProgrammingLanguage) -> &'static [&'static [&'static str]] {
    match language {
        ProgrammingLanguage::Java | ProgrammingLanguage::Kotlin => &[MAVEN_NOISE, GRADLE_NOISE],
        ProgrammingLanguage::Python => &[PIP_NOISE],
        ProgrammingLanguage::Swift => &[SWIFT_NOISE],
        ProgrammingLanguage::Haskell => &[HASKELL_NOISE],
        _ => &[],
    }
}

pub fn is_noise(line: &str, language: ProgrammingLanguage) -> bool {
    noise_for(language)
        .iter()
        .flat_map(|list| list.iter())
        .any(|prefix| line.starts_with(prefix))
}

/// Cleans extracted lines for storage: colour codes removed, echoed shell
/// commands and language specific chatter dropped, repeats collapsed. The
/// newest entries are kept when the log is too long.
pub fn filter(entries: Vec<LogLine>, language: ProgrammingLanguage) -> Vec<LogLine> {
    let mut filtered: Vec<LogLine> = Vec::with_capacity(entries.len());

    for entry in entries {
        let text = strip_ansi(&entry.text);
        let text = text.trim_end();

        if text.trim().is_empty()
            || text.starts_with(ECHOED_COMMAND_PREFIX)
            || text.trim_start().starts_with(PIPELINE_STEP_PREFIX)
            || is_noise(text.trim_start(), language)
        {
            continue;
        }

        let text = truncate_chars(text, MAX_LOG_LINE_LENGTH);
        if filtered.last().is_some_and(|last| last.text == text) {
            continue;
        }

        filtered.push(LogLine {
            time: entry.time,
            text,
        });
    }

    if filtered.len() > MAX_BUILD_LOG_ENTRIES {
        filtered.drain(..filtered.len() - MAX_BUILD_LOG_ENTRIES);
    }

    filtered
}

pub fn into_models(entries: Vec<LogLine>, submission: Uuid) -> Vec<MBuildLogEntry> {
    entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| MBuildLogEntry {
            id: Uuid::new_v4(),
            submission,
            position: position as i32,
            time: entry.time,
            log: entry.text,
        })
        .collect()
}
