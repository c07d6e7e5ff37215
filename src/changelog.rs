//! Markdown rendering of release entries.
//!
//! An entry looks like:
//!
//! ```text
//! ## 1.3.0
//!
//! `2024-05-01`
//!
//! - Add export button ([#42](https://github.com/acme/app/pull/42))
//!     - first body line
//!     - second body line
//! ```
//!
//! Everything here is pure string manipulation.

use std::fmt::Write;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::domain::{ChangeRequest, Version};

const CRLF: &str = "\r\n";

fn bullet_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        // A list marker (-, *, +, •, "12." or "a.") followed by whitespace.
        Regex::new(r"(?s)^\s*(?:[-*+•]|\d+\.|[a-zA-Z]\.)\s+(.*)$")
            .expect("bullet marker pattern is valid")
    })
}

/// Reformat a pull request body as a nested markdown list.
///
/// The body is split on CRLF, each line loses any leading list marker and is
/// re-emitted as `    - text`. Lines are joined with CRLF again. A body without
/// internal line breaks gets one trailing CRLF. An empty body yields an empty
/// string.
pub fn format_body(body: &str) -> String {
    if body.is_empty() {
        return String::new();
    }

    let lines: Vec<&str> = body.split(CRLF).collect();
    let formatted: Vec<String> = lines
        .iter()
        .map(|line| format!("    - {}", strip_marker(line)))
        .collect();

    let mut out = formatted.join(CRLF);
    if lines.len() == 1 {
        out.push_str(CRLF);
    }
    out
}

fn strip_marker(line: &str) -> &str {
    bullet_marker()
        .captures(line)
        .and_then(|c| c.get(1))
        .map_or(line, |m| m.as_str())
}

/// Render the changelog entry for one release.
///
/// Requests are emitted in the order given; callers sort them beforehand.
pub fn render(version: &Version, date: NaiveDate, requests: &[ChangeRequest]) -> String {
    let mut out = String::new();
    let _ = write!(out, "## {}\n\n`{}`\n\n", version, date.format("%Y-%m-%d"));

    for request in requests {
        let _ = writeln!(
            out,
            "- {} ([#{}]({}))",
            request.title, request.number, request.url
        );

        let Some(body) = request.body.as_deref() else {
            continue;
        };
        let formatted = format_body(body);
        out.push_str(&formatted);
        // Multi-line bodies have no terminator of their own.
        if !formatted.is_empty() && !formatted.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}

/// Prepend a freshly rendered entry to previously released content
pub fn prepend_entry(entry: &str, previous: &str) -> String {
    if previous.is_empty() {
        entry.to_string()
    } else {
        format!("{}\n{}", entry, previous)
    }
}

/// True when `changelog` already has a `## {version}` heading line
pub fn contains_version_heading(changelog: &str, version: &Version) -> bool {
    let wanted = version.to_string();
    changelog.lines().any(|line| {
        line.strip_prefix("## ")
            .and_then(|rest| rest.split_whitespace().next())
            .is_some_and(|heading| heading == wanted)
    })
}
