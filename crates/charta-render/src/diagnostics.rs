//! Mapping from raw renderer diagnostics to presentable text.

use std::sync::LazyLock;

use regex::Regex;

/// Extracts a line number from mermaid-style parser diagnostics.
static PARSE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:parse|syntax|lexical) error on line (\d+)")
        .expect("PARSE_LINE_RE: hardcoded regex is valid")
});

/// A render failure prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedFailure {
    /// Short human-readable summary. Never empty.
    pub summary: String,
    /// Optional raw detail worth keeping visible (e.g. the parser's hint).
    pub detail: Option<String>,
}

/// Map a raw renderer diagnostic to a presentable failure.
///
/// Pattern-matches known diagnostic substrings; anything unrecognized falls
/// back to a generic summary with no detail.
#[must_use]
pub fn format_failure(raw: &str) -> FormattedFailure {
    let trimmed = raw.trim();

    if let Some(captures) = PARSE_LINE_RE.captures(trimmed) {
        let line = &captures[1];
        return FormattedFailure {
            summary: format!("Diagram has a syntax error on line {line}"),
            detail: Some(trimmed.to_owned()),
        };
    }

    let lowered = trimmed.to_lowercase();
    if lowered.contains("parse error")
        || lowered.contains("syntax error")
        || lowered.contains("lexical error")
    {
        return FormattedFailure {
            summary: "Diagram has a syntax error".to_owned(),
            detail: Some(trimmed.to_owned()),
        };
    }
    if lowered.contains("unknowndiagramerror") || lowered.contains("no diagram type detected") {
        return FormattedFailure {
            summary: "Diagram type was not recognized".to_owned(),
            detail: Some(trimmed.to_owned()),
        };
    }
    if lowered.contains("timed out") || lowered.contains("timeout") {
        return FormattedFailure {
            summary: "Diagram rendering timed out".to_owned(),
            detail: None,
        };
    }
    if lowered.contains("connection") || lowered.contains("dns") || lowered.contains("io:") {
        return FormattedFailure {
            summary: "Could not reach the diagram renderer".to_owned(),
            detail: None,
        };
    }

    FormattedFailure {
        summary: "Diagram rendering failed".to_owned(),
        detail: None,
    }
}
