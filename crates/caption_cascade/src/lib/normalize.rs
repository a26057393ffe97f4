//! Text clean-up shared by every caption source.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

use crate::types::Json3Document;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Removes markup tags, decodes HTML entities, collapses whitespace and trims.
///
/// Passes are repeated until the text stops changing, so entity-encoded markup
/// such as `&lt;b&gt;` is fully removed and the function is idempotent.
pub fn normalize_text(raw: &str) -> String {
    let mut current = normalize_once(raw);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(text: &str) -> String {
    let untagged = TAG_RE.replace_all(text, " ");
    let decoded = html_escape::decode_html_entities(&untagged);
    WHITESPACE_RE.replace_all(&decoded, " ").trim().to_string()
}

/// Drops the line-oriented scaffolding of WebVTT and SRT bodies: the header,
/// timing lines, cue sequence numbers and blank lines.
pub fn strip_cue_lines(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .filter(|line| !is_cue_scaffolding(line))
        .join(" ")
}

fn is_cue_scaffolding(line: &str) -> bool {
    line.is_empty()
        || line.contains("-->")
        || line.chars().all(|c| c.is_ascii_digit())
        || line.starts_with("WEBVTT")
        || line.starts_with("Kind:")
        || line.starts_with("Language:")
}

/// Concatenates the text fragments of a `json3` caption document.
pub fn flatten_json3(doc: &Json3Document) -> String {
    doc.events
        .iter()
        .filter_map(|event| event.segs.as_ref())
        .flatten()
        .filter_map(|seg| seg.utf8.as_deref())
        .join(" ")
}
