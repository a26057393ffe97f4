//! # Yt Parser
//!
//! Video identifier extraction for the URL shapes YouTube hands out, and
//! helpers to pull the InnerTube API key out of a watch page.

use std::{ops::Deref, sync::LazyLock};

use regex::Regex;

use crate::error::Error;

static BARE_VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());

static INNERTUBE_API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).unwrap()
});

/// Extracts the bare video identifier from a YouTube URL.
///
/// Recognised shapes, checked in this order:
/// * `https://youtu.be/<id>`
/// * `https://www.youtube.com/shorts/<id>`
/// * `https://www.youtube.com/live/<id>`
/// * any URL carrying a `v=<id>` query parameter
///
/// Returns `None` when no shape matches or the identifier would be empty.
pub fn extract_video_id(url: &str) -> Option<&str> {
    let url = url.trim();

    let id = if let Some((_, rest)) = url.split_once("youtu.be/") {
        first_path_segment(rest)
    } else if let Some((_, rest)) = url.split_once("youtube.com/shorts/") {
        first_path_segment(rest)
    } else if let Some((_, rest)) = url.split_once("youtube.com/live/") {
        first_path_segment(rest)
    } else {
        query_param_v(url)
    };

    id.filter(|id| !id.is_empty())
}

fn first_path_segment(rest: &str) -> Option<&str> {
    rest.split(['?', '&', '#', '/']).next()
}

fn query_param_v(url: &str) -> Option<&str> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("v="))
        .and_then(|v| v.split('#').next())
}

/// Whether `input` can only be a bare video identifier, such as `dQw4w9WgXcQ`
pub fn is_bare_video_id(input: &str) -> bool {
    BARE_VIDEO_ID_RE.is_match(input)
}

/// Raw HTML of a YouTube watch page
pub struct YtHtmlDocument(String);

impl Deref for YtHtmlDocument {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl YtHtmlDocument {
    pub fn new(doc: String) -> Self {
        YtHtmlDocument(doc)
    }

    /// YouTube serves a recaptcha challenge instead of the player when it
    /// suspects automated traffic from the requesting IP.
    pub fn is_captcha(&self) -> bool {
        self.contains("g-recaptcha")
    }

    pub fn innertube_api_key(&self) -> Result<&str, Error> {
        INNERTUBE_API_KEY_RE
            .captures(self)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str())
            .ok_or(Error::ParseError(
                "Failed to extract INNERTUBE_API_KEY from the watch page",
            ))
    }
}

impl From<String> for YtHtmlDocument {
    fn from(value: String) -> Self {
        YtHtmlDocument(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_link_strips_query() {
        assert_eq!(extract_video_id("https://youtu.be/abc123?foo=1"), Some("abc123"));
    }

    #[test]
    fn test_standard_watch_url_stops_at_next_param() {
        assert_eq!(
            extract_video_id("https://youtube.com/watch?v=xyz&t=10"),
            Some("xyz")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_shorts_and_live_shapes() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/Sh0rtId?si=x"),
            Some("Sh0rtId")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/live/L1veId?feature=share"),
            Some("L1veId")
        );
        assert_eq!(extract_video_id("  https://youtube.com/live/L1veId  "), Some("L1veId"));
    }

    #[test]
    fn test_unrecognised_shapes() {
        assert_eq!(extract_video_id("https://www.youtube.com/@cihatecicek"), None);
        assert_eq!(extract_video_id("https://youtu.be/"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?dev=1"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_innertube_key_extraction() {
        let html = r#"<script>ytcfg.set({"INNERTUBE_API_KEY": "AIzaSyA-key_1", "X": 1});</script>"#;
        let doc = YtHtmlDocument::from(html.to_string());
        assert_eq!(doc.innertube_api_key().unwrap(), "AIzaSyA-key_1");
        assert!(!doc.is_captcha());
    }

    #[test]
    fn test_innertube_key_missing() {
        let doc = YtHtmlDocument::new("<html><body>nothing</body></html>".to_string());
        assert!(matches!(doc.innertube_api_key(), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_captcha_detection() {
        let doc = YtHtmlDocument::new(r#"<div class="g-recaptcha" data-sitekey="x"></div>"#.into());
        assert!(doc.is_captcha());

        let doc = YtHtmlDocument::new(r#"<textarea id="g-recaptcha-response"></textarea>"#.into());
        assert!(doc.is_captcha());

        let doc = YtHtmlDocument::new(include_str!("../../tests/fixtures/watch.html").into());
        assert!(!doc.is_captcha());
    }

    #[test]
    fn test_bare_video_id() {
        assert!(is_bare_video_id("dQw4w9WgXcQ"));
        assert!(is_bare_video_id("a-b_C9"));
        assert!(!is_bare_video_id("not a video at all"));
        assert!(!is_bare_video_id("https://vimeo.com/123456"));
        assert!(!is_bare_video_id(&"x".repeat(65)));
    }
}
