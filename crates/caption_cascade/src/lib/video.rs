use std::fmt;

use crate::{
    error::Absence,
    parser::{extract_video_id, is_bare_video_id},
};

/// A video as given by the user, either a full URL or a bare identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference {
    url: String,
    video_id: Option<String>,
}

impl VideoReference {
    pub const WATCH_URL: &'static str = "https://www.youtube.com/watch";

    pub fn parse(input: &str) -> Result<Self, Absence> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Absence::InvalidInput);
        }

        // anything that is not a bare identifier is kept as given, so stages that
        // need an identifier can report it as not found
        let url = if is_bare_video_id(input) {
            format!("{}?v={}", Self::WATCH_URL, input)
        } else {
            input.to_string()
        };
        let video_id = extract_video_id(&url).map(str::to_string);

        Ok(Self { url, video_id })
    }

    /// The URL handed to tools that accept any YouTube URL
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }
}

impl fmt::Display for VideoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub target: String,
    pub fallback: String,
}

impl LanguagePair {
    pub fn new(target: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            fallback: fallback.into(),
        }
    }

    /// Target first, then fallback
    pub fn in_order(&self) -> [&str; 2] {
        [&self.target, &self.fallback]
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self::new("tr", "en")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    /// Authored by the uploader
    Manual,
    /// Produced by speech recognition
    Automatic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub language: String,
    pub kind: TrackKind,
    pub format: String,
    pub url: String,
}

/// Which cascade stage produced a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PrimaryExtractor,
    TranscriptService,
    InvidiousMirrors,
    PipedMirrors,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::PrimaryExtractor => "yt-dlp",
            Stage::TranscriptService => "transcript-service",
            Stage::InvidiousMirrors => "invidious",
            Stage::PipedMirrors => "piped",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    pub source: Stage,
}

pub type TranscriptResult = Result<Transcript, Absence>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_id_is_canonicalised() {
        let video = VideoReference::parse("dQw4w9WgXcQ").unwrap();
        assert_eq!(video.url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(video.video_id(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_full_url_is_kept_verbatim() {
        let video = VideoReference::parse(" https://youtu.be/abc123?foo=1 ").unwrap();
        assert_eq!(video.url(), "https://youtu.be/abc123?foo=1");
        assert_eq!(video.video_id(), Some("abc123"));
    }

    #[test]
    fn test_url_without_identifier() {
        let video = VideoReference::parse("https://www.youtube.com/@TuncSatiroglu").unwrap();
        assert_eq!(video.video_id(), None);
    }

    #[test]
    fn test_foreign_url_and_free_text_have_no_identifier() {
        let video = VideoReference::parse("https://vimeo.com/123456").unwrap();
        assert_eq!(video.url(), "https://vimeo.com/123456");
        assert_eq!(video.video_id(), None);

        let video = VideoReference::parse("not a video at all").unwrap();
        assert_eq!(video.url(), "not a video at all");
        assert_eq!(video.video_id(), None);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert_eq!(VideoReference::parse("   "), Err(Absence::InvalidInput));
    }
}
