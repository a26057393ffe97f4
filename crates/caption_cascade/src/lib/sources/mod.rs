pub mod invidious;
pub mod mirrors;
pub mod piped;
pub mod primary;
pub mod transcript_service;

use std::future::Future;

use crate::{
    error::{Absence, SourceError},
    video::{LanguagePair, VideoReference},
};

/// One stage of the transcript cascade.
///
/// Implementations return normalized text or a `SourceError`; they never decide
/// whether the cascade continues, that is the orchestrator's job.
pub trait CaptionSource {
    const NAME: &'static str;

    fn fetch_transcript(
        &self,
        video: &VideoReference,
        languages: &LanguagePair,
    ) -> impl Future<Output = Result<String, SourceError>> + Send;
}

/// How a single stage's outcome steers the cascade
#[derive(Debug)]
pub enum SourceAttempt {
    Success(String),
    Continue(SourceError),
    Abort(Absence),
}

impl From<Result<String, SourceError>> for SourceAttempt {
    fn from(result: Result<String, SourceError>) -> Self {
        match result {
            Ok(text) if text.trim().is_empty() => SourceAttempt::Continue(SourceError::Empty),
            Ok(text) => SourceAttempt::Success(text),
            Err(SourceError::MissingVideoId(input)) => SourceAttempt::Abort(Absence::NotFound(input)),
            Err(e) => SourceAttempt::Continue(e),
        }
    }
}

pub(crate) fn require_video_id(video: &VideoReference) -> Result<&str, SourceError> {
    video
        .video_id()
        .ok_or_else(|| SourceError::MissingVideoId(video.url().to_string()))
}

/// Picks the first item in the target language, else the first in the fallback language.
pub(crate) fn select_by_language<'a, T>(
    items: &'a [T],
    languages: &LanguagePair,
    code: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    languages
        .in_order()
        .into_iter()
        .find_map(|lang| items.iter().find(|item| code(*item) == lang))
}
