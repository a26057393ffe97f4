pub mod builder;

use futures::future::{BoxFuture, FutureExt};

use crate::{
    error::{Absence, SourceError},
    sources::{CaptionSource, SourceAttempt},
    video::{LanguagePair, Stage, Transcript, TranscriptResult, VideoReference},
};

// The transcript acquisition cascade: yt-dlp, the transcript service, then two mirror pools
pub struct TranscriptPipeline<P, T, A, B>
where
    P: CaptionSource + Send + Sync,
    T: CaptionSource + Send + Sync,
    A: CaptionSource + Send + Sync,
    B: CaptionSource + Send + Sync,
{
    pub(crate) languages: LanguagePair,
    pub(crate) primary: P,
    pub(crate) transcript_service: T,
    pub(crate) mirrors_a: A,
    pub(crate) mirrors_b: B,
}

impl<P, T, A, B> TranscriptPipeline<P, T, A, B>
where
    P: CaptionSource + Send + Sync,
    T: CaptionSource + Send + Sync,
    A: CaptionSource + Send + Sync,
    B: CaptionSource + Send + Sync,
{
    /// Tries every stage in order and returns the first non-empty transcript.
    #[tracing::instrument(skip(self, video), fields(video = %video))]
    pub async fn fetch(&self, video: &VideoReference) -> TranscriptResult {
        let languages = &self.languages;

        // futures are lazy: a stage does no work until the previous one has failed
        let stages: [(Stage, &str, BoxFuture<'_, Result<String, SourceError>>); 4] = [
            (
                Stage::PrimaryExtractor,
                P::NAME,
                self.primary.fetch_transcript(video, languages).boxed(),
            ),
            (
                Stage::TranscriptService,
                T::NAME,
                self.transcript_service.fetch_transcript(video, languages).boxed(),
            ),
            (
                Stage::InvidiousMirrors,
                A::NAME,
                self.mirrors_a.fetch_transcript(video, languages).boxed(),
            ),
            (
                Stage::PipedMirrors,
                B::NAME,
                self.mirrors_b.fetch_transcript(video, languages).boxed(),
            ),
        ];

        first_success(stages).await
    }

    /// Parses `input` and runs the cascade on it
    pub async fn fetch_str(&self, input: &str) -> TranscriptResult {
        let video = VideoReference::parse(input)?;
        self.fetch(&video).await
    }
}

/// Awaits each stage in turn, stopping at the first success or hard failure.
async fn first_success<'a, I>(stages: I) -> TranscriptResult
where
    I: IntoIterator<Item = (Stage, &'a str, BoxFuture<'a, Result<String, SourceError>>)>,
{
    let mut ip_blocked = false;

    for (stage, name, attempt) in stages {
        match SourceAttempt::from(attempt.await) {
            SourceAttempt::Success(text) => {
                tracing::info!(%stage, source = name, chars = text.len(), "Transcript acquired");
                return Ok(Transcript {
                    text,
                    source: stage,
                });
            }
            SourceAttempt::Continue(e) => {
                ip_blocked |= e.is_blocked();
                tracing::warn!(%stage, source = name, error = %e, "Source failed, trying next");
            }
            SourceAttempt::Abort(absence) => {
                tracing::warn!(%stage, source = name, reason = %absence, "Aborting transcript cascade");
                return Err(absence);
            }
        }
    }

    tracing::error!(ip_blocked, "All transcript methods exhausted");
    Err(Absence::AllSourcesExhausted { ip_blocked })
}
