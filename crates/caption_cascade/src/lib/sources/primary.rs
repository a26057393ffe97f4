use std::collections::HashMap;

use reqwest::{header::USER_AGENT, Client};

use crate::{
    error::SourceError,
    normalize::{flatten_json3, normalize_text, strip_cue_lines},
    sources::CaptionSource,
    types::{Json3Document, SubtitleFormat, VideoInfo},
    video::{CaptionTrack, LanguagePair, TrackKind, VideoReference},
    yt::{looks_blocked, MetadataExtractor, BROWSER_USER_AGENT},
};

/// Captions listed by a metadata extractor such as `yt-dlp`
pub struct PrimaryExtractor<E> {
    extractor: E,
    client: Client,
}

impl<E: MetadataExtractor> PrimaryExtractor<E> {
    pub fn new(extractor: E, client: Client) -> Self {
        Self { extractor, client }
    }

    async fn download(&self, track: &CaptionTrack) -> Result<String, SourceError> {
        let resp = self
            .client
            .get(&track.url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?
            .error_for_status()?;

        if is_json3(track) {
            let doc = resp.json::<Json3Document>().await?;
            Ok(normalize_text(&flatten_json3(&doc)))
        } else {
            let body = resp.text().await?;
            Ok(normalize_text(&strip_cue_lines(&body)))
        }
    }
}

/// Chooses a track: manual target, automatic target, manual fallback, automatic fallback.
pub fn select_track(info: &VideoInfo, languages: &LanguagePair) -> Option<CaptionTrack> {
    let candidates: [(&str, TrackKind, &HashMap<String, Vec<SubtitleFormat>>); 4] = [
        (languages.target.as_str(), TrackKind::Manual, &info.subtitles),
        (languages.target.as_str(), TrackKind::Automatic, &info.automatic_captions),
        (languages.fallback.as_str(), TrackKind::Manual, &info.subtitles),
        (languages.fallback.as_str(), TrackKind::Automatic, &info.automatic_captions),
    ];

    candidates.into_iter().find_map(|(language, kind, listing)| {
        let format = preferred_format(listing.get(language)?)?;
        Some(CaptionTrack {
            language: language.to_string(),
            kind,
            format: format.ext.clone().unwrap_or_default(),
            url: format.url.clone(),
        })
    })
}

/// `json3` when offered, otherwise the last listed format.
// XXX: assumes yt-dlp lists formats from plainest to richest
fn preferred_format(formats: &[SubtitleFormat]) -> Option<&SubtitleFormat> {
    formats
        .iter()
        .find(|f| f.ext.as_deref() == Some("json3"))
        .or_else(|| formats.last())
}

fn is_json3(track: &CaptionTrack) -> bool {
    track.format == "json3" || track.url.contains("fmt=json3")
}

impl<E: MetadataExtractor + Send + Sync> CaptionSource for PrimaryExtractor<E> {
    const NAME: &'static str = "yt-dlp";

    #[tracing::instrument(skip(self, video, languages), fields(video = %video))]
    async fn fetch_transcript(
        &self,
        video: &VideoReference,
        languages: &LanguagePair,
    ) -> Result<String, SourceError> {
        let info = self
            .extractor
            .video_info(video.url(), languages)
            .await
            .map_err(|e| {
                let message = format!("{e:#}");
                if looks_blocked(&message) {
                    SourceError::Blocked(message)
                } else {
                    SourceError::Unavailable(message)
                }
            })?;

        let track = select_track(&info, languages).ok_or_else(|| {
            SourceError::Unavailable("no caption track in the wanted languages".into())
        })?;
        tracing::debug!(language = %track.language, kind = ?track.kind, format = %track.format, "Selected caption track");

        self.download(&track).await
    }
}
