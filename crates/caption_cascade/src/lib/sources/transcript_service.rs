//! Transcripts through YouTube's own caption listing: the watch page yields the
//! InnerTube key, the player endpoint lists caption tracks, and each track's
//! `baseUrl` serves timedtext XML (optionally machine translated via `tlang`).

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use reqwest::{header::ACCEPT_LANGUAGE, Client, StatusCode};
use url::Url;

use crate::{
    error::SourceError,
    normalize::normalize_text,
    parser::YtHtmlDocument,
    sources::{require_video_id, CaptionSource},
    types::{CaptionTracklist, InnerTubeCaptionTrack, PlayerResponse},
    video::{LanguagePair, VideoReference},
};

static TIMEDTEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text[^>]*>(.*?)</text>").unwrap());

pub struct TranscriptService {
    client: Client,
    base_url: String,
}

impl Default for TranscriptService {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl TranscriptService {
    pub const BASE_URL: &'static str = "https://www.youtube.com";
    const INNERTUBE_CLIENT_NAME: &'static str = "ANDROID";
    const INNERTUBE_CLIENT_VERSION: &'static str = "20.10.38";

    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: Self::BASE_URL.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Lists every caption track YouTube advertises for `video_id`
    #[tracing::instrument(skip(self))]
    pub async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptList, SourceError> {
        let resp = self
            .client
            .get(format!("{}/watch", self.base_url))
            .query(&[("v", video_id)])
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;
        let doc = YtHtmlDocument::new(check_status(resp)?.text().await?);

        if doc.is_captcha() {
            return Err(SourceError::Blocked(format!(
                "recaptcha served for video {video_id}"
            )));
        }
        let api_key = doc.innertube_api_key()?;

        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": Self::INNERTUBE_CLIENT_NAME,
                    "clientVersion": Self::INNERTUBE_CLIENT_VERSION
                }
            },
            "videoId": video_id
        });

        let resp = self
            .client
            .post(format!("{}/youtubei/v1/player", self.base_url))
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;
        let player = check_status(resp)?.json::<PlayerResponse>().await?;

        if let Some(status) = player.playability_status.filter(|s| s.status != "OK") {
            let reason = status.reason.unwrap_or(status.status);
            if reason.contains("bot") {
                return Err(SourceError::Blocked(reason));
            }
            return Err(SourceError::Unavailable(format!("video not playable: {reason}")));
        }

        player
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .filter(|t| !t.caption_tracks.is_empty())
            .map(TranscriptList::from)
            .ok_or_else(|| SourceError::Unavailable(format!("transcripts disabled for {video_id}")))
    }

    async fn fetch_selection(&self, selection: &Selection<'_>) -> Result<String, SourceError> {
        let resp = self.client.get(selection.url()?).send().await?;
        let xml = check_status(resp)?.text().await?;
        Ok(normalize_text(&format_timedtext(&xml)))
    }
}

fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, SourceError> {
    match resp.status() {
        StatusCode::TOO_MANY_REQUESTS => Err(SourceError::Blocked(format!(
            "{} answered 429",
            resp.url()
        ))),
        status if !status.is_success() => Err(SourceError::Unavailable(format!(
            "{} answered {status}",
            resp.url()
        ))),
        _ => Ok(resp),
    }
}

/// Timedtext XML to plain text, one line per cue
pub fn format_timedtext(xml: &str) -> String {
    TIMEDTEXT_RE
        .captures_iter(xml)
        .filter_map(|cap| cap.get(1))
        .map(|m| html_escape::decode_html_entities(m.as_str()).split_whitespace().join(" "))
        .filter(|line| !line.is_empty())
        .join("\n")
}

#[derive(Debug)]
pub struct TranscriptList {
    tracks: Vec<InnerTubeCaptionTrack>,
    translation_languages: Vec<String>,
}

impl From<CaptionTracklist> for TranscriptList {
    fn from(value: CaptionTracklist) -> Self {
        Self {
            tracks: value.caption_tracks,
            translation_languages: value
                .translation_languages
                .into_iter()
                .map(|l| l.language_code)
                .collect(),
        }
    }
}

#[derive(Debug)]
pub enum Selection<'a> {
    Direct(&'a InnerTubeCaptionTrack),
    Translated {
        source: &'a InnerTubeCaptionTrack,
        target: &'a str,
    },
}

impl Selection<'_> {
    fn url(&self) -> Result<Url, SourceError> {
        let source = match self {
            Selection::Direct(track) => track,
            Selection::Translated { source, .. } => source,
        };
        let raw = source.base_url.replace("&fmt=srv3", "");
        let mut url = Url::parse(&raw)
            .map_err(|e| SourceError::Parse(format!("bad caption url {raw}: {e}")))?;

        if let Selection::Translated { target, .. } = self {
            url.query_pairs_mut().append_pair("tlang", target);
        }
        Ok(url)
    }
}

fn is_generated(track: &InnerTubeCaptionTrack) -> bool {
    track.kind.as_deref() == Some("asr")
}

impl TranscriptList {
    /// Selection order: manual tracks in target then fallback language, generated
    /// tracks in the same order, then a translatable track translated to the target.
    pub fn select<'a>(&'a self, languages: &'a LanguagePair) -> Option<Selection<'a>> {
        let direct = [false, true].into_iter().find_map(|generated| {
            languages.in_order().into_iter().find_map(|lang| {
                self.tracks
                    .iter()
                    .find(|t| t.language_code == lang && is_generated(t) == generated)
            })
        });
        if let Some(track) = direct {
            return Some(Selection::Direct(track));
        }

        let target = languages.target.as_str();
        let can_translate = self.translation_languages.is_empty()
            || self.translation_languages.iter().any(|l| l == target);
        if !can_translate {
            return None;
        }

        self.tracks
            .iter()
            .filter(|t| t.is_translatable)
            .min_by_key(|t| (is_generated(t), t.language_code != languages.fallback))
            .map(|source| Selection::Translated { source, target })
    }
}

impl CaptionSource for TranscriptService {
    const NAME: &'static str = "transcript-service";

    #[tracing::instrument(skip(self, video, languages), fields(video = %video))]
    async fn fetch_transcript(
        &self,
        video: &VideoReference,
        languages: &LanguagePair,
    ) -> Result<String, SourceError> {
        let video_id = require_video_id(video)?;
        let list = self.list_transcripts(video_id).await?;

        let selection = list.select(languages).ok_or_else(|| {
            SourceError::Unavailable("no transcript in a wanted or translatable language".into())
        })?;
        if let Selection::Translated { source, target } = &selection {
            tracing::debug!(from = %source.language_code, to = %target, "Requesting translated transcript");
        }

        self.fetch_selection(&selection).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list(tracks: serde_json::Value) -> TranscriptList {
        let tracklist: CaptionTracklist = serde_json::from_value(json!({
            "captionTracks": tracks,
            "translationLanguages": [{ "languageCode": "tr" }, { "languageCode": "en" }]
        }))
        .unwrap();
        TranscriptList::from(tracklist)
    }

    fn track(lang: &str, generated: bool) -> serde_json::Value {
        let mut t = json!({
            "baseUrl": format!("https://www.youtube.com/api/timedtext?v=x&lang={lang}&fmt=srv3"),
            "languageCode": lang,
            "isTranslatable": true
        });
        if generated {
            t["kind"] = json!("asr");
        }
        t
    }

    #[test]
    fn test_manual_fallback_beats_generated_target() {
        let list = list(json!([track("tr", true), track("en", false)]));
        let languages = LanguagePair::default();

        match list.select(&languages) {
            Some(Selection::Direct(t)) => assert_eq!(t.language_code, "en"),
            other => panic!("expected direct en, got {other:?}"),
        }
    }

    #[test]
    fn test_generated_target_when_no_manual() {
        let list = list(json!([track("tr", true), track("en", true)]));
        let languages = LanguagePair::default();

        match list.select(&languages) {
            Some(Selection::Direct(t)) => {
                assert_eq!(t.language_code, "tr");
                assert!(is_generated(t));
            }
            other => panic!("expected direct tr, got {other:?}"),
        }
    }

    #[test]
    fn test_translation_when_no_wanted_language() {
        let list = list(json!([track("de", true), track("fr", false)]));
        let languages = LanguagePair::default();

        match list.select(&languages) {
            Some(Selection::Translated { source, target }) => {
                assert_eq!(source.language_code, "fr", "manual sources are preferred");
                assert_eq!(target, "tr");
            }
            other => panic!("expected translation, got {other:?}"),
        }
    }

    #[test]
    fn test_translated_url_drops_srv3_and_adds_tlang() {
        let list = list(json!([track("de", false)]));
        let languages = LanguagePair::default();
        let selection = list.select(&languages).unwrap();

        let url = selection.url().unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("tlang".into(), "tr".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "fmt"));
    }

    #[test]
    fn test_untranslatable_tracks_give_nothing() {
        let tracklist: CaptionTracklist = serde_json::from_value(json!({
            "captionTracks": [{ "baseUrl": "https://x/y?a=b", "languageCode": "de" }]
        }))
        .unwrap();
        let list = TranscriptList::from(tracklist);
        assert!(list.select(&LanguagePair::default()).is_none());
    }

    #[test]
    fn test_format_timedtext() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
            <text start="0.0" dur="1.5">Merhaba &amp;amp; hoş geldiniz</text>
            <text start="1.5" dur="2.0">faiz kararı
            açıklandı</text>
            <text start="3.5" dur="0.5"></text>
        </transcript>"#;

        let text = format_timedtext(xml);
        assert_eq!(text.lines().count(), 2);
        assert_eq!(
            normalize_text(&text),
            "Merhaba & hoş geldiniz faiz kararı açıklandı"
        );
    }
}
