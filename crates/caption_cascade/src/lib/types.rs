//! Wire shapes of the upstream services. Only the fields the cascade reads are modelled.

use std::collections::HashMap;

use serde::Deserialize;

// ─── yt-dlp ──────────────────────────────────────────────────────────────────

/// Output of `yt-dlp --dump-single-json` for a single video
#[derive(Debug, Default, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub subtitles: HashMap<String, Vec<SubtitleFormat>>,
    #[serde(default)]
    pub automatic_captions: HashMap<String, Vec<SubtitleFormat>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubtitleFormat {
    pub ext: Option<String>,
    pub url: String,
    pub name: Option<String>,
}

/// Output of `yt-dlp --flat-playlist --dump-single-json` for a channel tab
#[derive(Debug, Default, Deserialize)]
pub struct PlaylistInfo {
    #[serde(default)]
    pub entries: Vec<Option<PlaylistEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistEntry {
    pub id: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub upload_date: Option<String>,
}

// ─── json3 captions ──────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct Json3Document {
    #[serde(default)]
    pub events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
pub struct Json3Event {
    pub segs: Option<Vec<Json3Segment>>,
}

#[derive(Debug, Deserialize)]
pub struct Json3Segment {
    pub utf8: Option<String>,
}

// ─── InnerTube player ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub playability_status: Option<PlayabilityStatus>,
    pub captions: Option<PlayerCaptions>,
}

#[derive(Debug, Deserialize)]
pub struct PlayabilityStatus {
    pub status: String,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCaptions {
    pub player_captions_tracklist_renderer: Option<CaptionTracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTracklist {
    #[serde(default)]
    pub caption_tracks: Vec<InnerTubeCaptionTrack>,
    #[serde(default)]
    pub translation_languages: Vec<TranslationLanguage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InnerTubeCaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// `"asr"` for speech-recognition tracks
    pub kind: Option<String>,
    #[serde(default)]
    pub is_translatable: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationLanguage {
    pub language_code: String,
}

// ─── Invidious ───────────────────────────────────────────────────────────────

/// `/api/v1/captions/{id}` listing. Most instances wrap the list in an object,
/// some older ones return the bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InvidiousCaptionListing {
    Wrapped { captions: Vec<InvidiousCaption> },
    Bare(Vec<InvidiousCaption>),
}

impl InvidiousCaptionListing {
    pub fn into_captions(self) -> Vec<InvidiousCaption> {
        match self {
            InvidiousCaptionListing::Wrapped { captions } => captions,
            InvidiousCaptionListing::Bare(captions) => captions,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvidiousCaption {
    pub label: Option<String>,
    pub language_code: String,
    pub url: String,
}

// ─── Piped ───────────────────────────────────────────────────────────────────

/// `/streams/{id}` document, reduced to the subtitle list
#[derive(Debug, Deserialize)]
pub struct PipedStreams {
    #[serde(default)]
    pub subtitles: Vec<PipedSubtitle>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipedSubtitle {
    pub url: String,
    pub code: String,
    pub mime_type: Option<String>,
    #[serde(default)]
    pub auto_generated: bool,
}
