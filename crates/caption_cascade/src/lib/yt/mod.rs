pub mod ytdlp;

use std::future::Future;

use crate::{
    types::{PlaylistEntry, VideoInfo},
    video::LanguagePair,
};

/// Browser-like identification sent with metadata and subtitle requests.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Media-metadata lookups that never download the video payload
pub trait MetadataExtractor {
    /// Subtitle and automatic caption listings of a single video
    fn video_info(
        &self,
        url: &str,
        languages: &LanguagePair,
    ) -> impl Future<Output = anyhow::Result<VideoInfo>> + Send;

    /// The most recent `limit` entries of a channel tab such as `/videos`
    fn channel_tab(
        &self,
        tab_url: &str,
        limit: usize,
    ) -> impl Future<Output = anyhow::Result<Vec<PlaylistEntry>>> + Send;
}

/// Whether an extractor failure message points at YouTube throttling this IP
pub fn looks_blocked(message: &str) -> bool {
    message.contains("HTTP Error 429")
        || message.contains("Sign in to confirm")
        || message.contains("not a bot")
}
