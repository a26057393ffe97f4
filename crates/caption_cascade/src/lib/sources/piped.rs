use reqwest::Client;

use crate::{
    error::SourceError,
    normalize::{normalize_text, strip_cue_lines},
    sources::{mirrors::MirrorPool, require_video_id, select_by_language, CaptionSource},
    types::PipedStreams,
    video::{LanguagePair, VideoReference},
};

pub const DEFAULT_INSTANCES: &[&str] = &[
    "https://pipedapi.kavin.rocks",
    "https://pipedapi.tokhmi.xyz",
    "https://pipedapi.moomoo.me",
    "https://api.piped.privacy.com.de",
    "https://pipedapi.smnz.de",
    "https://pipedapi.adminforge.de",
    "https://pipedapi.drgns.space",
    "https://api.piped.projectsegfau.lt",
    "https://pipedapi.in.projectsegfau.lt",
    "https://pipedapi.us.projectsegfau.lt",
    "https://lo.piped.video",
    "https://pipedapi.ducks.party",
];

/// Stream-info documents served by Piped API instances
#[derive(Clone)]
pub struct PipedMirrors {
    pool: MirrorPool,
}

impl Default for PipedMirrors {
    fn default() -> Self {
        Self::new(MirrorPool::new(Client::new(), DEFAULT_INSTANCES.iter().copied()))
    }
}

impl PipedMirrors {
    pub fn new(pool: MirrorPool) -> Self {
        Self { pool }
    }

    async fn from_mirror(
        &self,
        mirror: String,
        video_id: &str,
        languages: &LanguagePair,
    ) -> Result<String, SourceError> {
        let streams: PipedStreams = self
            .pool
            .lookup_json(&format!("{mirror}/streams/{video_id}"))
            .await?;

        let subtitle = select_by_language(&streams.subtitles, languages, |s| s.code.as_str())
            .ok_or_else(|| SourceError::Unavailable(format!("{mirror} lists no wanted language")))?;

        tracing::debug!(
            code = %subtitle.code,
            auto_generated = subtitle.auto_generated,
            mime_type = ?subtitle.mime_type,
            "Selected Piped subtitle"
        );

        let body = self.pool.download_text(&subtitle.url).await?;
        Ok(normalize_text(&strip_cue_lines(&body)))
    }
}

impl CaptionSource for PipedMirrors {
    const NAME: &'static str = "piped";

    #[tracing::instrument(skip(self, video, languages), fields(video = %video))]
    async fn fetch_transcript(
        &self,
        video: &VideoReference,
        languages: &LanguagePair,
    ) -> Result<String, SourceError> {
        let video_id = require_video_id(video)?;

        self.pool
            .first_text(Self::NAME, |mirror| self.from_mirror(mirror, video_id, languages))
            .await
    }
}
