use reqwest::Client;

use crate::{
    error::SourceError,
    normalize::{normalize_text, strip_cue_lines},
    sources::{mirrors::MirrorPool, require_video_id, select_by_language, CaptionSource},
    types::InvidiousCaptionListing,
    video::{LanguagePair, VideoReference},
};

pub const DEFAULT_INSTANCES: &[&str] = &[
    "https://inv.tux.pizza",
    "https://invidious.projectsegfau.lt",
    "https://vid.puffyan.us",
    "https://invidious.fdn.fr",
    "https://invidious.drgns.space",
    "https://invidious.perennialteks.com",
    "https://yt.artemislena.eu",
    "https://invidious.flokinet.to",
    "https://invidious.privacydev.net",
    "https://iv.ggtyler.dev",
    "https://invidious.lunar.icu",
    "https://yewtu.be",
];

/// Caption listings served by Invidious instances
#[derive(Clone)]
pub struct InvidiousMirrors {
    pool: MirrorPool,
}

impl Default for InvidiousMirrors {
    fn default() -> Self {
        Self::new(MirrorPool::new(Client::new(), DEFAULT_INSTANCES.iter().copied()))
    }
}

impl InvidiousMirrors {
    pub fn new(pool: MirrorPool) -> Self {
        Self { pool }
    }

    async fn from_mirror(
        &self,
        mirror: String,
        video_id: &str,
        languages: &LanguagePair,
    ) -> Result<String, SourceError> {
        let listing: InvidiousCaptionListing = self
            .pool
            .lookup_json(&format!("{mirror}/api/v1/captions/{video_id}"))
            .await?;
        let captions = listing.into_captions();

        let caption = select_by_language(&captions, languages, |c| c.language_code.as_str())
            .ok_or_else(|| SourceError::Unavailable(format!("{mirror} lists no wanted language")))?;

        // listings usually carry instance-relative paths
        let caption_url = if caption.url.starts_with("http") {
            caption.url.clone()
        } else {
            format!("{mirror}{}", caption.url)
        };

        let body = self.pool.download_text(&caption_url).await?;
        Ok(normalize_text(&strip_cue_lines(&body)))
    }
}

impl CaptionSource for InvidiousMirrors {
    const NAME: &'static str = "invidious";

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
