//! Handling of uploads a channel check reported as new.

use crate::{
    scanner::{ChannelReport, ChannelResultsCache, Upload},
    sources::CaptionSource,
    Summarizer, Summary, TranscriptPipeline,
};

#[derive(Debug, Clone)]
pub struct UploadDigest {
    pub channel: String,
    pub upload: Upload,
    /// `None` when no summarizer is configured
    pub summary: Option<Summary>,
}

/// Summarizes every new upload in `reports`. An upload is marked seen in `cache` only
/// once it was handled, so one without captions yet or with a failed summary comes
/// back on the next check.
pub async fn digest_new_uploads<P, T, A, B, S>(
    pipeline: &TranscriptPipeline<P, T, A, B>,
    summarizer: Option<&S>,
    reports: &[ChannelReport],
    cache: &mut ChannelResultsCache,
) -> Vec<UploadDigest>
where
    P: CaptionSource + Send + Sync,
    T: CaptionSource + Send + Sync,
    A: CaptionSource + Send + Sync,
    B: CaptionSource + Send + Sync,
    S: Summarizer,
{
    let mut digests = Vec::new();

    for report in reports {
        let channel = &report.channel.name;

        for upload in &report.new_uploads {
            tracing::info!(%channel, title = %upload.title, "New upload");

            let summary = match summarizer {
                None => None,
                Some(summarizer) => {
                    let transcript = match pipeline.fetch_str(&upload.url).await {
                        Ok(transcript) => transcript,
                        Err(absence) => {
                            tracing::warn!(url = %upload.url, reason = %absence, "No transcript for upload, retrying next check");
                            continue;
                        }
                    };
                    match summarizer.summarize(&transcript.text).await {
                        Ok(summary) => Some(summary),
                        Err(e) => {
                            tracing::warn!(url = %upload.url, error = %e, "Summary failed, retrying next check");
                            continue;
                        }
                    }
                }
            };

            cache.mark_seen(channel, upload);
            digests.push(UploadDigest {
                channel: channel.clone(),
                upload: upload.clone(),
                summary,
            });
        }
    }

    digests
}
