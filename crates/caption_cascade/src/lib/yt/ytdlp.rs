use std::path::PathBuf;

use anyhow::Context;
use serde::de::DeserializeOwned;
use tokio::process::Command;

use crate::{
    types::{PlaylistEntry, PlaylistInfo, VideoInfo},
    video::LanguagePair,
    yt::{MetadataExtractor, BROWSER_USER_AGENT},
};

/// `yt-dlp` invoked as a subprocess in JSON dump mode
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn dump_json<T: DeserializeOwned>(&self, args: &[&str]) -> anyhow::Result<T> {
        let output = Command::new(&self.binary)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .inspect_err(|e| tracing::error!(error = %e, binary = ?self.binary, "Failed to spawn yt-dlp"))
            .with_context(|| format!("Failed to spawn {}", self.binary.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp exited with {}: {}", output.status, stderr.trim());
        }

        serde_json::from_slice(&output.stdout).context("Failed to parse yt-dlp JSON output")
    }
}

impl MetadataExtractor for YtDlp {
    #[tracing::instrument(skip(self))]
    async fn video_info(&self, url: &str, languages: &LanguagePair) -> anyhow::Result<VideoInfo> {
        let sub_langs = languages.in_order().join(",");

        self.dump_json(&[
            "--dump-single-json",
            "--skip-download",
            "--no-warnings",
            "--write-subs",
            "--write-auto-subs",
            "--sub-langs",
            sub_langs.as_str(),
            "--user-agent",
            BROWSER_USER_AGENT,
            url,
        ])
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn channel_tab(&self, tab_url: &str, limit: usize) -> anyhow::Result<Vec<PlaylistEntry>> {
        let limit = limit.to_string();

        let info: PlaylistInfo = self
            .dump_json(&[
                "--flat-playlist",
                "--dump-single-json",
                "--playlist-end",
                limit.as_str(),
                "--ignore-errors",
                "--no-cache-dir",
                "--no-warnings",
                tab_url,
            ])
            .await?;

        Ok(info.entries.into_iter().flatten().collect())
    }
}
