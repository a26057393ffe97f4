//! Channel watch: finds the uploads a channel published today.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    str::FromStr,
};

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

use crate::{types::PlaylistEntry, video::VideoReference, yt::MetadataExtractor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    LiveStream,
    Video,
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadKind::LiveStream => f.write_str("live stream"),
            UploadKind::Video => f.write_str("video"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub title: String,
    pub url: String,
    pub kind: UploadKind,
    pub upload_date: NaiveDate,
}

impl Upload {
    /// `None` when the entry lacks a title, a link or a parseable `YYYYMMDD` date
    fn from_entry(entry: PlaylistEntry, kind: UploadKind) -> Option<Self> {
        let upload_date = NaiveDate::parse_from_str(entry.upload_date.as_deref()?, "%Y%m%d").ok()?;
        let url = entry
            .url
            .or_else(|| entry.id.map(|id| format!("{}?v={id}", VideoReference::WATCH_URL)))?;

        Some(Self {
            title: entry.title?,
            url,
            kind,
            upload_date,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelScan {
    pub todays_uploads: Vec<Upload>,
    /// Latest dated entry across both tabs, whatever its date
    pub most_recent: Option<Upload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub name: String,
    pub url: String,
}

impl FromStr for Channel {
    type Err = String;

    /// Parses `name=https://www.youtube.com/@handle`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, url) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=URL, got '{s}'"))?;
        let (name, url) = (name.trim(), url.trim().trim_end_matches('/'));
        if name.is_empty() || url.is_empty() {
            return Err(format!("expected NAME=URL, got '{s}'"));
        }
        Ok(Self {
            name: name.to_string(),
            url: url.to_string(),
        })
    }
}

pub fn default_channels() -> Vec<Channel> {
    vec![
        Channel {
            name: "Cihat E. Çiçek".into(),
            url: "https://www.youtube.com/@cihatecicek".into(),
        },
        Channel {
            name: "Tunç Şatıroğlu".into(),
            url: "https://www.youtube.com/@TuncSatiroglu".into(),
        },
    ]
}

/// Results of the last channel check and the uploads already handled, keyed by
/// channel name. Owned by the caller.
#[derive(Debug, Default)]
pub struct ChannelResultsCache {
    results: HashMap<String, Vec<Upload>>,
    seen: HashMap<String, HashSet<String>>,
}

impl ChannelResultsCache {
    /// Stores `uploads` as the latest result for `channel` and returns those not yet
    /// marked seen. Seen marks for uploads that dropped out of the list are forgotten.
    pub fn record(&mut self, channel: &str, uploads: Vec<Upload>) -> Vec<Upload> {
        let seen = self.seen.entry(channel.to_string()).or_default();
        seen.retain(|url| uploads.iter().any(|u| &u.url == url));

        let unseen = uploads
            .iter()
            .filter(|u| !seen.contains(&u.url))
            .cloned()
            .collect();
        self.results.insert(channel.to_string(), uploads);

        unseen
    }

    /// Marks `upload` as handled so later checks stop reporting it
    pub fn mark_seen(&mut self, channel: &str, upload: &Upload) {
        self.seen
            .entry(channel.to_string())
            .or_default()
            .insert(upload.url.clone());
    }

    pub fn get(&self, channel: &str) -> Option<&[Upload]> {
        self.results.get(channel).map(Vec::as_slice)
    }

    pub fn clear(&mut self) {
        self.results.clear();
        self.seen.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.results.values().all(Vec::is_empty)
    }
}

#[derive(Debug, Clone)]
pub struct ChannelReport {
    pub channel: Channel,
    pub scan: ChannelScan,
    /// Today's uploads not yet marked seen in the cache
    pub new_uploads: Vec<Upload>,
}

pub struct LatestUploadScanner<E> {
    extractor: E,
    timezone: Tz,
    limit: usize,
}

impl<E: MetadataExtractor> LatestUploadScanner<E> {
    const TABS: [(&'static str, UploadKind); 2] =
        [("streams", UploadKind::LiveStream), ("videos", UploadKind::Video)];
    pub const DEFAULT_LIMIT: usize = 15;

    pub fn new(extractor: E, timezone: Tz) -> Self {
        Self {
            extractor,
            timezone,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    /// The current calendar day in the configured timezone
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    #[tracing::instrument(skip(self))]
    pub async fn scan_on(&self, channel_url: &str, today: NaiveDate) -> ChannelScan {
        let mut scan = ChannelScan::default();
        let channel_url = channel_url.trim_end_matches('/');

        for (tab, kind) in Self::TABS {
            let tab_url = format!("{channel_url}/{tab}");
            let entries = match self.extractor.channel_tab(&tab_url, self.limit).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(%tab_url, error = %e, "Failed to list channel tab");
                    continue;
                }
            };

            for entry in entries {
                let Some(upload) = Upload::from_entry(entry, kind) else {
                    tracing::debug!(%tab_url, "Skipping entry without title, url or date");
                    continue;
                };

                if scan
                    .most_recent
                    .as_ref()
                    .is_none_or(|latest| upload.upload_date > latest.upload_date)
                {
                    scan.most_recent = Some(upload.clone());
                }
                if upload.upload_date == today {
                    scan.todays_uploads.push(upload);
                }
            }
        }

        scan
    }

    /// Scans every channel and records today's uploads in `cache`. Nothing is marked
    /// seen here; that is up to whoever handles the new uploads.
    pub async fn check_channels(
        &self,
        channels: &[Channel],
        cache: &mut ChannelResultsCache,
    ) -> Vec<ChannelReport> {
        let today = self.today();
        let mut reports = Vec::with_capacity(channels.len());

        for channel in channels {
            let scan = self.scan_on(&channel.url, today).await;
            let new_uploads = cache.record(&channel.name, scan.todays_uploads.clone());
            tracing::info!(
                channel = %channel.name,
                today = scan.todays_uploads.len(),
                new = new_uploads.len(),
                "Checked channel"
            );

            reports.push(ChannelReport {
                channel: channel.clone(),
                scan,
                new_uploads,
            });
        }

        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{types::VideoInfo, video::LanguagePair};

    #[derive(Default)]
    struct TabExtractor {
        tabs: HashMap<String, Result<Vec<PlaylistEntry>, String>>,
    }

    impl TabExtractor {
        fn with_tab(mut self, url: &str, entries: Result<Vec<PlaylistEntry>, &str>) -> Self {
            self.tabs
                .insert(url.to_string(), entries.map_err(str::to_string));
            self
        }
    }

    impl MetadataExtractor for TabExtractor {
        async fn video_info(&self, _url: &str, _languages: &LanguagePair) -> anyhow::Result<VideoInfo> {
            anyhow::bail!("not used")
        }

        async fn channel_tab(&self, tab_url: &str, limit: usize) -> anyhow::Result<Vec<PlaylistEntry>> {
            match self.tabs.get(tab_url) {
                Some(Ok(entries)) => Ok(entries.iter().take(limit).cloned().collect()),
                Some(Err(msg)) => Err(anyhow::anyhow!("{msg}")),
                None => Ok(Vec::new()),
            }
        }
    }

    fn entry(id: &str, title: &str, date: Option<&str>) -> PlaylistEntry {
        PlaylistEntry {
            id: Some(id.into()),
            url: Some(format!("https://www.youtube.com/watch?v={id}")),
            title: Some(title.into()),
            upload_date: date.map(Into::into),
        }
    }

    const CHANNEL: &str = "https://www.youtube.com/@kanal";

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_reports_todays_uploads_from_both_tabs() {
        let extractor = TabExtractor::default()
            .with_tab(
                "https://www.youtube.com/@kanal/streams",
                Ok(vec![entry("live1", "Canlı yayın", Some("20261014"))]),
            )
            .with_tab(
                "https://www.youtube.com/@kanal/videos",
                Ok(vec![
                    entry("vid1", "Bugünkü video", Some("20261014")),
                    entry("vid0", "Dünkü video", Some("20261013")),
                ]),
            );
        let scanner = LatestUploadScanner::new(extractor, chrono_tz::Europe::Istanbul);

        let scan = scanner.scan_on(CHANNEL, day("2026-10-14")).await;

        let ids: Vec<_> = scan.todays_uploads.iter().map(|u| u.title.as_str()).collect();
        assert_eq!(ids, ["Canlı yayın", "Bugünkü video"]);
        assert_eq!(scan.todays_uploads[0].kind, UploadKind::LiveStream);
        assert_eq!(scan.todays_uploads[1].kind, UploadKind::Video);
        assert_eq!(scan.most_recent.unwrap().title, "Canlı yayın");
    }

    #[tokio::test]
    async fn test_failed_tab_does_not_hide_the_other() {
        let extractor = TabExtractor::default()
            .with_tab("https://www.youtube.com/@kanal/streams", Err("HTTP Error 404"))
            .with_tab(
                "https://www.youtube.com/@kanal/videos",
                Ok(vec![entry("vid1", "Video", Some("20261014"))]),
            );
        let scanner = LatestUploadScanner::new(extractor, chrono_tz::Europe::Istanbul);

        let scan = scanner.scan_on(CHANNEL, day("2026-10-14")).await;
        assert_eq!(scan.todays_uploads.len(), 1);
    }

    #[tokio::test]
    async fn test_undated_entries_skipped_and_latest_reported() {
        let extractor = TabExtractor::default().with_tab(
            "https://www.youtube.com/@kanal/videos",
            Ok(vec![
                entry("nodate", "Tarihsiz", None),
                entry("bad", "Bozuk tarih", Some("2026-10-01")),
                entry("old", "Eski", Some("20260901")),
                entry("newer", "Daha yeni", Some("20261001")),
            ]),
        );
        let scanner = LatestUploadScanner::new(extractor, chrono_tz::Europe::Istanbul);

        let scan = scanner.scan_on(CHANNEL, day("2026-10-14")).await;
        assert!(scan.todays_uploads.is_empty());
        let latest = scan.most_recent.unwrap();
        assert_eq!(latest.title, "Daha yeni");
        assert_eq!(latest.upload_date, day("2026-10-01"));
    }

    #[tokio::test]
    async fn test_limit_is_passed_to_extractor() {
        let entries = (0..30)
            .map(|i| entry(&format!("v{i}"), "x", Some("20261014")))
            .collect();
        let extractor =
            TabExtractor::default().with_tab("https://www.youtube.com/@kanal/videos", Ok(entries));
        let scanner = LatestUploadScanner::new(extractor, chrono_tz::Europe::Istanbul);

        let scan = scanner.scan_on(CHANNEL, day("2026-10-14")).await;
        assert_eq!(scan.todays_uploads.len(), LatestUploadScanner::<TabExtractor>::DEFAULT_LIMIT);
    }

    fn upload(id: &str) -> Upload {
        Upload {
            title: id.into(),
            url: format!("https://www.youtube.com/watch?v={id}"),
            kind: UploadKind::Video,
            upload_date: day("2026-10-14"),
        }
    }

    #[test]
    fn test_unhandled_uploads_stay_new_until_marked_seen() {
        let mut cache = ChannelResultsCache::default();

        assert_eq!(cache.record("kanal", vec![upload("a")]), vec![upload("a")]);
        assert_eq!(
            cache.record("kanal", vec![upload("a")]),
            vec![upload("a")],
            "an upload nobody handled is reported again"
        );

        cache.mark_seen("kanal", &upload("a"));
        let new = cache.record("kanal", vec![upload("a"), upload("b")]);
        assert_eq!(new, vec![upload("b")]);
        assert_eq!(cache.get("kanal").map(<[Upload]>::len), Some(2));
    }

    #[test]
    fn test_seen_marks_are_per_channel_and_forgotten_when_dropped() {
        let mut cache = ChannelResultsCache::default();
        cache.record("kanal", vec![upload("a")]);
        cache.mark_seen("kanal", &upload("a"));

        assert_eq!(cache.record("diger", vec![upload("a")]), vec![upload("a")]);

        assert!(cache.record("kanal", Vec::new()).is_empty());
        assert_eq!(cache.record("kanal", vec![upload("a")]), vec![upload("a")]);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_channel_from_str() {
        let channel: Channel = "Kanal=https://www.youtube.com/@kanal/".parse().unwrap();
        assert_eq!(channel.name, "Kanal");
        assert_eq!(channel.url, "https://www.youtube.com/@kanal");
        assert!("no-separator".parse::<Channel>().is_err());
        assert!("=https://x".parse::<Channel>().is_err());
    }
}
