use std::sync::{Arc, Mutex};

use caption_cascade::{
    types::{PlaylistEntry, VideoInfo},
    yt::MetadataExtractor,
    LanguagePair,
};

#[derive(Clone)]
pub struct MockExtractor {
    pub info: serde_json::Value,
    /// Served for every `/videos` tab
    pub videos: Vec<PlaylistEntry>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockExtractor {
    pub fn new(info: serde_json::Value) -> Self {
        Self {
            info,
            videos: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn with_videos(videos: Vec<PlaylistEntry>) -> Self {
        Self {
            videos,
            ..Self::new(serde_json::Value::Null)
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            info: serde_json::Value::Null,
            videos: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

impl MetadataExtractor for MockExtractor {
    async fn video_info(&self, url: &str, _languages: &LanguagePair) -> anyhow::Result<VideoInfo> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(serde_json::from_value(self.info.clone())?)
    }

    async fn channel_tab(&self, tab_url: &str, _limit: usize) -> anyhow::Result<Vec<PlaylistEntry>> {
        self.calls.lock().unwrap().push(tab_url.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        if tab_url.ends_with("/videos") {
            return Ok(self.videos.clone());
        }
        Ok(Vec::new())
    }
}
