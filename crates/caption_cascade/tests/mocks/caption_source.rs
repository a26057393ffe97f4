use std::sync::{Arc, Mutex};

use caption_cascade::{sources::CaptionSource, LanguagePair, SourceError, VideoReference};

#[derive(Clone)]
enum Outcome {
    Text(String),
    Fail(String),
    Blocked(String),
    MissingId,
}

#[derive(Clone)]
pub struct MockSource {
    outcome: Outcome,
    /// `(video url, target language)` per call
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockSource {
    fn with(outcome: Outcome) -> Self {
        Self {
            outcome,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn new(text: &str) -> Self {
        Self::with(Outcome::Text(text.to_string()))
    }

    pub fn failing(msg: &str) -> Self {
        Self::with(Outcome::Fail(msg.to_string()))
    }

    pub fn blocked(msg: &str) -> Self {
        Self::with(Outcome::Blocked(msg.to_string()))
    }

    pub fn missing_id() -> Self {
        Self::with(Outcome::MissingId)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl CaptionSource for MockSource {
    const NAME: &'static str = "mock";

    async fn fetch_transcript(
        &self,
        video: &VideoReference,
        languages: &LanguagePair,
    ) -> Result<String, SourceError> {
        self.calls
            .lock()
            .unwrap()
            .push((video.url().to_string(), languages.target.clone()));

        match &self.outcome {
            Outcome::Text(text) => Ok(text.clone()),
            Outcome::Fail(msg) => Err(SourceError::Unavailable(msg.clone())),
            Outcome::Blocked(msg) => Err(SourceError::Blocked(msg.clone())),
            Outcome::MissingId => Err(SourceError::MissingVideoId(video.url().to_string())),
        }
    }
}
