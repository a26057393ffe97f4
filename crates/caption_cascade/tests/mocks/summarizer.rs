use std::sync::{Arc, Mutex};

use caption_cascade::{Summarizer, Summary, SummaryError};

#[derive(Clone)]
pub struct MockSummarizer {
    pub summary: String,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockSummarizer {
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            summary: String::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

impl Summarizer for MockSummarizer {
    async fn summarize(&self, content: &str) -> Result<Summary, SummaryError> {
        self.calls.lock().unwrap().push(content.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(SummaryError::Failed(msg.clone()));
        }
        Ok(Summary {
            model: "mock-gemini".into(),
            markdown: self.summary.clone(),
        })
    }
}
