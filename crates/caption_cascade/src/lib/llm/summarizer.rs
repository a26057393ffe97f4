use std::future::Future;

use crate::error::SummaryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Model that produced the summary
    pub model: String,
    pub markdown: String,
}

pub trait Summarizer {
    /// Characters of transcript sent to the model; the rest is dropped
    const CONTEXT_WINDOW_LIMIT: usize = 15_000;

    fn summarize(&self, content: &str) -> impl Future<Output = Result<Summary, SummaryError>> + Send;
}

/// The first `limit` characters of `content`, cut on a char boundary
pub fn truncate_chars(content: &str, limit: usize) -> &str {
    match content.char_indices().nth(limit) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}
