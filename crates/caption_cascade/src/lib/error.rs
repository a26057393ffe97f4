#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    ParseError(&'static str),
}

/// Failure of a single caption source. Every variant except `MissingVideoId`
/// lets the cascade move on to the next stage.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),
    #[error("Unexpected response shape: {0}")]
    Parse(String),
    #[error("Blocked by upstream: {0}")]
    Blocked(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source returned no text")]
    Empty,
    #[error("No video identifier could be extracted from '{0}'")]
    MissingVideoId(String),
}

impl SourceError {
    pub fn is_blocked(&self) -> bool {
        match self {
            SourceError::Blocked(_) => true,
            SourceError::Http(e) => e
                .status()
                .is_some_and(|s| s == reqwest::StatusCode::TOO_MANY_REQUESTS),
            _ => false,
        }
    }
}

impl From<Error> for SourceError {
    fn from(value: Error) -> Self {
        SourceError::Parse(value.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(value: serde_json::Error) -> Self {
        SourceError::Parse(value.to_string())
    }
}

/// Terminal outcome of the cascade when no transcript could be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Absence {
    #[error("Empty video reference")]
    InvalidInput,
    #[error("Could not extract a video identifier from '{0}'")]
    NotFound(String),
    #[error("{}", exhausted_message(*ip_blocked))]
    AllSourcesExhausted { ip_blocked: bool },
}

impl Absence {
    /// Whether the input itself was unusable, as opposed to every source failing.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Absence::InvalidInput | Absence::NotFound(_))
    }
}

fn exhausted_message(ip_blocked: bool) -> &'static str {
    if ip_blocked {
        "All methods (yt-dlp, transcript service, Invidious, Piped) were tried but YouTube \
         appears to be temporarily blocking this IP. Please try again later."
    } else {
        "All methods (yt-dlp, transcript service, Invidious, Piped) were tried but none \
         returned captions for this video."
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    #[error("Quota exceeded for all models (429). Please wait a minute or two and retry.")]
    QuotaExceeded,
    #[error("Models not found or not permitted ({0}). Check the API key's permissions.")]
    AccessDenied(u16),
    #[error("No summarization models configured")]
    NoModels,
    #[error("All models failed. Last error: {0}")]
    Failed(String),
}
