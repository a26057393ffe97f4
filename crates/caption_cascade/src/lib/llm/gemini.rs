use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    error::SummaryError,
    llm::summarizer::{truncate_chars, Summarizer, Summary},
};

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    models: Vec<String>,
    language: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Response carried no text")]
    EmptyResponse,
}

impl GeminiError {
    fn status(&self) -> Option<u16> {
        match self {
            GeminiError::Api { status, .. } => Some(*status),
            GeminiError::Request(e) => e.status().map(|s| s.as_u16()),
            GeminiError::EmptyResponse => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

impl GeminiClient {
    const PROMPT_TEMPLATE: &str = include_str!("./prompts/economy_tr.txt");
    pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const DEFAULT_MODELS: [&str; 4] = [
        "gemini-2.5-flash",
        "gemini-2.5-flash-lite",
        "gemini-2.5-pro",
        "gemini-2.0-flash",
    ];

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: Self::BASE_URL.into(),
            models: Self::DEFAULT_MODELS.map(String::from).to_vec(),
            language: "tr".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Models tried in order until one answers
    pub fn with_models<S: Into<String>>(mut self, models: impl IntoIterator<Item = S>) -> Self {
        self.models = models
            .into_iter()
            .map(Into::into)
            .map(|m| m.trim().trim_start_matches("models/").to_string())
            .filter(|m| !m.is_empty())
            .collect();
        self
    }

    /// Language code the summary is written in
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    fn prompt(&self, content: &str) -> String {
        Self::PROMPT_TEMPLATE
            .replace("{language}", &self.language)
            .replace(
                "{transcript}",
                truncate_chars(content, Self::CONTEXT_WINDOW_LIMIT),
            )
    }

    pub async fn generate_content(&self, model: &str, prompt: &str) -> Result<String, GeminiError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let resp = self
            .client
            .post(format!("{}/models/{model}:generateContent", self.base_url))
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(GeminiError::Api { status, message });
        }

        let text = resp
            .json::<GenerateResponse>()
            .await?
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .map(|p| p.text)
            .collect::<String>();

        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse);
        }
        Ok(text)
    }

    /// Names of models that support `generateContent`, without the `models/` prefix
    pub async fn list_models(&self) -> Result<Vec<String>, GeminiError> {
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(format!("{}/models", self.base_url))
                .query(&[("key", &self.api_key)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let resp = request.send().await?;
            if !resp.status().is_success() {
                let status = resp.status().as_u16();
                let message = resp.text().await.unwrap_or_default();
                return Err(GeminiError::Api { status, message });
            }

            let page = resp.json::<ModelList>().await?;
            names.extend(
                page.models
                    .into_iter()
                    .filter(|m| m.supported_generation_methods.iter().any(|g| g == "generateContent"))
                    .map(|m| m.name.trim_start_matches("models/").to_string()),
            );

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(names)
    }
}

fn classify(last_error: GeminiError) -> SummaryError {
    match last_error.status().and_then(|s| StatusCode::from_u16(s).ok()) {
        Some(StatusCode::TOO_MANY_REQUESTS) => SummaryError::QuotaExceeded,
        Some(s @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND)) => {
            SummaryError::AccessDenied(s.as_u16())
        }
        _ => SummaryError::Failed(last_error.to_string()),
    }
}

impl Summarizer for GeminiClient {
    #[tracing::instrument(skip(self, content), fields(chars = content.len()))]
    async fn summarize(&self, content: &str) -> Result<Summary, SummaryError> {
        let prompt = self.prompt(content);
        let mut last_error = None;

        for model in &self.models {
            tracing::info!(%model, "Requesting summary");
            match self.generate_content(model, &prompt).await {
                Ok(markdown) => {
                    return Ok(Summary {
                        model: model.clone(),
                        markdown,
                    })
                }
                Err(e) => {
                    tracing::warn!(%model, error = %e, "Model failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.map_or(SummaryError::NoModels, classify))
    }
}
