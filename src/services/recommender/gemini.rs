//! Google Gemini recommender
//!
//! Calls the `generateContent` REST endpoint and returns the concatenated
//! text of the first candidate. Status codes are classified into
//! [`RecommenderError`] variants so the adapter can log them precisely.

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::{ExternalRecommender, RecommenderError};

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

#[derive(Clone)]
pub struct GeminiRecommender {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl GeminiRecommender {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, RecommenderError> {
        let content = self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .ok_or_else(|| {
                RecommenderError::InvalidResponse("response has no candidates".to_string())
            })?;

        Ok(content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[async_trait::async_trait]
impl ExternalRecommender for GeminiRecommender {
    async fn generate(&self, prompt: &str) -> Result<String, RecommenderError> {
        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RecommenderError::from_status(status, body, &self.model));
        }

        let payload: GenerateResponse = response.json().await?;
        let text = payload.into_text()?;

        tracing::debug!(
            model = %self.model,
            reply_len = text.len(),
            "Gemini reply received"
        );

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
