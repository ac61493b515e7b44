//! Google Gemini `generateContent` adapter.

use std::time::Duration;

use async_trait::async_trait;
use modkit::TracedClient;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::AssistantConfig;
use crate::contract::{client::LlmClient, error::LlmError};

const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_ERROR_BODY: usize = 512;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

pub struct GeminiClient {
    http: TracedClient,
    endpoint: Url,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(cfg: &AssistantConfig) -> Result<Self, LlmError> {
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            cfg.base_url.trim_end_matches('/'),
            cfg.model
        );
        let endpoint =
            Url::parse(&endpoint).map_err(|e| LlmError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        let http = TracedClient::with_timeout(Duration::from_secs(cfg.timeout_secs.max(1)))?;
        Ok(Self {
            http,
            endpoint,
            api_key: cfg.resolved_api_key(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
        };
        let req = self
            .http
            .inner()
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, key)
            .json(&body)
            .build()?;

        let resp = self.http.execute(req).await?;
        let status = resp.status();
        if !status.is_success() {
            let body: String = resp
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY)
                .collect();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<GenerateResponse>()
            .await?
            .text()
            .ok_or(LlmError::EmptyResponse)
    }
}
