//! Provider A: Google Gemini `generateContent`.
//!
//! Gemini takes a single prompt here, so the system instruction is folded
//! into the text as `"{system}\n\nUser: {user}"`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{http_client, CompletionProvider, ProviderError};
use crate::config::ProviderConfig;

const PROVIDER: &str = "gemini";

pub const GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String, String> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(match self.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => format!("prompt blocked ({})", reason),
                None => "no candidates in response".to_string(),
            });
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(match candidate.finish_reason {
                Some(reason) => format!("candidate has no text (finish reason: {})", reason),
                None => "candidate has no text".to_string(),
            });
        }
        Ok(text)
    }
}

pub fn combined_prompt(system: &str, user: &str) -> String {
    format!("{system}\n\nUser: {user}")
}

pub struct GeminiClient {
    client: Client,
    config: ProviderConfig,
}

impl GeminiClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client =
            http_client(config.timeout).map_err(|e| ProviderError::transport(PROVIDER, e))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base, GEMINI_MODEL
        )
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    fn model_label(&self) -> &str {
        GEMINI_MODEL
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let prompt = combined_prompt(system, user);
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![TextPart { text: &prompt }],
            }],
        };

        debug!("Calling Gemini: model={}, prompt_len={}", GEMINI_MODEL, prompt.len());

        let resp = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        if !status.is_success() {
            return Err(ProviderError::Upstream {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::MalformedResponse {
                provider: PROVIDER,
                reason: e.to_string(),
            })?;

        parsed
            .into_text()
            .map_err(|reason| ProviderError::MalformedResponse {
                provider: PROVIDER,
                reason,
            })
    }
}
