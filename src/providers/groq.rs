//! Provider B: Groq, OpenAI-compatible chat completions.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{http_client, CompletionProvider, ProviderError};
use crate::config::ProviderConfig;

const PROVIDER: &str = "groq";

pub const GROQ_MODEL: &str = "llama3-8b-8192";
/// Reported in API responses instead of the raw model id
pub const GROQ_MODEL_LABEL: &str = "groq-llama3";
pub const GROQ_MAX_TOKENS: u32 = 600;
pub const GROQ_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct GroqClient {
    client: Client,
    config: ProviderConfig,
}

impl GroqClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client =
            http_client(config.timeout).map_err(|e| ProviderError::transport(PROVIDER, e))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    fn model_label(&self) -> &str {
        GROQ_MODEL_LABEL
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: GROQ_MODEL,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: GROQ_MAX_TOKENS,
            temperature: GROQ_TEMPERATURE,
        };

        debug!("Calling Groq: model={}, user_len={}", GROQ_MODEL, user.len());

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
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

        let chat: ChatResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::MalformedResponse {
                provider: PROVIDER,
                reason: e.to_string(),
            })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: PROVIDER,
                reason: "no message content in choices".to_string(),
            })
    }
}
