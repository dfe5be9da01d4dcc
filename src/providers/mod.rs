//! Upstream completion providers.
//!
//! Both providers sit behind [`CompletionProvider`] so the router never
//! sees a wire format:
//! - `gemini`: provider A, single combined prompt
//! - `groq`: provider B, OpenAI-style chat completions

pub mod gemini;
pub mod groq;

pub use gemini::GeminiClient;
pub use groq::GroqClient;

use async_trait::async_trait;
use thiserror::Error;

/// Uniform "upstream failure" kind for every provider call.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} request failed: {reason}")]
    Http {
        provider: &'static str,
        /// Full cause chain, URL stripped
        reason: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} error {status}: {body}")]
    Upstream {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} returned a malformed response: {reason}")]
    MalformedResponse {
        provider: &'static str,
        reason: String,
    },
}

impl ProviderError {
    /// Wrap a transport failure, keeping every cause in the message.
    pub fn transport(provider: &'static str, source: reqwest::Error) -> Self {
        let source = source.without_url();
        let mut reason = source.to_string();
        let mut cause = std::error::Error::source(&source);
        while let Some(err) = cause {
            let text = err.to_string();
            if !reason.ends_with(&text) {
                reason.push_str(": ");
                reason.push_str(&text);
            }
            cause = err.source();
        }
        Self::Http {
            provider,
            reason,
            source,
        }
    }

    pub fn provider(&self) -> &'static str {
        match self {
            Self::Http { provider, .. }
            | Self::Upstream { provider, .. }
            | Self::MalformedResponse { provider, .. } => provider,
        }
    }
}

/// A remote text-completion service.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Identifier reported back to API callers in the `model` field.
    fn model_label(&self) -> &str;

    /// Generate one completion for `user` steered by `system`.
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}

pub(crate) fn http_client(timeout: Option<std::time::Duration>) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}
