//! Service Configuration
//!
//! Everything the service needs from the environment is read exactly once,
//! at process entry, into an [`AppConfig`]. The router receives the config
//! by value; nothing downstream touches `std::env`.
//!
//! Required:
//! - `GEMINI_API_KEY`: secret for provider A
//! - `GROQ_API_KEY`: secret for provider B
//!
//! Optional:
//! - `GEMINI_API_BASE`, `GROQ_API_BASE`: base URL overrides
//! - `PROVIDER_TIMEOUT_SECS`: HTTP timeout applied to provider calls

use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const GROQ_API_KEY_VAR: &str = "GROQ_API_KEY";
pub const GEMINI_API_BASE_VAR: &str = "GEMINI_API_BASE";
pub const GROQ_API_BASE_VAR: &str = "GROQ_API_BASE";
pub const PROVIDER_TIMEOUT_VAR: &str = "PROVIDER_TIMEOUT_SECS";

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing API key {0}: set GEMINI_API_KEY and GROQ_API_KEY (e.g. in a .env file)")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

/// Connection settings for a single upstream provider
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub api_base: String,
    /// `None` leaves reqwest's default (no timeout) in place
    pub timeout: Option<Duration>,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

// Keys stay out of logs and panic messages.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Provider A (Gemini)
    pub gemini: ProviderConfig,
    /// Provider B (Groq)
    pub groq: ProviderConfig,
}

impl AppConfig {
    /// Build the config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let gemini_key =
            non_empty(GEMINI_API_KEY_VAR).ok_or(ConfigError::MissingVar(GEMINI_API_KEY_VAR))?;
        let groq_key =
            non_empty(GROQ_API_KEY_VAR).ok_or(ConfigError::MissingVar(GROQ_API_KEY_VAR))?;

        let timeout = match non_empty(PROVIDER_TIMEOUT_VAR) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidVar {
                        name: PROVIDER_TIMEOUT_VAR,
                        reason: e.to_string(),
                    }
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let gemini_base =
            non_empty(GEMINI_API_BASE_VAR).unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string());
        let groq_base =
            non_empty(GROQ_API_BASE_VAR).unwrap_or_else(|| DEFAULT_GROQ_API_BASE.to_string());

        Ok(Self {
            gemini: ProviderConfig::new(gemini_key, gemini_base).with_timeout(timeout),
            groq: ProviderConfig::new(groq_key, groq_base).with_timeout(timeout),
        })
    }
}
