//! MarketMind API
//!
//! A thin HTTP facade for sales and marketing teams. Each endpoint picks a
//! fixed system prompt, forwards the request to one of two upstream
//! language-model providers, and returns the completion text.
//!
//! ## Module Structure
//!
//! - `config`: environment-derived [`AppConfig`]
//! - `prompts`: [`Mode`] and the system prompt table
//! - `providers`: [`CompletionProvider`] plus the Gemini and Groq clients
//! - `router`: [`PromptRouter`], the five routed operations
//! - `server`: axum routes and the HTTP error mapping

pub mod config;
pub mod prompts;
pub mod providers;
pub mod router;
pub mod server;

pub use config::{AppConfig, ConfigError, ProviderConfig};
pub use prompts::{Mode, SystemPromptTable};
pub use providers::{CompletionProvider, GeminiClient, GroqClient, ProviderError};
pub use router::{
    ChatRequest, CompletionResult, LeadRequest, LeadScoreResult, PromptRouter, ProviderSlot,
};
pub use server::{build_app, run_server, ApiError, ApiState};
