//! Prompt Router
//!
//! Maps each API operation to a system prompt and a provider slot, calls
//! the provider once, and wraps the reply with its metadata.
//!
//! ```text
//! operation          prompt     provider
//! chat               by mode    A
//! generate_campaign  campaign   B
//! generate_pitch     pitch      A
//! score_lead         leads      B
//! analyze_market     chat       A
//! ```

use serde::{de, Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::prompts::{lead_prompt, market_prompt, Mode, SystemPromptTable};
use crate::providers::{CompletionProvider, GeminiClient, GroqClient, ProviderError};

/// Which upstream provider an operation is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSlot {
    A,
    B,
}

/// Fixed endpoint -> provider table
pub const CHAT_PROVIDER: ProviderSlot = ProviderSlot::A;
pub const CAMPAIGN_PROVIDER: ProviderSlot = ProviderSlot::B;
pub const PITCH_PROVIDER: ProviderSlot = ProviderSlot::A;
pub const LEADS_PROVIDER: ProviderSlot = ProviderSlot::B;
pub const MARKET_PROVIDER: ProviderSlot = ProviderSlot::A;

pub const MARKET_MODE: &str = "market";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_mode() -> String {
    Mode::Chat.as_str().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeadRequest {
    pub company: String,
    pub industry: String,
    #[serde(deserialize_with = "lax_integer")]
    pub interactions: i64,
    pub budget_signal: String,
}

/// Accepts `5`, `5.0` and `"5"`; rejects fractions and non-numeric text.
fn lax_integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lax {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Lax::deserialize(deserializer)? {
        Lax::Int(n) => Ok(n),
        Lax::Float(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        Lax::Float(f) => Err(de::Error::custom(format!(
            "expected a whole number, got {}",
            f
        ))),
        Lax::Text(text) => text.trim().parse().map_err(|_| {
            de::Error::custom(format!("expected a whole number, got {:?}", text))
        }),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionResult {
    pub reply: String,
    pub model: String,
    pub mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeadScoreResult {
    pub reply: String,
    pub model: String,
    pub lead: LeadRequest,
}

pub struct PromptRouter {
    prompts: SystemPromptTable,
    provider_a: Arc<dyn CompletionProvider>,
    provider_b: Arc<dyn CompletionProvider>,
}

impl PromptRouter {
    pub fn new(
        prompts: SystemPromptTable,
        provider_a: Arc<dyn CompletionProvider>,
        provider_b: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            prompts,
            provider_a,
            provider_b,
        }
    }

    /// Wire Gemini as provider A and Groq as provider B.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let gemini = GeminiClient::new(config.gemini.clone())?;
        let groq = GroqClient::new(config.groq.clone())?;
        Ok(Self::new(
            SystemPromptTable::default(),
            Arc::new(gemini),
            Arc::new(groq),
        ))
    }

    pub fn prompts(&self) -> &SystemPromptTable {
        &self.prompts
    }

    fn provider(&self, slot: ProviderSlot) -> &dyn CompletionProvider {
        match slot {
            ProviderSlot::A => self.provider_a.as_ref(),
            ProviderSlot::B => self.provider_b.as_ref(),
        }
    }

    async fn ask(
        &self,
        slot: ProviderSlot,
        system: &str,
        user: &str,
    ) -> Result<(String, String), ProviderError> {
        let provider = self.provider(slot);
        let model = provider.model_label().to_string();
        match provider.complete(system, user).await {
            Ok(reply) => Ok((reply, model)),
            Err(e) => {
                warn!("Provider {:?} ({}, {}) failed: {}", slot, e.provider(), model, e);
                Err(e)
            }
        }
    }

    /// Free-form chat; the mode string picks the prompt and is echoed back.
    pub async fn chat(&self, message: &str, mode: &str) -> Result<CompletionResult, ProviderError> {
        let resolved = Mode::parse(mode);
        info!("chat: requested mode={:?}, resolved={}", mode, resolved);

        let (reply, model) = self
            .ask(CHAT_PROVIDER, self.prompts.get(resolved), message)
            .await?;
        Ok(CompletionResult {
            reply,
            model,
            mode: mode.to_string(),
        })
    }

    pub async fn generate_campaign(&self, message: &str) -> Result<CompletionResult, ProviderError> {
        info!("campaign: message_len={}", message.len());
        let (reply, model) = self
            .ask(CAMPAIGN_PROVIDER, self.prompts.get(Mode::Campaign), message)
            .await?;
        Ok(CompletionResult {
            reply,
            model,
            mode: Mode::Campaign.as_str().to_string(),
        })
    }

    pub async fn generate_pitch(&self, message: &str) -> Result<CompletionResult, ProviderError> {
        info!("pitch: message_len={}", message.len());
        let (reply, model) = self
            .ask(PITCH_PROVIDER, self.prompts.get(Mode::Pitch), message)
            .await?;
        Ok(CompletionResult {
            reply,
            model,
            mode: Mode::Pitch.as_str().to_string(),
        })
    }

    pub async fn score_lead(&self, lead: LeadRequest) -> Result<LeadScoreResult, ProviderError> {
        info!("score-lead: company={:?}, industry={:?}", lead.company, lead.industry);
        let prompt = lead_prompt(
            &lead.company,
            &lead.industry,
            lead.interactions,
            &lead.budget_signal,
        );
        let (reply, model) = self
            .ask(LEADS_PROVIDER, self.prompts.get(Mode::Leads), &prompt)
            .await?;
        Ok(LeadScoreResult { reply, model, lead })
    }

    pub async fn analyze_market(&self, message: &str) -> Result<CompletionResult, ProviderError> {
        info!("analyze-market: message_len={}", message.len());
        let prompt = market_prompt(message);
        let (reply, model) = self
            .ask(MARKET_PROVIDER, self.prompts.get(Mode::Chat), &prompt)
            .await?;
        Ok(CompletionResult {
            reply,
            model,
            mode: MARKET_MODE.to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// In-process provider that records every call.
    pub struct FakeProvider {
        label: &'static str,
        reply: Result<String, String>,
        pub calls: Mutex<Vec<(String, String)>>,
    }

    impl FakeProvider {
        pub fn replying(label: &'static str, reply: &str) -> Arc<Self> {
            Arc::new(Self {
                label,
                reply: Ok(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn failing(label: &'static str, body: &str) -> Arc<Self> {
            Arc::new(Self {
                label,
                reply: Err(body.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        pub fn last_call(&self) -> Option<(String, String)> {
            self.calls.lock().last().cloned()
        }
    }

    #[async_trait]
    impl CompletionProvider for FakeProvider {
        fn model_label(&self) -> &str {
            self.label
        }

        async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
            self.calls.lock().push((system.to_string(), user.to_string()));
            self.reply.clone().map_err(|body| ProviderError::Upstream {
                provider: "fake",
                status: 503,
                body,
            })
        }
    }

    pub fn router_with(a: Arc<FakeProvider>, b: Arc<FakeProvider>) -> PromptRouter {
        PromptRouter::new(SystemPromptTable::default(), a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{router_with, FakeProvider};
    use super::*;

    fn fakes() -> (Arc<FakeProvider>, Arc<FakeProvider>) {
        (
            FakeProvider::replying("provider-a", "reply from a"),
            FakeProvider::replying("provider-b", "reply from b"),
        )
    }

    #[tokio::test]
    async fn test_chat_selects_prompt_by_mode() {
        let table = SystemPromptTable::default();
        for mode in Mode::ALL {
            let (a, b) = fakes();
            let router = router_with(a.clone(), b.clone());

            let result = router.chat("hi", mode.as_str()).await.unwrap();
            assert_eq!(result.mode, mode.as_str());
            assert_eq!(result.model, "provider-a");
            assert_eq!(result.reply, "reply from a");
            assert_eq!(
                a.last_call(),
                Some((table.get(mode).to_string(), "hi".to_string()))
            );
            assert_eq!(b.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_chat_unknown_mode_uses_chat_prompt() {
        let (a, b) = fakes();
        let router = router_with(a.clone(), b);

        let result = router.chat("hi", "poetry").await.unwrap();
        assert_eq!(result.mode, "poetry");
        let (system, _) = a.last_call().unwrap();
        assert_eq!(system, router.prompts().get(Mode::Chat));
    }

    #[tokio::test]
    async fn test_campaign_uses_provider_b() {
        let (a, b) = fakes();
        let router = router_with(a.clone(), b.clone());

        let result = router.generate_campaign("launch eco sneakers").await.unwrap();
        assert_eq!(result.mode, "campaign");
        assert_eq!(result.model, "provider-b");
        assert_eq!(result.reply, "reply from b");
        assert_eq!(a.call_count(), 0);
        assert_eq!(
            b.last_call(),
            Some((
                router.prompts().get(Mode::Campaign).to_string(),
                "launch eco sneakers".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_pitch_uses_provider_a() {
        let (a, b) = fakes();
        let router = router_with(a.clone(), b.clone());

        let result = router.generate_pitch("CFOs at fintechs").await.unwrap();
        assert_eq!(result.mode, "pitch");
        assert_eq!(result.model, "provider-a");
        assert_eq!(b.call_count(), 0);
        let (system, user) = a.last_call().unwrap();
        assert_eq!(system, router.prompts().get(Mode::Pitch));
        assert_eq!(user, "CFOs at fintechs");
    }

    #[tokio::test]
    async fn test_score_lead_echoes_input() {
        let (a, b) = fakes();
        let router = router_with(a.clone(), b.clone());
        let lead = LeadRequest {
            company: "Acme".to_string(),
            industry: "SaaS".to_string(),
            interactions: 5,
            budget_signal: "high".to_string(),
        };

        let result = router.score_lead(lead.clone()).await.unwrap();
        assert_eq!(result.lead, lead);
        assert_eq!(result.model, "provider-b");
        assert_eq!(a.call_count(), 0);

        let (system, user) = b.last_call().unwrap();
        assert_eq!(system, router.prompts().get(Mode::Leads));
        for value in ["Acme", "SaaS", "5", "high"] {
            assert!(user.contains(value), "prompt missing {value}: {user}");
        }
    }

    #[tokio::test]
    async fn test_analyze_market_wraps_message() {
        let (a, b) = fakes();
        let router = router_with(a.clone(), b.clone());

        let result = router.analyze_market("plant-based snacks").await.unwrap();
        assert_eq!(result.mode, "market");
        assert_eq!(result.model, "provider-a");
        assert_eq!(b.call_count(), 0);

        let (system, user) = a.last_call().unwrap();
        assert_eq!(system, router.prompts().get(Mode::Chat));
        assert_eq!(user, market_prompt("plant-based snacks"));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let a = FakeProvider::failing("provider-a", "quota exceeded");
        let b = FakeProvider::failing("provider-b", "bad key");
        let router = router_with(a, b);

        let err = router.chat("hi", "chat").await.unwrap_err();
        assert_eq!(err.to_string(), "fake error 503: quota exceeded");

        let err = router.generate_campaign("x").await.unwrap_err();
        assert_eq!(err.to_string(), "fake error 503: bad key");
    }

    #[test]
    fn test_chat_request_default_mode() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hello"}"#).unwrap();
        assert_eq!(req.mode, "chat");
    }

    #[test]
    fn test_lead_request_lax_interactions() {
        let parse = |interactions: &str| {
            serde_json::from_str::<LeadRequest>(&format!(
                r#"{{"company":"Acme","industry":"SaaS","interactions":{},"budget_signal":"high"}}"#,
                interactions
            ))
        };

        for accepted in ["5", "5.0", r#""5""#, r#"" 5 ""#] {
            assert_eq!(parse(accepted).unwrap().interactions, 5, "{accepted}");
        }
        for rejected in ["5.5", r#""five""#, "null", "[5]"] {
            assert!(parse(rejected).is_err(), "{rejected}");
        }

        let lead = parse(r#""5""#).unwrap();
        assert_eq!(serde_json::to_value(&lead).unwrap()["interactions"], 5);
    }

    #[test]
    fn test_from_config_wires_real_providers() {
        let config = AppConfig::from_lookup(|name| match name {
            "GEMINI_API_KEY" => Some("g".to_string()),
            "GROQ_API_KEY" => Some("q".to_string()),
            _ => None,
        })
        .unwrap();
        let router = PromptRouter::from_config(&config).unwrap();
        assert_eq!(router.provider(ProviderSlot::A).model_label(), "gemini-1.5-flash");
        assert_eq!(router.provider(ProviderSlot::B).model_label(), "groq-llama3");
    }
}
