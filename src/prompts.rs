//! Modes and System Prompts
//!
//! A [`Mode`] selects one fixed instruction string from the
//! [`SystemPromptTable`]. The table is built once and shared read-only.

use std::fmt;

/// Request intent selecting a system prompt template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Chat,
    Campaign,
    Pitch,
    Leads,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Chat, Mode::Campaign, Mode::Pitch, Mode::Leads];

    /// Resolve a mode name. Unknown names fall back to [`Mode::Chat`].
    pub fn parse(name: &str) -> Self {
        match name {
            "chat" => Self::Chat,
            "campaign" => Self::Campaign,
            "pitch" => Self::Pitch,
            "leads" => Self::Leads,
            _ => Self::Chat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Campaign => "campaign",
            Self::Pitch => "pitch",
            Self::Leads => "leads",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const CHAT_PROMPT: &str = "You are MarketMind, an expert Generative AI assistant for sales and marketing teams.
You help with campaigns, lead insights, sales pitches, and market analysis.
Be concise, actionable, and data-driven. Use emojis sparingly for readability.";

const CAMPAIGN_PROMPT: &str = "You are MarketMind's Campaign Generator.
Generate a complete marketing campaign including:
- A catchy campaign name & tagline
- Email subject line and short body
- One LinkedIn post
- One Twitter/X post
- Expected KPIs (reach, CTR estimate)
Be specific, creative, and conversion-focused.";

const PITCH_PROMPT: &str = "You are MarketMind's Sales Pitch Writer.
Create a personalized, compelling sales pitch tailored to the audience described.
Include: hook, pain point, solution, proof/ROI, and a clear call to action.
Keep it under 200 words. Professional but human.";

const LEADS_PROMPT: &str = "You are MarketMind's Lead Intelligence Engine.
Analyze the lead details provided and return:
- A lead score out of 100
- Priority level (HOT / WARM / COLD)
- 3 specific recommended next actions
- Estimated deal close probability %
Be analytical and direct.";

/// Immutable mode -> instruction mapping.
#[derive(Debug, Clone)]
pub struct SystemPromptTable {
    chat: String,
    campaign: String,
    pitch: String,
    leads: String,
}

impl Default for SystemPromptTable {
    fn default() -> Self {
        Self {
            chat: CHAT_PROMPT.to_string(),
            campaign: CAMPAIGN_PROMPT.to_string(),
            pitch: PITCH_PROMPT.to_string(),
            leads: LEADS_PROMPT.to_string(),
        }
    }
}

impl SystemPromptTable {
    pub fn get(&self, mode: Mode) -> &str {
        match mode {
            Mode::Chat => &self.chat,
            Mode::Campaign => &self.campaign,
            Mode::Pitch => &self.pitch,
            Mode::Leads => &self.leads,
        }
    }
}

/// Fixed-layout lead block sent to the lead scorer.
pub fn lead_prompt(company: &str, industry: &str, interactions: i64, budget_signal: &str) -> String {
    format!(
        "Lead Details:\n\
         - Company: {company}\n\
         - Industry: {industry}\n\
         - Interactions this week: {interactions}\n\
         - Budget signal: {budget_signal}\n\
         Analyze and score this lead."
    )
}

pub fn market_prompt(message: &str) -> String {
    format!(
        "Provide a market analysis for: {message}. Include trends, opportunities, and competitor landscape."
    )
}
