//! Catalogue of AI providers and their models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Provider the service routes a batch to.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// OpenAI chat models
    #[default]
    #[serde(rename = "chatgpt")]
    ChatGpt,
    /// DeepSeek models
    #[serde(rename = "deepseek")]
    DeepSeek,
    /// Anthropic Sonnet models
    Sonnet,
}

impl AiProvider {
    /// All providers the service knows.
    pub const ALL: [AiProvider; 3] = [AiProvider::ChatGpt, AiProvider::DeepSeek, AiProvider::Sonnet];

    /// Wire key sent as `ai_model`.
    pub fn as_str(self) -> &'static str {
        match self {
            AiProvider::ChatGpt => "chatgpt",
            AiProvider::DeepSeek => "deepseek",
            AiProvider::Sonnet => "sonnet",
        }
    }

    /// Models offered for this provider, default first.
    pub fn models(self) -> &'static [&'static str] {
        match self {
            AiProvider::ChatGpt => &["gpt-4o-mini", "gpt-4o", "gpt-4-turbo"],
            AiProvider::DeepSeek => &["deepseek-chat", "deepseek-coder"],
            AiProvider::Sonnet => &["claude-3-5-sonnet-20241022", "claude-3-sonnet-20240229"],
        }
    }

    /// The model picked when none (or an unknown one) is chosen.
    pub fn default_model(self) -> &'static str {
        self.models()[0]
    }

    /// Whether `model` belongs to this provider.
    pub fn supports(self, model: &str) -> bool {
        self.models().contains(&model)
    }

    /// Parse a provider key, falling back to ChatGPT for anything unknown.
    pub fn from_key_or_default(key: &str) -> Self {
        key.parse().unwrap_or_default()
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProvider {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AiProvider::ALL
            .into_iter()
            .find(|provider| provider.as_str() == s.trim())
            .ok_or_else(|| crate::error::Error::InvalidRequest(format!("Unknown AI provider '{}'", s)))
    }
}

/// A provider and one of its models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelection {
    /// Provider
    pub provider: AiProvider,
    /// Model name, always one of `provider.models()`
    pub model: String,
}

impl ModelSelection {
    /// Select `model` for `provider`, using the provider default if the model
    /// is not offered by that provider.
    pub fn new(provider: AiProvider, model: &str) -> Self {
        let model = if provider.supports(model) {
            model
        } else {
            provider.default_model()
        };
        Self {
            provider,
            model: model.to_string(),
        }
    }

    /// Selection from raw keys; unknown providers fall back to ChatGPT.
    pub fn from_keys(provider: &str, model: &str) -> Self {
        Self::new(AiProvider::from_key_or_default(provider), model)
    }
}

impl Default for ModelSelection {
    fn default() -> Self {
        let provider = AiProvider::default();
        Self::new(provider, provider.default_model())
    }
}
