//! LLM configuration and provider selection.
//!
//! Read once at startup. A run cannot start without a credential for the
//! selected provider.

use tracing::info;

use paperlens_core::{Error, Result};

use crate::types::{LLMProvider, ModelStatus};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// Extraction must be reproducible.
pub const DEFAULT_TEMPERATURE: f64 = 0.0;
pub const DEFAULT_MAX_TOKENS: usize = 8192;

/// Model credentials and parameters.
#[derive(Debug, Clone)]
pub struct LLMConfig {
    /// `auto` or a provider name.
    pub preferred_provider: String,
    pub google_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    /// Overrides the provider's default model.
    pub model: Option<String>,
    pub temperature: f64,
    pub max_tokens: usize,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            preferred_provider: "auto".into(),
            google_api_key: None,
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// The provider, model and key a run will use.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    pub provider: LLMProvider,
    pub model: String,
    pub api_key: String,
}

impl LLMConfig {
    /// Load from process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            preferred_provider: get("PAPERLENS_PROVIDER").unwrap_or_else(|| "auto".into()),
            google_api_key: get("GOOGLE_API_KEY"),
            openai_api_key: get("OPENAI_API_KEY"),
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            groq_api_key: get("GROQ_API_KEY"),
            model: get("PAPERLENS_MODEL"),
            ..Self::default()
        }
    }

    fn key_for(&self, provider: LLMProvider) -> Option<&String> {
        match provider {
            LLMProvider::Gemini => self.google_api_key.as_ref(),
            LLMProvider::OpenAI => self.openai_api_key.as_ref(),
            LLMProvider::Anthropic => self.anthropic_api_key.as_ref(),
            LLMProvider::Groq => self.groq_api_key.as_ref(),
        }
    }

    fn model_for(&self, provider: LLMProvider) -> String {
        if let Some(m) = &self.model {
            return m.clone();
        }
        match provider {
            LLMProvider::Gemini => DEFAULT_GEMINI_MODEL,
            LLMProvider::OpenAI => DEFAULT_OPENAI_MODEL,
            LLMProvider::Anthropic => DEFAULT_ANTHROPIC_MODEL,
            LLMProvider::Groq => DEFAULT_GROQ_MODEL,
        }
        .to_string()
    }

    /// Resolve which provider and model to use.
    pub fn resolve_provider(&self) -> Option<ResolvedModel> {
        let resolve = |provider: LLMProvider| {
            self.key_for(provider).map(|k| ResolvedModel {
                provider,
                model: self.model_for(provider),
                api_key: k.clone(),
            })
        };

        // Explicit preference
        if self.preferred_provider != "auto" {
            return LLMProvider::parse(&self.preferred_provider).and_then(resolve);
        }

        // Auto mode: Gemini > Anthropic > Groq > OpenAI
        [
            LLMProvider::Gemini,
            LLMProvider::Anthropic,
            LLMProvider::Groq,
            LLMProvider::OpenAI,
        ]
        .into_iter()
        .find_map(resolve)
    }

    /// Like [`resolve_provider`](Self::resolve_provider), but a missing
    /// credential is a configuration error.
    pub fn require_provider(&self) -> Result<ResolvedModel> {
        if self.preferred_provider != "auto" && LLMProvider::parse(&self.preferred_provider).is_none() {
            return Err(Error::Config(format!(
                "unknown provider {:?} (expected auto, gemini, openai, anthropic or groq)",
                self.preferred_provider
            )));
        }
        let resolved = self.resolve_provider().ok_or_else(|| {
            Error::Config(
                "no model API key found; set GOOGLE_API_KEY (or OPENAI_API_KEY, ANTHROPIC_API_KEY, GROQ_API_KEY), e.g. in a .env file".into(),
            )
        })?;
        info!("Using {} model {}", resolved.provider, resolved.model);
        Ok(resolved)
    }

    /// Build the public status view (no API keys exposed).
    pub fn to_status(&self) -> ModelStatus {
        let resolved = self.resolve_provider();
        ModelStatus {
            preferred_provider: self.preferred_provider.clone(),
            active_provider: resolved.as_ref().map(|r| r.provider.to_string()),
            model: resolved.map(|r| r.model),
            temperature: self.temperature,
            gemini_configured: self.google_api_key.is_some(),
            openai_configured: self.openai_api_key.is_some(),
            anthropic_configured: self.anthropic_api_key.is_some(),
            groq_configured: self.groq_api_key.is_some(),
        }
    }
}
