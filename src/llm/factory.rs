// src/llm/factory.rs
// Build a provider client from resolved settings

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::anthropic::AnthropicClient;
use super::openai::OpenAiClient;
use super::provider::{LlmProvider, Provider};
use crate::config::EnvConfig;
use crate::error::{AnalyzerError, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Everything needed to construct one provider client
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl ProviderSettings {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            api_key: None,
            model: None,
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Configured model or the provider default
    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a client; fails when no API key is available
    pub fn create(settings: &ProviderSettings) -> Result<Arc<dyn LlmProvider>> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AnalyzerError::Config(format!(
                    "API key not found for provider \"{}\". Please set {} environment variable.",
                    settings.provider,
                    settings.provider.api_key_env_var()
                ))
            })?;

        let model = settings.model();
        info!(provider = %settings.provider, model = %model, "LLM provider initialized");

        let client: Arc<dyn LlmProvider> = match settings.provider {
            Provider::OpenAi => Arc::new(OpenAiClient::new(
                api_key,
                model,
                settings.base_url.clone(),
                settings.timeout,
            )),
            Provider::Anthropic => Arc::new(AnthropicClient::new(
                api_key,
                model,
                settings.base_url.clone(),
                settings.timeout,
            )),
        };
        Ok(client)
    }

    /// Create the client selected by the environment
    pub fn from_env(env: &EnvConfig) -> Result<Arc<dyn LlmProvider>> {
        Self::create(&env.provider_settings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_names_env_var() {
        let settings = ProviderSettings::new(Provider::Anthropic);
        let err = ProviderFactory::create(&settings).err().unwrap();
        assert!(matches!(err, AnalyzerError::Config(_)));
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_blank_key_is_missing() {
        let settings = ProviderSettings {
            api_key: Some("   ".into()),
            ..ProviderSettings::new(Provider::OpenAi)
        };
        assert!(!settings.is_configured());
        assert!(ProviderFactory::create(&settings).is_err());
    }

    #[test]
    fn test_create_uses_default_model() {
        let settings = ProviderSettings {
            api_key: Some("sk-test".into()),
            ..ProviderSettings::new(Provider::OpenAi)
        };
        let client = ProviderFactory::create(&settings).unwrap();
        assert_eq!(client.provider_type(), Provider::OpenAi);
        assert_eq!(client.model_name(), "gpt-4o");
    }

    #[test]
    fn test_create_with_model_override() {
        let settings = ProviderSettings {
            api_key: Some("sk-ant".into()),
            model: Some("claude-3-5-haiku-latest".into()),
            ..ProviderSettings::new(Provider::Anthropic)
        };
        let client = ProviderFactory::create(&settings).unwrap();
        assert_eq!(client.provider_type(), Provider::Anthropic);
        assert_eq!(client.model_name(), "claude-3-5-haiku-latest");
    }
}
