// src/config/env.rs
// Environment variables read by the analyzer, provider, and server

use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::llm::factory::DEFAULT_TIMEOUT_SECS;
use crate::llm::{Provider, ProviderSettings};

/// Provider credentials; blank values count as unset
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// OpenAI API key (OPENAI_API_KEY)
    pub openai: Option<String>,
    /// Anthropic API key (ANTHROPIC_API_KEY)
    pub anthropic: Option<String>,
}

impl ApiKeys {
    /// `AI_COMMENTS_DISABLE_LLM=1` drops every key, leaving analysis unconfigured
    pub fn from_env() -> Self {
        if parse_bool_env("AI_COMMENTS_DISABLE_LLM").unwrap_or(false) {
            info!("AI_COMMENTS_DISABLE_LLM is set, LLM providers disabled");
            return Self::default();
        }

        let keys = Self {
            openai: read_string(Provider::OpenAi.api_key_env_var()),
            anthropic: read_string(Provider::Anthropic.api_key_env_var()),
        };
        match keys.configured().as_slice() {
            [] => warn!("No provider API key set; change analysis is unavailable"),
            found => debug!(providers = ?found, "Provider API keys found"),
        }
        keys
    }

    pub fn for_provider(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAi => self.openai.as_deref(),
            Provider::Anthropic => self.anthropic.as_deref(),
        }
    }

    /// Providers that have a key, in a fixed order
    pub fn configured(&self) -> Vec<Provider> {
        [Provider::OpenAi, Provider::Anthropic]
            .into_iter()
            .filter(|p| self.for_provider(*p).is_some())
            .collect()
    }

    pub fn has_llm_provider(&self) -> bool {
        !self.configured().is_empty()
    }

    /// Comma-separated provider names, or "none"; never includes key material
    pub fn summary(&self) -> String {
        let names: Vec<String> = self.configured().iter().map(|p| p.to_string()).collect();
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        }
    }
}

/// Problems found while checking configuration; only errors make it invalid
#[derive(Debug, Default)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ConfigValidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// One line per finding, errors first
    pub fn report(&self) -> String {
        if self.errors.is_empty() && self.warnings.is_empty() {
            return "config: ok".to_string();
        }
        self.errors
            .iter()
            .map(|e| format!("error: {}", e))
            .chain(self.warnings.iter().map(|w| format!("warning: {}", w)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Values read from the process environment; `None` means unset
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub api_keys: ApiKeys,
    /// Provider selection (LLM_PROVIDER)
    pub provider: Option<String>,
    /// Model override (AI_COMMENTS_MODEL)
    pub model: Option<String>,
    /// API root override (AI_COMMENTS_BASE_URL)
    pub base_url: Option<String>,
    /// Completion budget (AI_COMMENTS_MAX_TOKENS)
    pub max_tokens: Option<u32>,
    /// Sampling temperature (AI_COMMENTS_TEMPERATURE)
    pub temperature: Option<f32>,
    /// HTTP request timeout in seconds (AI_COMMENTS_TIMEOUT_SECS)
    pub timeout_secs: Option<u64>,
}

impl EnvConfig {
    /// Read every variable once; call after `dotenvy` has run
    pub fn load() -> Self {
        debug!("Reading environment configuration");

        Self {
            api_keys: ApiKeys::from_env(),
            provider: read_string("LLM_PROVIDER"),
            model: read_string("AI_COMMENTS_MODEL"),
            base_url: read_string("AI_COMMENTS_BASE_URL"),
            max_tokens: parse_env("AI_COMMENTS_MAX_TOKENS"),
            temperature: parse_env("AI_COMMENTS_TEMPERATURE"),
            timeout_secs: parse_env("AI_COMMENTS_TIMEOUT_SECS"),
        }
    }

    /// Selected provider, or OpenAI when unset or unrecognized
    pub fn provider(&self) -> Provider {
        self.provider
            .as_deref()
            .and_then(Provider::from_str)
            .unwrap_or(Provider::OpenAi)
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        let provider = self.provider();
        ProviderSettings {
            provider,
            api_key: self.api_keys.for_provider(provider).map(str::to_string),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::new();

        if let Some(ref raw) = self.provider {
            if Provider::from_str(raw).is_none() {
                validation.add_warning(format!(
                    "Unknown LLM_PROVIDER '{}'. Valid options: openai, anthropic",
                    raw
                ));
            }
        }

        let provider = self.provider();
        if self.api_keys.for_provider(provider).is_none() {
            validation.add_warning(format!(
                "No API key for provider \"{}\". Set {} to enable analysis.",
                provider,
                provider.api_key_env_var()
            ));
        }

        if let Some(ref base_url) = self.base_url {
            match url::Url::parse(base_url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => validation.add_error(format!(
                    "AI_COMMENTS_BASE_URL must use http or https, got '{}'",
                    parsed.scheme()
                )),
                Err(e) => validation.add_error(format!("Invalid AI_COMMENTS_BASE_URL: {}", e)),
            }
        }

        if self.max_tokens == Some(0) {
            validation.add_error("AI_COMMENTS_MAX_TOKENS must be greater than zero");
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                validation.add_error(format!("AI_COMMENTS_TEMPERATURE must be within [0, 2], got {}", t));
            }
        }
        if self.timeout_secs == Some(0) {
            validation.add_error("AI_COMMENTS_TIMEOUT_SECS must be greater than zero");
        }

        validation
    }
}

fn read_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    let raw = read_string(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(var = name, value = %raw, "Ignoring unparseable environment value");
            None
        }
    }
}

fn parse_bool_env(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?.to_lowercase();
    match value.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_openai_key() -> EnvConfig {
        EnvConfig {
            api_keys: ApiKeys {
                openai: Some("sk-test".to_string()),
                anthropic: None,
            },
            ..EnvConfig::default()
        }
    }

    #[test]
    fn test_api_keys_summary() {
        let keys = ApiKeys::default();
        assert!(!keys.has_llm_provider());
        assert_eq!(keys.summary(), "none");

        let keys = ApiKeys {
            openai: None,
            anthropic: Some("sk-ant".to_string()),
        };
        assert!(keys.has_llm_provider());
        assert_eq!(keys.summary(), "anthropic");
        assert_eq!(keys.configured(), vec![Provider::Anthropic]);
        assert_eq!(keys.for_provider(Provider::Anthropic), Some("sk-ant"));
        assert_eq!(keys.for_provider(Provider::OpenAi), None);
    }

    #[test]
    fn test_provider_defaults_to_openai() {
        assert_eq!(EnvConfig::default().provider(), Provider::OpenAi);

        let config = EnvConfig {
            provider: Some("Claude".to_string()),
            ..EnvConfig::default()
        };
        assert_eq!(config.provider(), Provider::Anthropic);

        let config = EnvConfig {
            provider: Some("mistral".to_string()),
            ..EnvConfig::default()
        };
        assert_eq!(config.provider(), Provider::OpenAi);
        assert_eq!(config.validate().warnings.len(), 2);
    }

    #[test]
    fn test_provider_settings_picks_matching_key() {
        let config = EnvConfig {
            model: Some("gpt-4o-mini".to_string()),
            timeout_secs: Some(15),
            ..with_openai_key()
        };
        let settings = config.provider_settings();
        assert_eq!(settings.provider, Provider::OpenAi);
        assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.model(), "gpt-4o-mini");
        assert_eq!(settings.timeout, Duration::from_secs(15));

        let config = EnvConfig {
            provider: Some("anthropic".to_string()),
            ..with_openai_key()
        };
        assert!(!config.provider_settings().is_configured());
    }

    #[test]
    fn test_validation_ok() {
        let validation = with_openai_key().validate();
        assert!(validation.is_valid());
        assert!(validation.warnings.is_empty());
        assert_eq!(validation.report(), "config: ok");
    }

    #[test]
    fn test_validation_no_keys_is_warning_only() {
        let validation = EnvConfig::default().validate();
        assert!(validation.is_valid());
        assert!(validation.warnings[0].contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_validation_errors() {
        let config = EnvConfig {
            base_url: Some("not a url".to_string()),
            max_tokens: Some(0),
            temperature: Some(3.5),
            ..with_openai_key()
        };
        let validation = config.validate();
        assert!(!validation.is_valid());
        assert_eq!(validation.errors.len(), 3);
        let report = validation.report();
        assert!(report.starts_with("error: "));
        assert_eq!(report.lines().count(), 3);

        let config = EnvConfig {
            base_url: Some("ftp://proxy.internal/v1".to_string()),
            ..with_openai_key()
        };
        assert!(config.validate().errors[0].contains("http or https"));
    }
}
