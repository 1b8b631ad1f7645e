// src/config/mod.rs
// Configuration layers: environment, config file, and the resolved settings

pub mod env;
pub mod file;

pub use env::{ApiKeys, ConfigValidation, EnvConfig};
pub use file::FileConfig;

use crate::analyzer::{AnalyzerConfig, BatchOptions};
use crate::llm::ProviderSettings;

/// Environment layered over the config file; env values win
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub env: EnvConfig,
    pub file: FileConfig,
}

impl Settings {
    /// Load both layers (call once at startup, after dotenvy)
    pub fn load() -> Self {
        Self {
            env: EnvConfig::load(),
            file: FileConfig::load(),
        }
    }

    /// Environment with `[llm]` file values filling unset provider and model
    fn merged_env(&self) -> EnvConfig {
        let mut env = self.env.clone();
        if env.provider.is_none() {
            env.provider = self.file.llm.provider.clone();
        }
        if env.model.is_none() {
            env.model = self.file.llm.model.clone();
        }
        env
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        self.merged_env().provider_settings()
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        let defaults = AnalyzerConfig::default();
        let analyzer = &self.file.analyzer;
        AnalyzerConfig {
            max_tokens: self
                .env
                .max_tokens
                .or(analyzer.max_tokens)
                .unwrap_or(defaults.max_tokens),
            temperature: self
                .env
                .temperature
                .or(analyzer.temperature)
                .unwrap_or(defaults.temperature),
            weights: self.file.scoring.weights.unwrap_or(defaults.weights),
            include_raw_response: analyzer
                .include_raw_response
                .unwrap_or(defaults.include_raw_response),
            ..defaults
        }
    }

    /// Batch defaults from `[analyzer]`; CLI flags override these
    pub fn batch_options(&self) -> BatchOptions {
        let mut options = BatchOptions::default();
        if let Some(parallel) = self.file.analyzer.parallel {
            options.parallel = parallel;
        }
        if let Some(concurrency) = self.file.analyzer.concurrency {
            options = options.concurrency(concurrency);
        }
        options
    }

    pub fn validate(&self) -> ConfigValidation {
        let mut validation = self.merged_env().validate();

        if let Some(weights) = self.file.scoring.weights {
            let invalid = weights.invalid_metrics();
            if !invalid.is_empty() {
                let names: Vec<String> = invalid.iter().map(|m| m.to_string()).collect();
                validation.add_error(format!(
                    "Scoring weights must be positive: {}",
                    names.join(", ")
                ));
            }
        }
        if self.file.analyzer.concurrency == Some(0) {
            validation.add_warning("analyzer.concurrency = 0 is treated as 1");
        }

        validation
    }
}
