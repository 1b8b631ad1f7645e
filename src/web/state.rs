// src/web/state.rs
// Web server state management

use std::sync::Arc;
use tracing::warn;

use crate::analyzer::{BatchOptions, ChangeAnalyzer};
use crate::config::Settings;
use crate::llm::{Provider, ProviderFactory, ProviderSettings};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Present only when the selected provider has an API key
    pub analyzer: Option<Arc<ChangeAnalyzer>>,
    pub provider: Provider,
    pub model: String,
    /// Batch defaults applied when a request does not override them
    pub batch: BatchOptions,
}

impl AppState {
    pub fn configured(analyzer: ChangeAnalyzer, batch: BatchOptions) -> Self {
        Self {
            provider: analyzer.provider_type(),
            model: analyzer.model_name(),
            analyzer: Some(Arc::new(analyzer)),
            batch,
        }
    }

    pub fn unconfigured(settings: &ProviderSettings) -> Self {
        Self {
            analyzer: None,
            provider: settings.provider,
            model: settings.model(),
            batch: BatchOptions::default(),
        }
    }

    /// Build state from resolved settings; a missing key leaves analysis disabled
    pub fn from_settings(settings: &Settings) -> Self {
        let provider_settings = settings.provider_settings();
        match ProviderFactory::create(&provider_settings) {
            Ok(provider) => Self::configured(
                ChangeAnalyzer::new(provider, settings.analyzer_config()),
                settings.batch_options(),
            ),
            Err(e) => {
                warn!(error = %e, "Analysis endpoints will report not_configured");
                Self::unconfigured(&provider_settings)
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.analyzer.is_some()
    }
}
