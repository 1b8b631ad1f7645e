// src/config/file.rs
// File-based configuration from ~/.ai-comments/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::llm::Provider;
use crate::scoring::ScoringWeights;

/// Top-level config structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub analyzer: AnalyzerSection,
    #[serde(default)]
    pub scoring: ScoringSection,
}

/// `[llm]` - used when the matching env var is not set
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct LlmSection {
    pub provider: Option<String>,
    pub model: Option<String>,
}

/// `[analyzer]`
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct AnalyzerSection {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub parallel: Option<bool>,
    pub concurrency: Option<usize>,
    pub include_raw_response: Option<bool>,
}

/// `[scoring]`; `[scoring.weights]` may list only the weights it overrides
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ScoringSection {
    pub weights: Option<ScoringWeights>,
}

impl FileConfig {
    /// Load config from ~/.ai-comments/config.toml
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path; missing or malformed files yield defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ai-comments")
            .join("config.toml")
    }

    pub fn provider(&self) -> Option<Provider> {
        self.llm.provider.as_deref().and_then(Provider::from_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[llm]
provider = "anthropic"

[analyzer]
max_tokens = 3000
parallel = true
concurrency = 5

[scoring.weights]
cascade_risk = 2.0
"#;
        let config: FileConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.provider(), Some(Provider::Anthropic));
        assert_eq!(config.analyzer.max_tokens, Some(3000));
        assert_eq!(config.analyzer.parallel, Some(true));
        assert_eq!(config.analyzer.concurrency, Some(5));
        assert!(config.analyzer.temperature.is_none());

        let weights = config.scoring.weights.unwrap();
        assert_eq!(weights.cascade_risk, 2.0);
        assert_eq!(weights.code_consistency, ScoringWeights::default().code_consistency);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.provider(), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analyzer]\ninclude_raw_response = false").unwrap();

        let config = FileConfig::load_from(file.path());
        assert_eq!(config.analyzer.include_raw_response, Some(false));
    }

    #[test]
    fn test_load_missing_or_invalid_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(FileConfig::load_from(&dir.path().join("absent.toml")), FileConfig::default());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[analyzer\nmax_tokens = ").unwrap();
        assert_eq!(FileConfig::load_from(&bad), FileConfig::default());
    }

    #[test]
    fn test_config_path_under_home() {
        let path = FileConfig::config_path();
        assert!(path.ends_with(".ai-comments/config.toml"));
    }
}
