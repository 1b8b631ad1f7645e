// src/lib.rs
// ai-comments - AI review of visual-editor DOM changes

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod analyzer;
pub mod confidence;
pub mod config;
pub mod error;
pub mod llm;
pub mod parser;
pub mod prompt;
pub mod scoring;
pub mod streaming;
pub mod types;
pub mod web;

pub use analyzer::{AnalysisStreamEvent, AnalyzerConfig, BatchOptions, ChangeAnalyzer};
pub use error::{AnalyzerError, Result};
pub use llm::{LlmProvider, Provider, ProviderFactory};
pub use scoring::{ScoringEngine, ScoringWeights};
pub use types::*;
