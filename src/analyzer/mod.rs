// src/analyzer/mod.rs
// Change analysis: single-item pipeline and batch streaming

pub mod events;

use futures::{Stream, StreamExt};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::confidence::{ConfidenceFactors, average_model_confidence, calculate_confidence};
use crate::error::{AnalyzerError, Result};
use crate::llm::provider::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::llm::{CompletionRequest, LlmProvider, Provider};
use crate::parser::parse_analysis;
use crate::prompt::{PromptBuilder, PromptContext, estimate_change_complexity, estimate_context_quality};
use crate::scoring::{ScoringEngine, ScoringWeights};
use crate::types::{AnalysisContext, AnalysisResult, ChangeInput};

pub use events::AnalysisStreamEvent;

pub const DEFAULT_CONCURRENCY: usize = 3;

/// Tunables for every analysis run by one analyzer
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    pub weights: ScoringWeights,
    /// Keep the model's raw text on each result
    pub include_raw_response: bool,
    pub prompts: PromptBuilder,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            weights: ScoringWeights::default(),
            include_raw_response: true,
            prompts: PromptBuilder::new(),
        }
    }
}

pub type ProgressCallback = Arc<dyn Fn(&AnalysisStreamEvent) + Send + Sync>;

/// How a batch is scheduled
#[derive(Clone)]
pub struct BatchOptions {
    pub parallel: bool,
    /// Window size in parallel mode, at least 1
    pub concurrency: usize,
    /// Called with a `Progress` event after each successful item
    pub on_progress: Option<ProgressCallback>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            concurrency: DEFAULT_CONCURRENCY,
            on_progress: None,
        }
    }
}

impl BatchOptions {
    pub fn sequential() -> Self {
        Self::default()
    }

    pub fn parallel(concurrency: usize) -> Self {
        Self {
            parallel: true,
            ..Self::default()
        }
        .concurrency(concurrency)
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&AnalysisStreamEvent) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for BatchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchOptions")
            .field("parallel", &self.parallel)
            .field("concurrency", &self.concurrency)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

fn fraction(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 1.0;
    }
    completed as f64 / total as f64
}

/// Runs the prompt, provider, parse, score, and confidence pipeline
#[derive(Clone)]
pub struct ChangeAnalyzer {
    provider: Arc<dyn LlmProvider>,
    config: AnalyzerConfig,
    scoring: ScoringEngine,
}

impl ChangeAnalyzer {
    pub fn new(provider: Arc<dyn LlmProvider>, config: AnalyzerConfig) -> Self {
        let scoring = ScoringEngine::new(config.weights);
        Self {
            provider,
            config,
            scoring,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    pub fn provider_type(&self) -> Provider {
        self.provider.provider_type()
    }

    /// Label recorded on each result
    pub fn provider_name(&self) -> String {
        self.provider.provider_type().to_string()
    }

    pub fn model_name(&self) -> String {
        self.provider.model_name()
    }

    /// Analyze one change. Fails only when the provider call fails.
    #[instrument(skip_all, fields(change_id = %change.id, provider = %self.provider.provider_type()))]
    pub async fn analyze(&self, change: &ChangeInput, context: &AnalysisContext) -> Result<AnalysisResult> {
        if change.id.trim().is_empty() {
            return Err(AnalyzerError::InvalidInput("change id must not be empty".into()));
        }

        let started = Instant::now();
        let timestamp = chrono::Utc::now().timestamp_millis();

        let prompt_ctx = PromptContext::build(change, context);
        let request = CompletionRequest::new(self.config.prompts.build_messages(&prompt_ctx))
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .json_mode(true);

        let response = self.provider.complete(request).await?;

        let parsed = parse_analysis(&response.content);
        let mut data = parsed.data;
        data.pr_score = self.scoring.validate_and_recalculate(data.pr_score);

        let token_usage_ratio = (self.config.max_tokens > 0)
            .then(|| response.usage.total_tokens as f64 / self.config.max_tokens as f64);
        let confidence = calculate_confidence(&ConfidenceFactors {
            context_available: estimate_context_quality(context),
            change_complexity: estimate_change_complexity(change),
            model_confidence: average_model_confidence(&data),
            schema_validation: parsed.tier.factor(),
            token_usage_ratio,
        });

        info!(
            tier = ?parsed.tier,
            tokens = response.usage.total_tokens,
            duration_ms = started.elapsed().as_millis() as u64,
            confidence,
            overall = data.pr_score.overall,
            "Change analyzed"
        );

        Ok(AnalysisResult {
            id: Uuid::new_v4().to_string(),
            change_id: change.id.clone(),
            timestamp,
            affected_components: data.affected_components,
            risks: data.risks,
            suggestions: data.suggestions,
            style_consistency: data.style_consistency,
            pr_score: data.pr_score,
            confidence,
            provider: self.provider_name(),
            tokens_used: response.usage.total_tokens,
            raw_response: self.config.include_raw_response.then_some(response.content),
        })
    }

    /// Lazily analyze a batch, yielding `start`, per-item events, then `complete`.
    ///
    /// Nothing runs until the stream is polled; dropping it stops further items.
    pub fn analyze_stream(
        &self,
        changes: Vec<ChangeInput>,
        context: AnalysisContext,
        options: BatchOptions,
    ) -> impl Stream<Item = AnalysisStreamEvent> + Send + 'static {
        let analyzer = self.clone();

        async_stream::stream! {
            let total = changes.len();
            let mut completed = 0usize;
            info!(total, parallel = options.parallel, concurrency = options.concurrency, "Batch analysis started");

            yield AnalysisStreamEvent::Start {
                total_changes: total,
                completed_changes: 0,
            };

            let notify = |change_id: &str, completed: usize| {
                if let Some(callback) = &options.on_progress {
                    callback(&AnalysisStreamEvent::Progress {
                        change_id: change_id.to_string(),
                        progress: fraction(completed, total),
                        total_changes: total,
                        completed_changes: completed,
                    });
                }
            };

            if options.parallel {
                for window in changes.chunks(options.concurrency.max(1)) {
                    debug!(size = window.len(), "Analyzing window");
                    let outcomes = futures::future::join_all(
                        window.iter().map(|change| analyzer.analyze(change, &context)),
                    )
                    .await;

                    for (change, outcome) in window.iter().zip(outcomes) {
                        match outcome {
                            Ok(result) => {
                                completed += 1;
                                notify(&change.id, completed);
                                yield AnalysisStreamEvent::Result {
                                    change_id: change.id.clone(),
                                    result: Box::new(result),
                                    progress: fraction(completed, total),
                                    total_changes: total,
                                    completed_changes: completed,
                                };
                            }
                            Err(e) => {
                                warn!(change_id = %change.id, error = %e, "Change analysis failed");
                                yield AnalysisStreamEvent::Error {
                                    change_id: Some(change.id.clone()),
                                    error: e.to_string(),
                                    total_changes: total,
                                    completed_changes: completed,
                                };
                            }
                        }
                    }
                }
            } else {
                for change in &changes {
                    yield AnalysisStreamEvent::Progress {
                        change_id: change.id.clone(),
                        progress: fraction(completed, total),
                        total_changes: total,
                        completed_changes: completed,
                    };

                    match analyzer.analyze(change, &context).await {
                        Ok(result) => {
                            completed += 1;
                            notify(&change.id, completed);
                            yield AnalysisStreamEvent::Result {
                                change_id: change.id.clone(),
                                result: Box::new(result),
                                progress: fraction(completed, total),
                                total_changes: total,
                                completed_changes: completed,
                            };
                        }
                        Err(e) => {
                            warn!(change_id = %change.id, error = %e, "Change analysis failed");
                            yield AnalysisStreamEvent::Error {
                                change_id: Some(change.id.clone()),
                                error: e.to_string(),
                                total_changes: total,
                                completed_changes: completed,
                            };
                        }
                    }
                }
            }

            info!(total, completed, failed = total - completed, "Batch analysis complete");
            yield AnalysisStreamEvent::Complete {
                total_changes: total,
                completed_changes: completed,
            };
        }
    }

    /// Drain a batch and keep the successful results in input order
    pub async fn analyze_all(
        &self,
        changes: Vec<ChangeInput>,
        context: AnalysisContext,
        options: BatchOptions,
    ) -> Vec<AnalysisResult> {
        self.analyze_stream(changes, context, options)
            .filter_map(|event| async move { event.into_result() })
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests;
