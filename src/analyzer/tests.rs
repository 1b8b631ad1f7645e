// src/analyzer/tests.rs
// Analyzer pipeline and batch streaming tests

use super::*;
use crate::confidence::{ConfidenceFactors, average_model_confidence, calculate_confidence};
use crate::llm::{CompletionResponse, FinishReason, NormalizedUsage};
use crate::types::{ChangeState, ChangeType};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns a fixed body; fails any change whose selector is `.fail`
struct ScriptedProvider {
    body: String,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            body: body.into(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = request.messages.last().map(|m| m.content.as_str()).unwrap_or_default();
        if prompt.contains("`.fail`") {
            return Err(AnalyzerError::Provider("upstream returned 503".into()));
        }
        Ok(CompletionResponse {
            content: self.body.clone(),
            usage: NormalizedUsage::new(600, 400),
            model: "scripted".into(),
            finish_reason: FinishReason::Stop,
        })
    }

    fn provider_type(&self) -> Provider {
        Provider::OpenAi
    }

    fn model_name(&self) -> String {
        "scripted".into()
    }
}

fn payload(overall: f64) -> String {
    json!({
        "affectedComponents": [],
        "risks": [],
        "suggestions": [],
        "styleConsistency": {
            "overallConsistency": 80,
            "designSystemAlignment": 80,
            "colorConsistency": 80,
            "spacingConsistency": 80,
            "typographyConsistency": 80,
            "issues": [],
            "confidence": 0.8
        },
        "prScore": {
            "overall": overall,
            "breakdown": {
                "codeConsistency": 80,
                "reuseScore": 70,
                "aiDetectionRisk": 20,
                "cascadeRisk": 40,
                "responsiveScore": 85,
                "semanticScore": 90,
                "intentAlignment": 80
            },
            "flags": [],
            "summary": "Solid change",
            "wouldApprove": true,
            "confidence": 0.6
        }
    })
    .to_string()
}

fn change(id: &str, selector: &str) -> ChangeInput {
    ChangeInput {
        id: id.into(),
        change_type: ChangeType::Text,
        element_tag: "button".into(),
        xpath: "/html/body/button".into(),
        selector: selector.into(),
        original: ChangeState::text("Buy"),
        modified: ChangeState::text("Buy now"),
    }
}

fn batch() -> Vec<ChangeInput> {
    vec![change("c1", ".ok"), change("c2", ".fail"), change("c3", ".ok")]
}

fn context() -> AnalysisContext {
    AnalysisContext::new("https://shop.example.com/cart")
}

fn analyzer(provider: Arc<ScriptedProvider>) -> ChangeAnalyzer {
    ChangeAnalyzer::new(provider, AnalyzerConfig::default())
}

fn kinds(events: &[AnalysisStreamEvent]) -> Vec<&'static str> {
    events.iter().map(|e| e.kind()).collect()
}

// ============================================================================
// Single analysis
// ============================================================================

#[tokio::test]
async fn test_analyze_recalculates_detached_overall() {
    let provider = ScriptedProvider::new(payload(20.0));
    let result = analyzer(provider.clone())
        .analyze(&change("c1", ".ok"), &context())
        .await
        .unwrap();

    // (80*1.0 + 70*0.8 + 80*0.6 + 60*1.2 + 85*1.0 + 90*0.9 + 80*1.1) / 6.6 = 77.3
    assert_eq!(result.pr_score.overall, 77.0);
    assert_eq!(result.pr_score.breakdown.cascade_risk, 40.0);
    assert_eq!(result.change_id, "c1");
    assert_eq!(result.provider, "openai");
    assert_eq!(result.tokens_used, 1000);
    assert_eq!(result.raw_response.as_deref(), Some(payload(20.0).as_str()));
    assert!(Uuid::parse_str(&result.id).is_ok());
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_analyze_keeps_overall_within_tolerance() {
    let result = analyzer(ScriptedProvider::new(payload(84.0)))
        .analyze(&change("c1", ".ok"), &context())
        .await
        .unwrap();
    assert_eq!(result.pr_score.overall, 84.0);
}

#[tokio::test]
async fn test_confidence_blends_all_factors() {
    let c = change("c1", ".ok");
    let ctx = context();
    let result = analyzer(ScriptedProvider::new(payload(78.0)))
        .analyze(&c, &ctx)
        .await
        .unwrap();

    let data = crate::types::AnalysisResultData {
        affected_components: result.affected_components.clone(),
        risks: result.risks.clone(),
        suggestions: result.suggestions.clone(),
        style_consistency: result.style_consistency.clone(),
        pr_score: result.pr_score.clone(),
    };
    let expected = calculate_confidence(&ConfidenceFactors {
        context_available: estimate_context_quality(&ctx),
        change_complexity: estimate_change_complexity(&c),
        model_confidence: average_model_confidence(&data),
        schema_validation: 1.0,
        token_usage_ratio: Some(0.5),
    });
    assert_eq!(result.confidence, expected);
    assert!((0.0..=1.0).contains(&result.confidence));
}

#[tokio::test]
async fn test_unparseable_output_degrades_not_fails() {
    let result = analyzer(ScriptedProvider::new("Sorry, I cannot review this."))
        .analyze(&change("c1", ".ok"), &context())
        .await
        .unwrap();

    assert_eq!(result.risks.len(), 1);
    assert_eq!(result.risks[0].id, "parse-error");
    assert_eq!(result.pr_score.overall, 70.0);
    assert!(result.confidence < 0.7);
}

#[tokio::test]
async fn test_raw_response_can_be_dropped() {
    let config = AnalyzerConfig {
        include_raw_response: false,
        ..AnalyzerConfig::default()
    };
    let result = ChangeAnalyzer::new(ScriptedProvider::new(payload(78.0)), config)
        .analyze(&change("c1", ".ok"), &context())
        .await
        .unwrap();
    assert!(result.raw_response.is_none());
}

#[tokio::test]
async fn test_provider_failure_is_an_error() {
    let err = analyzer(ScriptedProvider::new(payload(78.0)))
        .analyze(&change("c2", ".fail"), &context())
        .await
        .unwrap_err();
    assert!(err.is_provider_failure());
}

#[tokio::test]
async fn test_empty_change_id_rejected_before_provider() {
    let provider = ScriptedProvider::new(payload(78.0));
    let err = analyzer(provider.clone())
        .analyze(&change(" ", ".ok"), &context())
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::InvalidInput(_)));
    assert_eq!(provider.calls(), 0);
}

// ============================================================================
// Batch streaming
// ============================================================================

#[tokio::test]
async fn test_sequential_failure_is_isolated() {
    let events: Vec<_> = analyzer(ScriptedProvider::new(payload(78.0)))
        .analyze_stream(batch(), context(), BatchOptions::sequential())
        .collect()
        .await;

    assert_eq!(
        kinds(&events),
        vec!["start", "progress", "result", "progress", "error", "progress", "result", "complete"]
    );
    let completed: Vec<usize> = events.iter().map(|e| e.completed_changes()).collect();
    assert_eq!(completed, vec![0, 0, 1, 1, 1, 1, 2, 2]);
    assert_eq!(events[4].change_id(), Some("c2"));
    assert_eq!(events[2].progress(), Some(1.0 / 3.0));
    assert!(events.iter().all(|e| e.total_changes() == 3));
}

#[tokio::test]
async fn test_parallel_failure_is_isolated_in_input_order() {
    let provider = ScriptedProvider::new(payload(78.0));
    let events: Vec<_> = analyzer(provider.clone())
        .analyze_stream(batch(), context(), BatchOptions::parallel(2))
        .collect()
        .await;

    assert_eq!(kinds(&events), vec!["start", "result", "error", "result", "complete"]);
    let ids: Vec<_> = events.iter().filter_map(|e| e.change_id()).collect();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
    assert_eq!(events[3].completed_changes(), 2);
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_on_progress_fires_per_success() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let options = BatchOptions::parallel(3).on_progress(move |event| {
        sink.lock().unwrap().push((event.kind(), event.completed_changes()));
    });

    let results = analyzer(ScriptedProvider::new(payload(78.0)))
        .analyze_all(batch(), context(), options)
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(*seen.lock().unwrap(), vec![("progress", 1), ("progress", 2)]);
}

#[tokio::test]
async fn test_stream_is_lazy() {
    let provider = ScriptedProvider::new(payload(78.0));
    let stream = analyzer(provider.clone()).analyze_stream(batch(), context(), BatchOptions::default());
    assert_eq!(provider.calls(), 0);

    let mut stream = Box::pin(stream);
    assert_eq!(stream.next().await.map(|e| e.kind()), Some("start"));
    assert_eq!(provider.calls(), 0);

    // Dropping after the first item stops the batch
    let _ = stream.next().await;
    let _ = stream.next().await;
    drop(stream);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_empty_batch() {
    let events: Vec<_> = analyzer(ScriptedProvider::new(payload(78.0)))
        .analyze_stream(Vec::new(), context(), BatchOptions::parallel(0))
        .collect()
        .await;
    assert_eq!(kinds(&events), vec!["start", "complete"]);
}

#[tokio::test]
async fn test_analyze_all_keeps_order() {
    let changes = vec![change("a", ".ok"), change("b", ".ok"), change("c", ".ok")];
    let results = analyzer(ScriptedProvider::new(payload(78.0)))
        .analyze_all(changes, context(), BatchOptions::parallel(2))
        .await;
    let ids: Vec<_> = results.iter().map(|r| r.change_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn test_batch_options_clamp_concurrency() {
    assert_eq!(BatchOptions::parallel(0).concurrency, 1);
    assert_eq!(BatchOptions::default().concurrency, DEFAULT_CONCURRENCY);
    assert!(!BatchOptions::default().parallel);
    assert!(format!("{:?}", BatchOptions::default()).contains("on_progress: false"));
}
