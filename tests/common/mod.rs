// tests/common/mod.rs
// Shared fixtures: a scripted provider and sample changes

#![allow(dead_code)]

use ai_comments::llm::{
    CompletionRequest, CompletionResponse, FinishReason, LlmProvider, NormalizedUsage, Provider,
};
use ai_comments::{AnalysisContext, AnalyzerError, ChangeInput, ChangeState, ChangeType, Result};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::sync::Mutex;

/// Replays canned bodies per change id; ids listed in `failing` get a provider error
pub struct MockProvider {
    default_body: String,
    failing: Vec<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(default_body: impl Into<String>) -> Self {
        Self {
            default_body: default_body.into(),
            failing: Vec::new(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, change_id: &str) -> Self {
        self.failing.push(change_id.to_string());
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// User prompts seen so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let prompt = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt.clone());

        if self
            .failing
            .iter()
            .any(|id| prompt.contains(&format!("`#{}`", id)))
        {
            return Err(AnalyzerError::Provider("mock backend unavailable".into()));
        }

        Ok(CompletionResponse {
            content: self.default_body.clone(),
            usage: NormalizedUsage::new(900, 300),
            model: "mock-model".into(),
            finish_reason: FinishReason::Stop,
        })
    }

    fn provider_type(&self) -> Provider {
        Provider::Anthropic
    }

    fn model_name(&self) -> String {
        "mock-model".into()
    }
}

/// A style change whose selector is `#<id>`, so prompts identify the change
pub fn style_change(id: &str) -> ChangeInput {
    ChangeInput {
        id: id.into(),
        change_type: ChangeType::Style,
        element_tag: "div".into(),
        xpath: format!("//*[@id=\"{id}\"]"),
        selector: format!("#{id}"),
        original: ChangeState::styles([("display", "block"), ("color", "#333")]),
        modified: ChangeState::styles([("display", "none"), ("color", "#333")]),
    }
}

pub fn page_context() -> AnalysisContext {
    AnalysisContext {
        surrounding_html: Some("<section class=\"hero\"><div id=\"banner\">Sale</div></section>".into()),
        design_system: Some("tailwind".into()),
        existing_classes: vec!["hero".into(), "banner".into()],
        viewport_width: Some(1280),
        ..AnalysisContext::new("https://shop.example.com/")
    }
}

/// A well-formed model response
pub fn analysis_body() -> String {
    json!({
        "affectedComponents": [{
            "componentName": "HeroBanner",
            "impactLevel": "high",
            "description": "Banner is hidden on every page using the hero layout",
            "otherPagesAffected": ["/", "/sale"],
            "confidence": 0.85
        }],
        "risks": [{
            "id": "risk-1",
            "severity": "high",
            "category": "accessibility",
            "title": "Content hidden from all users",
            "description": "display:none removes the banner from the accessibility tree",
            "mitigation": "Use a visually-hidden utility if the text should stay readable",
            "confidence": 0.8
        }],
        "suggestions": [],
        "styleConsistency": {
            "overallConsistency": 85,
            "designSystemAlignment": 80,
            "colorConsistency": 90,
            "spacingConsistency": 85,
            "typographyConsistency": 90,
            "issues": [],
            "confidence": 0.7
        },
        "prScore": {
            "overall": 72,
            "breakdown": {
                "codeConsistency": 75,
                "reuseScore": 70,
                "aiDetectionRisk": 15,
                "cascadeRisk": 35,
                "responsiveScore": 70,
                "semanticScore": 60,
                "intentAlignment": 80
            },
            "flags": [],
            "summary": "Hides a shared component",
            "wouldApprove": true,
            "confidence": 0.75
        }
    })
    .to_string()
}
