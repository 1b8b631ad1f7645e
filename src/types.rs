// src/types.rs
// Shared data model: change inputs, analysis payloads, and the final result

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Inputs
// ============================================================================

/// Kind of DOM edit captured by the visual editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Text,
    Style,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Style => write!(f, "style"),
        }
    }
}

/// One side (before or after) of an edit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<BTreeMap<String, String>>,
}

impl ChangeState {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text_content: Some(content.into()),
            styles: None,
        }
    }

    pub fn styles<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            text_content: None,
            styles: Some(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }
}

/// A single DOM edit submitted for analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeInput {
    pub id: String,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub element_tag: String,
    #[serde(default)]
    pub xpath: String,
    #[serde(default)]
    pub selector: String,
    #[serde(default)]
    pub original: ChangeState,
    #[serde(default)]
    pub modified: ChangeState,
}

/// Page-level context shared by every change in a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisContext {
    #[serde(default)]
    pub page_url: String,
    #[serde(rename = "surroundingHTML", default, skip_serializing_if = "Option::is_none")]
    pub surrounding_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_system: Option<String>,
    #[serde(default)]
    pub existing_classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport_width: Option<u32>,
}

impl AnalysisContext {
    pub fn new(page_url: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Model output payloads
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentImpact {
    pub component_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub impact_level: ImpactLevel,
    pub description: String,
    pub other_pages_affected: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskCategory {
    Cascade,
    Responsive,
    Accessibility,
    Performance,
    Semantic,
    Compatibility,
    DesignConsistency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub id: String,
    pub severity: Severity,
    pub category: RiskCategory,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_breakpoints: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionType {
    Improvement,
    Alternative,
    BestPractice,
    Optimization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    #[serde(rename = "type")]
    pub suggestion_type: SuggestionType,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_example: Option<String>,
    pub rationale: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleIssue {
    pub property: String,
    pub issue: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleReview {
    pub overall_consistency: f64,
    pub design_system_alignment: f64,
    pub color_consistency: f64,
    pub spacing_consistency: f64,
    pub typography_consistency: f64,
    pub issues: Vec<StyleIssue>,
    pub confidence: f64,
}

impl StyleReview {
    /// Neutral review used when the model output is missing or unusable
    pub fn baseline() -> Self {
        Self {
            overall_consistency: 70.0,
            design_system_alignment: 70.0,
            color_consistency: 70.0,
            spacing_consistency: 70.0,
            typography_consistency: 70.0,
            issues: Vec::new(),
            confidence: 0.5,
        }
    }
}

/// The seven scored dimensions of a PR score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    CodeConsistency,
    ReuseScore,
    AiDetectionRisk,
    CascadeRisk,
    ResponsiveScore,
    SemanticScore,
    IntentAlignment,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::CodeConsistency,
        Metric::ReuseScore,
        Metric::AiDetectionRisk,
        Metric::CascadeRisk,
        Metric::ResponsiveScore,
        Metric::SemanticScore,
        Metric::IntentAlignment,
    ];

    /// Wire key as it appears in the breakdown object
    pub fn key(&self) -> &'static str {
        match self {
            Self::CodeConsistency => "codeConsistency",
            Self::ReuseScore => "reuseScore",
            Self::AiDetectionRisk => "aiDetectionRisk",
            Self::CascadeRisk => "cascadeRisk",
            Self::ResponsiveScore => "responsiveScore",
            Self::SemanticScore => "semanticScore",
            Self::IntentAlignment => "intentAlignment",
        }
    }

    /// Risk metrics where a lower value is better
    pub fn is_inverted(&self) -> bool {
        matches!(self, Self::AiDetectionRisk | Self::CascadeRisk)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrScoreBreakdown {
    pub code_consistency: f64,
    pub reuse_score: f64,
    pub ai_detection_risk: f64,
    pub cascade_risk: f64,
    pub responsive_score: f64,
    pub semantic_score: f64,
    pub intent_alignment: f64,
}

impl PrScoreBreakdown {
    /// Same value on every metric
    pub fn uniform(value: f64) -> Self {
        Self {
            code_consistency: value,
            reuse_score: value,
            ai_detection_risk: value,
            cascade_risk: value,
            responsive_score: value,
            semantic_score: value,
            intent_alignment: value,
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::CodeConsistency => self.code_consistency,
            Metric::ReuseScore => self.reuse_score,
            Metric::AiDetectionRisk => self.ai_detection_risk,
            Metric::CascadeRisk => self.cascade_risk,
            Metric::ResponsiveScore => self.responsive_score,
            Metric::SemanticScore => self.semantic_score,
            Metric::IntentAlignment => self.intent_alignment,
        }
    }

    pub fn get_mut(&mut self, metric: Metric) -> &mut f64 {
        match metric {
            Metric::CodeConsistency => &mut self.code_consistency,
            Metric::ReuseScore => &mut self.reuse_score,
            Metric::AiDetectionRisk => &mut self.ai_detection_risk,
            Metric::CascadeRisk => &mut self.cascade_risk,
            Metric::ResponsiveScore => &mut self.responsive_score,
            Metric::SemanticScore => &mut self.semantic_score,
            Metric::IntentAlignment => &mut self.intent_alignment,
        }
    }

    /// Metric/value pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagType {
    Warning,
    Suggestion,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrScore {
    pub overall: f64,
    pub breakdown: PrScoreBreakdown,
    pub flags: Vec<Flag>,
    pub summary: String,
    pub would_approve: bool,
    pub confidence: f64,
}

impl PrScore {
    /// Neutral score used when the model output is missing or unusable
    pub fn baseline() -> Self {
        let mut breakdown = PrScoreBreakdown::uniform(70.0);
        breakdown.ai_detection_risk = 30.0;
        breakdown.cascade_risk = 30.0;
        Self {
            overall: 70.0,
            breakdown,
            flags: Vec::new(),
            summary: "Analysis incomplete. Manual review recommended.".to_string(),
            would_approve: true,
            confidence: 0.5,
        }
    }
}

/// The structured body the model is asked to return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResultData {
    pub affected_components: Vec<ComponentImpact>,
    pub risks: Vec<Risk>,
    pub suggestions: Vec<Suggestion>,
    pub style_consistency: StyleReview,
    pub pr_score: PrScore,
}

impl AnalysisResultData {
    /// Empty lists with neutral style and PR baselines
    pub fn baseline() -> Self {
        Self {
            affected_components: Vec::new(),
            risks: Vec::new(),
            suggestions: Vec::new(),
            style_consistency: StyleReview::baseline(),
            pr_score: PrScore::baseline(),
        }
    }
}

// ============================================================================
// Final result
// ============================================================================

/// Fully assembled analysis for one change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: String,
    pub change_id: String,
    /// Milliseconds since epoch, taken when analysis started
    pub timestamp: i64,
    pub affected_components: Vec<ComponentImpact>,
    pub risks: Vec<Risk>,
    pub suggestions: Vec<Suggestion>,
    pub style_consistency: StyleReview,
    pub pr_score: PrScore,
    pub confidence: f64,
    pub provider: String,
    pub tokens_used: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}
