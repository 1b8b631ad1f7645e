// src/parser/mod.rs
// Turn raw model text into a fully populated analysis payload

pub mod json;
pub mod schema;
pub mod validate;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{AnalysisResultData, PrScore, Risk, RiskCategory, Severity, StyleReview};

pub use json::{balanced_block, strip_code_fences};
pub use schema::analysis_result_json_schema;

/// How much of the model output survived validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaTier {
    /// Parsed and passed every structural and range check
    Full,
    /// Parsed as JSON but had to be repaired field by field
    Partial,
    /// Not JSON at all
    Failed,
}

impl SchemaTier {
    /// Contribution to the confidence blend
    pub fn factor(&self) -> f64 {
        match self {
            Self::Full => 1.0,
            Self::Partial => 0.5,
            Self::Failed => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAnalysis {
    pub data: AnalysisResultData,
    pub tier: SchemaTier,
    /// Why the output did not reach the full tier
    pub issues: Vec<String>,
}

/// Synthetic risk attached when the output could not be read at all
pub fn parse_error_risk() -> Risk {
    Risk {
        id: "parse-error".to_string(),
        severity: Severity::Medium,
        category: RiskCategory::Compatibility,
        title: "Analysis Parse Error".to_string(),
        description: "Could not fully parse the analysis result. Review manually.".to_string(),
        affected_breakpoints: None,
        mitigation: None,
        confidence: 0.5,
    }
}

/// Classify and repair raw model output. Never fails.
pub fn parse_analysis(raw: &str) -> ParsedAnalysis {
    let value: Value = match serde_json::from_str(strip_code_fences(raw)) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, len = raw.len(), "Model output is not JSON, using default analysis");
            let mut data = AnalysisResultData::baseline();
            data.risks.push(parse_error_risk());
            return ParsedAnalysis {
                data,
                tier: SchemaTier::Failed,
                issues: vec![format!("invalid JSON: {e}")],
            };
        }
    };

    let mut issues = match serde_json::from_value::<AnalysisResultData>(value.clone()) {
        Ok(data) => {
            let violations = validate::range_violations(&data);
            if violations.is_empty() {
                return ParsedAnalysis {
                    data,
                    tier: SchemaTier::Full,
                    issues: Vec::new(),
                };
            }
            violations
        }
        Err(e) => vec![e.to_string()],
    };

    let data = repair(&value, &mut issues);
    debug!(issues = ?issues, "Model output repaired field by field");
    ParsedAnalysis {
        data,
        tier: SchemaTier::Partial,
        issues,
    }
}

/// Decode one field, recording why it was dropped
fn field<T: DeserializeOwned>(value: &Value, key: &str, issues: &mut Vec<String>) -> Option<T> {
    let raw = value.get(key)?;
    match serde_json::from_value(raw.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            issues.push(format!("{key}: {e}"));
            None
        }
    }
}

fn repair(value: &Value, issues: &mut Vec<String>) -> AnalysisResultData {
    let mut style: StyleReview =
        field(value, "styleConsistency", issues).unwrap_or_else(StyleReview::baseline);
    validate::clamp_style_review(&mut style);

    let mut pr: PrScore = field(value, "prScore", issues).unwrap_or_else(PrScore::baseline);
    validate::clamp_pr_score(&mut pr);

    let mut data = AnalysisResultData {
        affected_components: field(value, "affectedComponents", issues).unwrap_or_default(),
        risks: field(value, "risks", issues).unwrap_or_default(),
        suggestions: field(value, "suggestions", issues).unwrap_or_default(),
        style_consistency: style,
        pr_score: pr,
    };
    validate::clamp_all(&mut data);
    data
}
