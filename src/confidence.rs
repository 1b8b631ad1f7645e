// src/confidence.rs
// Blend independent signals into one confidence figure

use serde::Serialize;

use crate::types::AnalysisResultData;

const CONTEXT_WEIGHT: f64 = 0.2;
const COMPLEXITY_WEIGHT: f64 = 0.15;
const MODEL_WEIGHT: f64 = 0.35;
const SCHEMA_WEIGHT: f64 = 0.25;
const TOKEN_WEIGHT: f64 = 0.05;

/// Model self-confidence assumed when the output carries none
pub const DEFAULT_MODEL_CONFIDENCE: f64 = 0.7;

/// Inputs to the confidence blend, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceFactors {
    /// How much page context was available
    pub context_available: f64,
    /// Higher means harder; inverted in the blend
    pub change_complexity: f64,
    pub model_confidence: f64,
    /// Schema tier factor (1.0, 0.5, or 0.0)
    pub schema_validation: f64,
    /// Share of the token budget consumed; inverted, and skipped when unknown
    pub token_usage_ratio: Option<f64>,
}

/// Weighted blend rounded to two decimals
pub fn calculate_confidence(factors: &ConfidenceFactors) -> f64 {
    let unit = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };

    let mut weighted_sum = unit(factors.context_available) * CONTEXT_WEIGHT
        + (1.0 - unit(factors.change_complexity)) * COMPLEXITY_WEIGHT
        + unit(factors.model_confidence) * MODEL_WEIGHT
        + unit(factors.schema_validation) * SCHEMA_WEIGHT;
    let mut total_weight = CONTEXT_WEIGHT + COMPLEXITY_WEIGHT + MODEL_WEIGHT + SCHEMA_WEIGHT;

    if let Some(ratio) = factors.token_usage_ratio {
        weighted_sum += (1.0 - unit(ratio)) * TOKEN_WEIGHT;
        total_weight += TOKEN_WEIGHT;
    }

    ((weighted_sum / total_weight) * 100.0).round() / 100.0
}

/// Mean of every confidence the model reported
pub fn average_model_confidence(data: &AnalysisResultData) -> f64 {
    let confidences: Vec<f64> = data
        .affected_components
        .iter()
        .map(|c| c.confidence)
        .chain(data.risks.iter().map(|r| r.confidence))
        .chain(data.suggestions.iter().map(|s| s.confidence))
        .chain([data.style_consistency.confidence, data.pr_score.confidence])
        .filter(|c| c.is_finite())
        .collect();

    if confidences.is_empty() {
        return DEFAULT_MODEL_CONFIDENCE;
    }
    confidences.iter().sum::<f64>() / confidences.len() as f64
}

pub fn confidence_label(confidence: f64) -> &'static str {
    match confidence {
        c if c >= 0.9 => "Very High",
        c if c >= 0.75 => "High",
        c if c >= 0.6 => "Moderate",
        c if c >= 0.4 => "Low",
        _ => "Very Low",
    }
}

pub fn should_warn_low_confidence(confidence: f64) -> bool {
    confidence < 0.6
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Risk, RiskCategory, Severity};

    fn factors() -> ConfidenceFactors {
        ConfidenceFactors {
            context_available: 0.5,
            change_complexity: 0.3,
            model_confidence: 0.9,
            schema_validation: 1.0,
            token_usage_ratio: None,
        }
    }

    #[test]
    fn test_blend_without_token_ratio() {
        // (0.1 + 0.105 + 0.315 + 0.25) / 0.95 = 0.8105
        assert_eq!(calculate_confidence(&factors()), 0.81);
    }

    #[test]
    fn test_blend_with_token_ratio() {
        let f = ConfidenceFactors {
            token_usage_ratio: Some(0.4),
            ..factors()
        };
        // (0.77 + 0.03) / 1.0
        assert_eq!(calculate_confidence(&f), 0.8);
    }

    #[test]
    fn test_extremes_stay_in_unit_range() {
        let best = ConfidenceFactors {
            context_available: 1.0,
            change_complexity: 0.0,
            model_confidence: 1.0,
            schema_validation: 1.0,
            token_usage_ratio: Some(0.0),
        };
        assert_eq!(calculate_confidence(&best), 1.0);

        let worst = ConfidenceFactors {
            context_available: 0.0,
            change_complexity: 1.0,
            model_confidence: 0.0,
            schema_validation: 0.0,
            token_usage_ratio: Some(3.5),
        };
        assert_eq!(calculate_confidence(&worst), 0.0);
    }

    #[test]
    fn test_out_of_range_inputs_clamped() {
        let f = ConfidenceFactors {
            model_confidence: 7.0,
            change_complexity: -2.0,
            ..factors()
        };
        let c = calculate_confidence(&f);
        assert!((0.0..=1.0).contains(&c));
    }

    #[test]
    fn test_average_includes_every_confidence() {
        let mut data = AnalysisResultData::baseline();
        data.risks.push(Risk {
            id: "r1".into(),
            severity: Severity::High,
            category: RiskCategory::Cascade,
            title: "Global selector".into(),
            description: "Rule applies to every button".into(),
            affected_breakpoints: None,
            mitigation: None,
            confidence: 0.8,
        });
        // (0.8 + 0.5 + 0.5) / 3
        assert!((average_model_confidence(&data) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_labels() {
        assert_eq!(confidence_label(0.95), "Very High");
        assert_eq!(confidence_label(0.75), "High");
        assert_eq!(confidence_label(0.6), "Moderate");
        assert_eq!(confidence_label(0.45), "Low");
        assert_eq!(confidence_label(0.1), "Very Low");
        assert!(should_warn_low_confidence(0.59));
        assert!(!should_warn_low_confidence(0.6));
    }
}
