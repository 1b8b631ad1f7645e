// src/scoring/engine.rs
// Deterministic scoring over a PR score breakdown

use serde::Serialize;
use tracing::debug;

use super::criteria::{Evaluation, evaluate_score, score_color, score_label};
use super::weights::ScoringWeights;
use crate::types::{Flag, FlagType, Metric, PrScore, PrScoreBreakdown};

/// Maximum gap tolerated between a reported and a recomputed overall score
pub const OVERALL_TOLERANCE: f64 = 10.0;

const WARNING_CONFIDENCE: f64 = 0.9;
const INFO_CONFIDENCE: f64 = 0.8;

/// Offline scoring summary for a breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub overall: f64,
    pub label: &'static str,
    pub color: &'static str,
    pub flags: Vec<Flag>,
    pub would_approve: bool,
    pub summary: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Weighted mean of the breakdown on a higher-is-better axis, rounded
    pub fn calculate_overall_score(&self, breakdown: &PrScoreBreakdown) -> f64 {
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for (metric, value) in breakdown.iter() {
            let weight = self.weights.get(metric);
            weighted_sum += effective_value(metric, value) * weight;
            total_weight += weight;
        }

        if total_weight <= 0.0 {
            return 0.0;
        }
        (weighted_sum / total_weight).round().clamp(0.0, 100.0)
    }

    /// Replace `overall` when it drifts more than the tolerance from the recomputed value
    pub fn validate_and_recalculate(&self, score: PrScore) -> PrScore {
        let recalculated = self.calculate_overall_score(&score.breakdown);
        let diff = (score.overall - recalculated).abs();

        if diff > OVERALL_TOLERANCE {
            debug!(
                reported = score.overall,
                recalculated = recalculated,
                "Reported overall score out of tolerance, using recalculated value"
            );
            PrScore {
                overall: recalculated,
                ..score
            }
        } else {
            score
        }
    }

    /// Warning flags for bad metrics and info flags for standout ones
    pub fn generate_flags(&self, breakdown: &PrScoreBreakdown) -> Vec<Flag> {
        breakdown
            .iter()
            .filter_map(|(metric, value)| match evaluate_score(metric, value) {
                Evaluation::Bad => Some(Flag {
                    flag_type: FlagType::Warning,
                    message: warning_message(metric, value),
                    details: None,
                    confidence: WARNING_CONFIDENCE,
                }),
                Evaluation::Good if value >= 90.0 => Some(Flag {
                    flag_type: FlagType::Info,
                    message: positive_message(metric).to_string(),
                    details: None,
                    confidence: INFO_CONFIDENCE,
                }),
                _ => None,
            })
            .collect()
    }

    pub fn should_approve(&self, overall: f64, breakdown: &PrScoreBreakdown) -> bool {
        overall >= 60.0
            && breakdown.cascade_risk <= 80.0
            && breakdown.semantic_score >= 40.0
            && breakdown.intent_alignment >= 50.0
    }

    /// One-line summary naming the weakest area
    pub fn summary(&self, overall: f64, breakdown: &PrScoreBreakdown) -> String {
        let label = score_label(overall);
        let area = weak_area_name(weakest_metric(breakdown));

        if overall >= 80.0 {
            format!("{label} change. Well-structured with good attention to {area}.")
        } else if overall >= 60.0 {
            format!("{label}. Consider improving {area} before merging.")
        } else {
            format!("{label}. Significant concerns with {area}. Review recommended.")
        }
    }

    /// Full offline report for a breakdown, no model involved
    pub fn report(&self, breakdown: &PrScoreBreakdown) -> ScoreReport {
        let overall = self.calculate_overall_score(breakdown);
        ScoreReport {
            overall,
            label: score_label(overall),
            color: score_color(overall),
            flags: self.generate_flags(breakdown),
            would_approve: self.should_approve(overall, breakdown),
            summary: self.summary(overall, breakdown),
        }
    }
}

fn effective_value(metric: Metric, value: f64) -> f64 {
    let value = value.clamp(0.0, 100.0);
    if metric.is_inverted() { 100.0 - value } else { value }
}

/// Lowest metric on the higher-is-better axis; ties keep the earlier metric
fn weakest_metric(breakdown: &PrScoreBreakdown) -> Metric {
    let mut weakest = Metric::CodeConsistency;
    let mut weakest_value = 100.0;
    for (metric, value) in breakdown.iter() {
        let effective = effective_value(metric, value);
        if effective < weakest_value {
            weakest = metric;
            weakest_value = effective;
        }
    }
    weakest
}

fn weak_area_name(metric: Metric) -> &'static str {
    match metric {
        Metric::CodeConsistency => "code consistency",
        Metric::ReuseScore => "code reuse",
        Metric::AiDetectionRisk => "natural appearance",
        Metric::CascadeRisk => "CSS scoping",
        Metric::ResponsiveScore => "responsive design",
        Metric::SemanticScore => "semantic structure",
        Metric::IntentAlignment => "intent alignment",
    }
}

fn warning_message(metric: Metric, value: f64) -> String {
    match metric {
        Metric::CodeConsistency => format!(
            "Low code consistency ({value}%). The change may not match surrounding patterns."
        ),
        Metric::ReuseScore => {
            format!("Low reuse score ({value}%). Consider using existing utilities instead.")
        }
        Metric::AiDetectionRisk => {
            format!("High AI detection risk ({value}%). The change may appear AI-generated.")
        }
        Metric::CascadeRisk => {
            format!("High cascade risk ({value}%). CSS changes may affect other elements.")
        }
        Metric::ResponsiveScore => format!(
            "Low responsive score ({value}%). Mobile/tablet breakpoints may be affected."
        ),
        Metric::SemanticScore => {
            format!("Low semantic score ({value}%). HTML structure may not be semantic.")
        }
        Metric::IntentAlignment => format!(
            "Low intent alignment ({value}%). The change may not match user expectations."
        ),
    }
}

fn positive_message(metric: Metric) -> &'static str {
    match metric {
        Metric::CodeConsistency => "Excellent code consistency with existing patterns.",
        Metric::ReuseScore => "Great use of existing utilities and components.",
        Metric::AiDetectionRisk => "Change appears natural and human-written.",
        Metric::CascadeRisk => "CSS changes are well-scoped with low cascade risk.",
        Metric::ResponsiveScore => "Excellent responsive design considerations.",
        Metric::SemanticScore => "Semantic HTML structure preserved.",
        Metric::IntentAlignment => "Change aligns well with user intent.",
    }
}
