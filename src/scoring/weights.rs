// src/scoring/weights.rs
// Per-metric weights for the overall PR score

use serde::{Deserialize, Serialize};

use crate::types::Metric;

/// One positive weight per breakdown metric.
///
/// Missing keys in a config file fall back to the defaults below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub code_consistency: f64,
    pub reuse_score: f64,
    pub ai_detection_risk: f64,
    pub cascade_risk: f64,
    pub responsive_score: f64,
    pub semantic_score: f64,
    pub intent_alignment: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            code_consistency: 1.0,
            reuse_score: 0.8,
            ai_detection_risk: 0.6,
            cascade_risk: 1.2,
            responsive_score: 1.0,
            semantic_score: 0.9,
            intent_alignment: 1.1,
        }
    }
}

impl ScoringWeights {
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

    /// Replace a single weight
    pub fn with(mut self, metric: Metric, weight: f64) -> Self {
        let slot = match metric {
            Metric::CodeConsistency => &mut self.code_consistency,
            Metric::ReuseScore => &mut self.reuse_score,
            Metric::AiDetectionRisk => &mut self.ai_detection_risk,
            Metric::CascadeRisk => &mut self.cascade_risk,
            Metric::ResponsiveScore => &mut self.responsive_score,
            Metric::SemanticScore => &mut self.semantic_score,
            Metric::IntentAlignment => &mut self.intent_alignment,
        };
        *slot = weight;
        self
    }

    pub fn total(&self) -> f64 {
        Metric::ALL.iter().map(|m| self.get(*m)).sum()
    }

    /// Weights rescaled to sum to 1
    pub fn normalized(&self) -> Self {
        let total = self.total();
        if total <= 0.0 {
            return *self;
        }
        let mut out = *self;
        for metric in Metric::ALL {
            out = out.with(metric, self.get(metric) / total);
        }
        out
    }

    /// Names of metrics whose weight is not a positive finite number
    pub fn invalid_metrics(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| {
                let w = self.get(*m);
                !w.is_finite() || w <= 0.0
            })
            .collect()
    }
}
