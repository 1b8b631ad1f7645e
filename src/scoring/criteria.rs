// src/scoring/criteria.rs
// Good/bad thresholds per metric and score labels

use serde::Serialize;

use crate::types::Metric;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringCriteria {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub good_threshold: f64,
    pub bad_threshold: f64,
    pub is_inverted: bool,
}

pub const SCORING_CRITERIA: [ScoringCriteria; 7] = [
    ScoringCriteria {
        key: "codeConsistency",
        name: "Code Consistency",
        description: "How well the change matches surrounding code patterns and conventions",
        good_threshold: 80.0,
        bad_threshold: 50.0,
        is_inverted: false,
    },
    ScoringCriteria {
        key: "reuseScore",
        name: "Code Reuse",
        description: "Whether the change leverages existing utilities vs creating redundant ones",
        good_threshold: 75.0,
        bad_threshold: 40.0,
        is_inverted: false,
    },
    ScoringCriteria {
        key: "aiDetectionRisk",
        name: "AI Detection Risk",
        description: "Likelihood a reviewer would flag this as AI-generated",
        good_threshold: 30.0,
        bad_threshold: 70.0,
        is_inverted: true,
    },
    ScoringCriteria {
        key: "cascadeRisk",
        name: "CSS Cascade Risk",
        description: "Risk of CSS changes affecting other elements unexpectedly",
        good_threshold: 30.0,
        bad_threshold: 60.0,
        is_inverted: true,
    },
    ScoringCriteria {
        key: "responsiveScore",
        name: "Responsive Design",
        description: "Quality of responsive design considerations",
        good_threshold: 75.0,
        bad_threshold: 45.0,
        is_inverted: false,
    },
    ScoringCriteria {
        key: "semanticScore",
        name: "Semantic HTML",
        description: "Preservation of semantic HTML structure",
        good_threshold: 80.0,
        bad_threshold: 50.0,
        is_inverted: false,
    },
    ScoringCriteria {
        key: "intentAlignment",
        name: "Intent Alignment",
        description: "How well the change matches what the user likely intended",
        good_threshold: 85.0,
        bad_threshold: 60.0,
        is_inverted: false,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Evaluation {
    Good,
    Neutral,
    Bad,
}

pub fn criteria_for(metric: Metric) -> &'static ScoringCriteria {
    let idx = Metric::ALL.iter().position(|m| *m == metric).unwrap_or(0);
    &SCORING_CRITERIA[idx]
}

/// Place a metric value on the good/neutral/bad scale
pub fn evaluate_score(metric: Metric, value: f64) -> Evaluation {
    let c = criteria_for(metric);
    if c.is_inverted {
        if value <= c.good_threshold {
            return Evaluation::Good;
        }
        if value >= c.bad_threshold {
            return Evaluation::Bad;
        }
    } else {
        if value >= c.good_threshold {
            return Evaluation::Good;
        }
        if value <= c.bad_threshold {
            return Evaluation::Bad;
        }
    }
    Evaluation::Neutral
}

pub fn score_label(score: f64) -> &'static str {
    match score {
        s if s >= 90.0 => "Excellent",
        s if s >= 80.0 => "Good",
        s if s >= 70.0 => "Acceptable",
        s if s >= 60.0 => "Needs Review",
        s if s >= 50.0 => "Concerning",
        _ => "Poor",
    }
}

/// Hex color for UI badges
pub fn score_color(score: f64) -> &'static str {
    if score >= 80.0 {
        "#10B981"
    } else if score >= 60.0 {
        "#F59E0B"
    } else {
        "#EF4444"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_metrics() {
        for metric in Metric::ALL {
            let c = criteria_for(metric);
            assert_eq!(c.key, metric.key());
            assert_eq!(c.is_inverted, metric.is_inverted());
        }
    }

    #[test]
    fn test_evaluate_normal_metric() {
        assert_eq!(evaluate_score(Metric::CodeConsistency, 80.0), Evaluation::Good);
        assert_eq!(evaluate_score(Metric::CodeConsistency, 65.0), Evaluation::Neutral);
        assert_eq!(evaluate_score(Metric::CodeConsistency, 50.0), Evaluation::Bad);
        assert_eq!(evaluate_score(Metric::IntentAlignment, 84.0), Evaluation::Neutral);
    }

    #[test]
    fn test_evaluate_inverted_metric() {
        assert_eq!(evaluate_score(Metric::CascadeRisk, 30.0), Evaluation::Good);
        assert_eq!(evaluate_score(Metric::CascadeRisk, 45.0), Evaluation::Neutral);
        assert_eq!(evaluate_score(Metric::CascadeRisk, 60.0), Evaluation::Bad);
        assert_eq!(evaluate_score(Metric::AiDetectionRisk, 69.0), Evaluation::Neutral);
        assert_eq!(evaluate_score(Metric::AiDetectionRisk, 70.0), Evaluation::Bad);
    }

    #[test]
    fn test_score_labels() {
        assert_eq!(score_label(95.0), "Excellent");
        assert_eq!(score_label(80.0), "Good");
        assert_eq!(score_label(79.9), "Acceptable");
        assert_eq!(score_label(60.0), "Needs Review");
        assert_eq!(score_label(55.0), "Concerning");
        assert_eq!(score_label(12.0), "Poor");
    }

    #[test]
    fn test_score_colors() {
        assert_eq!(score_color(85.0), "#10B981");
        assert_eq!(score_color(60.0), "#F59E0B");
        assert_eq!(score_color(59.0), "#EF4444");
    }
}
