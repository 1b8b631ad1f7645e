// src/parser/validate.rs
// Range checks and clamping for parsed analysis payloads

use crate::types::{AnalysisResultData, Metric, PrScore, StyleReview};

fn check_unit(issues: &mut Vec<String>, path: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        issues.push(format!("{path} must be within [0, 1], got {value}"));
    }
}

fn check_score(issues: &mut Vec<String>, path: &str, value: f64) {
    if !(0.0..=100.0).contains(&value) {
        issues.push(format!("{path} must be within [0, 100], got {value}"));
    }
}

fn style_scores(review: &StyleReview) -> [(&'static str, f64); 5] {
    [
        ("overallConsistency", review.overall_consistency),
        ("designSystemAlignment", review.design_system_alignment),
        ("colorConsistency", review.color_consistency),
        ("spacingConsistency", review.spacing_consistency),
        ("typographyConsistency", review.typography_consistency),
    ]
}

/// Every numeric field outside its allowed range, as human-readable paths
pub fn range_violations(data: &AnalysisResultData) -> Vec<String> {
    let mut issues = Vec::new();

    for (i, c) in data.affected_components.iter().enumerate() {
        check_unit(&mut issues, &format!("affectedComponents[{i}].confidence"), c.confidence);
    }
    for (i, r) in data.risks.iter().enumerate() {
        check_unit(&mut issues, &format!("risks[{i}].confidence"), r.confidence);
    }
    for (i, s) in data.suggestions.iter().enumerate() {
        check_unit(&mut issues, &format!("suggestions[{i}].confidence"), s.confidence);
    }

    let style = &data.style_consistency;
    for (key, value) in style_scores(style) {
        check_score(&mut issues, &format!("styleConsistency.{key}"), value);
    }
    check_unit(&mut issues, "styleConsistency.confidence", style.confidence);

    let pr = &data.pr_score;
    check_score(&mut issues, "prScore.overall", pr.overall);
    for (metric, value) in pr.breakdown.iter() {
        check_score(&mut issues, &format!("prScore.breakdown.{}", metric.key()), value);
    }
    for (i, f) in pr.flags.iter().enumerate() {
        check_unit(&mut issues, &format!("prScore.flags[{i}].confidence"), f.confidence);
    }
    check_unit(&mut issues, "prScore.confidence", pr.confidence);

    issues
}

fn unit(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

fn score(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

pub fn clamp_style_review(review: &mut StyleReview) {
    review.overall_consistency = score(review.overall_consistency);
    review.design_system_alignment = score(review.design_system_alignment);
    review.color_consistency = score(review.color_consistency);
    review.spacing_consistency = score(review.spacing_consistency);
    review.typography_consistency = score(review.typography_consistency);
    review.confidence = unit(review.confidence);
}

pub fn clamp_pr_score(pr: &mut PrScore) {
    pr.overall = score(pr.overall);
    for metric in Metric::ALL {
        let slot = pr.breakdown.get_mut(metric);
        *slot = score(*slot);
    }
    for flag in &mut pr.flags {
        flag.confidence = unit(flag.confidence);
    }
    pr.confidence = unit(pr.confidence);
}

/// Pull every numeric field into its allowed range
pub fn clamp_all(data: &mut AnalysisResultData) {
    for c in &mut data.affected_components {
        c.confidence = unit(c.confidence);
    }
    for r in &mut data.risks {
        r.confidence = unit(r.confidence);
    }
    for s in &mut data.suggestions {
        s.confidence = unit(s.confidence);
    }
    clamp_style_review(&mut data.style_consistency);
    clamp_pr_score(&mut data.pr_score);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_is_valid() {
        assert!(range_violations(&AnalysisResultData::baseline()).is_empty());
    }

    #[test]
    fn test_reports_paths() {
        let mut data = AnalysisResultData::baseline();
        data.pr_score.breakdown.cascade_risk = 140.0;
        data.style_consistency.confidence = 1.5;
        let issues = range_violations(&data);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|i| i.starts_with("styleConsistency.confidence")));
        assert!(issues.iter().any(|i| i.starts_with("prScore.breakdown.cascadeRisk")));
    }

    #[test]
    fn test_clamp_all_fixes_violations() {
        let mut data = AnalysisResultData::baseline();
        data.pr_score.overall = -5.0;
        data.pr_score.breakdown.reuse_score = 400.0;
        data.style_consistency.color_consistency = 101.0;
        clamp_all(&mut data);
        assert!(range_violations(&data).is_empty());
        assert_eq!(data.pr_score.overall, 0.0);
        assert_eq!(data.pr_score.breakdown.reuse_score, 100.0);
        assert_eq!(data.style_consistency.color_consistency, 100.0);
    }
}
