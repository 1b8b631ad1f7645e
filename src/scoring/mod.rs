// src/scoring/mod.rs
// PR score weighting, thresholds, and the scoring engine

pub mod criteria;
pub mod engine;
pub mod weights;

pub use criteria::{Evaluation, SCORING_CRITERIA, ScoringCriteria, criteria_for, evaluate_score, score_color, score_label};
pub use engine::{OVERALL_TOLERANCE, ScoreReport, ScoringEngine};
pub use weights::ScoringWeights;
