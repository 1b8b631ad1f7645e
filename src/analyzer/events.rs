// src/analyzer/events.rs
// Progress events emitted while a batch of changes is analyzed

use serde::{Deserialize, Serialize};

use crate::types::AnalysisResult;

/// One step of a batch run; serialized as a tagged JSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalysisStreamEvent {
    #[serde(rename_all = "camelCase")]
    Start {
        total_changes: usize,
        completed_changes: usize,
    },
    #[serde(rename_all = "camelCase")]
    Progress {
        change_id: String,
        /// completed / total, in [0, 1]
        progress: f64,
        total_changes: usize,
        completed_changes: usize,
    },
    #[serde(rename_all = "camelCase")]
    Result {
        change_id: String,
        result: Box<AnalysisResult>,
        progress: f64,
        total_changes: usize,
        completed_changes: usize,
    },
    #[serde(rename_all = "camelCase")]
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        change_id: Option<String>,
        error: String,
        total_changes: usize,
        completed_changes: usize,
    },
    #[serde(rename_all = "camelCase")]
    Complete {
        total_changes: usize,
        completed_changes: usize,
    },
}

impl AnalysisStreamEvent {
    /// Wire name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Progress { .. } => "progress",
            Self::Result { .. } => "result",
            Self::Error { .. } => "error",
            Self::Complete { .. } => "complete",
        }
    }

    pub fn change_id(&self) -> Option<&str> {
        match self {
            Self::Progress { change_id, .. } | Self::Result { change_id, .. } => Some(change_id),
            Self::Error { change_id, .. } => change_id.as_deref(),
            Self::Start { .. } | Self::Complete { .. } => None,
        }
    }

    /// Batch progress fraction, when the event carries one
    pub fn progress(&self) -> Option<f64> {
        match self {
            Self::Progress { progress, .. } | Self::Result { progress, .. } => Some(*progress),
            _ => None,
        }
    }

    pub fn completed_changes(&self) -> usize {
        match self {
            Self::Start { completed_changes, .. }
            | Self::Progress { completed_changes, .. }
            | Self::Result { completed_changes, .. }
            | Self::Error { completed_changes, .. }
            | Self::Complete { completed_changes, .. } => *completed_changes,
        }
    }

    pub fn total_changes(&self) -> usize {
        match self {
            Self::Start { total_changes, .. }
            | Self::Progress { total_changes, .. }
            | Self::Result { total_changes, .. }
            | Self::Error { total_changes, .. }
            | Self::Complete { total_changes, .. } => *total_changes,
        }
    }

    pub fn into_result(self) -> Option<AnalysisResult> {
        match self {
            Self::Result { result, .. } => Some(*result),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}
