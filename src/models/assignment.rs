use serde::{Deserialize, Serialize};

use super::tab::TabId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMethod {
    Manual,
    Deterministic,
    Semantic,
    Default,
}

impl AssignmentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentMethod::Manual => "manual",
            AssignmentMethod::Deterministic => "deterministic",
            AssignmentMethod::Semantic => "semantic",
            AssignmentMethod::Default => "default",
        }
    }
}

/// The five sub-scores, each in [0, 1], before weighting.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub host_match: f64,
    pub path_match: f64,
    pub token_similarity: f64,
    pub chain_proximity: f64,
    pub recency_boost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResult {
    pub project_id: String,
    pub subproject_id: Option<String>,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabAssignment {
    pub tab_id: TabId,
    pub project_id: String,
    pub subproject_id: Option<String>,
    pub confidence: f64,
    pub method: AssignmentMethod,
}
