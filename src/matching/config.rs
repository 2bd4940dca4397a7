use serde::{Deserialize, Serialize};

/// Tunables for candidate narrowing and scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MatcherConfig {
    /// Sub-score weights
    pub weight_host: f64,
    pub weight_path: f64,
    pub weight_token: f64,
    pub weight_chain: f64,
    pub weight_recency: f64,

    /// Results below this total are dropped (inclusive bound)
    pub min_score: f64,

    /// Divide totals by the weight sum before threshold comparisons.
    /// Off by default: totals are compared unnormalized.
    pub normalize_scores: bool,

    /// Per path-segment credit for prefix matches, capped at 1.0
    pub path_depth_credit: f64,

    /// Chain proximity multiplier for non-active recent projects
    pub recent_chain_factor: f64,

    /// Candidate narrowing: recently active projects
    pub recent_project_window_mins: i64,
    pub recent_project_cap: usize,
    /// Candidate narrowing: last-resort cap
    pub fallback_project_cap: usize,

    /// Subproject resolution
    pub subproject_key_depth: usize,
    pub subproject_min_score: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            weight_host: 3.0,
            weight_path: 2.0,
            weight_token: 1.5,
            weight_chain: 2.0,
            weight_recency: 1.0,
            min_score: 0.3,
            normalize_scores: false,
            path_depth_credit: 0.25,
            recent_chain_factor: 0.8,
            recent_project_window_mins: 30,
            recent_project_cap: 15,
            fallback_project_cap: 20,
            subproject_key_depth: 2,
            subproject_min_score: 0.3,
        }
    }
}

impl MatcherConfig {
    pub fn weight_sum(&self) -> f64 {
        self.weight_host + self.weight_path + self.weight_token + self.weight_chain + self.weight_recency
    }
}
