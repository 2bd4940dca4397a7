use serde::{Deserialize, Serialize};

/// Configuration for the per-window rolling activity context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextConfig {
    /// Tabs last active longer ago than this drop out of the window
    pub window_ms: i64,

    /// Dwell at which the dwell score saturates to 1.0
    pub dwell_saturation_ms: u64,

    /// Blend of dwell vs. recency in a recent tab's weight
    pub weight_dwell: f64,
    pub weight_recency: f64,

    /// Cached snapshots older than this are treated as absent
    pub freshness_ms: i64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            window_ms: 30 * 60 * 1000,
            dwell_saturation_ms: 60_000,
            weight_dwell: 0.7,
            weight_recency: 0.3,
            freshness_ms: 5_000,
        }
    }
}
