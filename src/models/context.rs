use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tab::{TabId, WindowId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecentTabActivity {
    pub tab_id: TabId,
    pub project_id: Option<String>,
    pub subproject_id: Option<String>,
    pub last_active_at: DateTime<Utc>,
    pub active_time_ms: u64,
    pub weight: f64,
}

/// Rolling snapshot of a window's recent activity. Recomputed, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveContext {
    pub window_id: WindowId,
    pub active_project_id: Option<String>,
    pub active_subproject_id: Option<String>,
    /// Ordered by descending weight.
    pub recent_tabs: Vec<RecentTabActivity>,
    pub computed_at: DateTime<Utc>,
}

impl ActiveContext {
    pub fn is_active_project(&self, project_id: &str) -> bool {
        self.active_project_id.as_deref() == Some(project_id)
    }

    /// Weight of the heaviest recent tab attributed to `project_id`.
    pub fn recent_weight_for(&self, project_id: &str) -> Option<f64> {
        self.recent_tabs
            .iter()
            .find(|activity| activity.project_id.as_deref() == Some(project_id))
            .map(|activity| activity.weight)
    }
}
