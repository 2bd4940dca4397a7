use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};

use crate::context::{cache::ContextCache, config::ContextConfig};
use crate::error::Result;
use crate::models::{ActiveContext, RecentTabActivity, Tab, WindowId};
use crate::store::TabStore;

// Set to true to trace context refreshes
const ENABLE_LOGS: bool = false;

use crate::log_debug;

/// Maintains each window's rolling activity snapshot.
#[derive(Debug, Default)]
pub struct ContextTracker {
    config: ContextConfig,
    cache: ContextCache,
}

impl ContextTracker {
    pub fn new(config: ContextConfig) -> Self {
        Self {
            config,
            cache: ContextCache::new(),
        }
    }

    /// Recomputes the window's context around the just-activated tab.
    pub async fn update_context<S: TabStore + ?Sized>(
        &mut self,
        store: &S,
        window_id: WindowId,
        activated: &Tab,
        now: DateTime<Utc>,
    ) -> Result<ActiveContext> {
        let window_tabs = store.get_tabs_by_window(window_id).await?;
        let context = compute_context(window_id, activated, &window_tabs, &self.config, now);

        log_debug!(
            "window {} context: active project {:?}, {} recent tabs",
            window_id,
            context.active_project_id,
            context.recent_tabs.len()
        );

        self.cache.store(context.clone());
        Ok(context)
    }

    /// Cached context if still fresh; `None` forces callers to recompute.
    pub fn get_context(&self, window_id: WindowId, now: DateTime<Utc>) -> Option<&ActiveContext> {
        self.cache.get_if_fresh(
            window_id,
            Duration::milliseconds(self.config.freshness_ms),
            now,
        )
    }

    pub fn forget_window(&mut self, window_id: WindowId) {
        self.cache.forget(window_id);
    }
}

/// Pure computation of a window snapshot from its tabs.
pub fn compute_context(
    window_id: WindowId,
    activated: &Tab,
    window_tabs: &[Tab],
    config: &ContextConfig,
    now: DateTime<Utc>,
) -> ActiveContext {
    let window_ms = config.window_ms.max(1) as f64;

    let mut recent_tabs: Vec<RecentTabActivity> = window_tabs
        .iter()
        .filter_map(|tab| {
            let elapsed_ms = (now - tab.last_active_at).num_milliseconds().max(0) as f64;
            if elapsed_ms > window_ms {
                return None;
            }

            let recency = 1.0 - elapsed_ms / window_ms;
            let dwell = (tab.active_time_ms as f64 / config.dwell_saturation_ms.max(1) as f64).min(1.0);

            Some(RecentTabActivity {
                tab_id: tab.id,
                project_id: tab.project_id.clone(),
                subproject_id: tab.subproject_id.clone(),
                last_active_at: tab.last_active_at,
                active_time_ms: tab.active_time_ms,
                weight: config.weight_dwell * dwell + config.weight_recency * recency,
            })
        })
        .collect();

    recent_tabs.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));

    ActiveContext {
        window_id,
        active_project_id: activated.project_id.clone(),
        active_subproject_id: activated.subproject_id.clone(),
        recent_tabs,
        computed_at: now,
    }
}
