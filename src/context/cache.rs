use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::models::{ActiveContext, WindowId};

/// Latest context snapshot per window. Process lifetime only.
#[derive(Debug, Default)]
pub struct ContextCache {
    entries: HashMap<WindowId, ActiveContext>,
}

impl ContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, context: ActiveContext) {
        self.entries.insert(context.window_id, context);
    }

    /// The cached snapshot, only while younger than `max_age`.
    pub fn get_if_fresh(
        &self,
        window_id: WindowId,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Option<&ActiveContext> {
        self.entries
            .get(&window_id)
            .filter(|context| now - context.computed_at < max_age)
    }

    pub fn forget(&mut self, window_id: WindowId) {
        self.entries.remove(&window_id);
    }
}
