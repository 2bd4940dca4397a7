//! Tab data model.
//!
//! A Tab lives from its first observation until the browser closes it. Its
//! URL is kept decomposed so the matcher never re-parses it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::{extract_features, fingerprint, FeatureSource, TabUrl};

pub type TabId = i64;
pub type WindowId = i64;

/// Signals extracted from the page content, when available.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageSignals {
    pub heading: Option<String>,
    pub meta_description: Option<String>,
    pub extracted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    pub window_id: WindowId,
    pub url: TabUrl,
    pub title: String,
    pub page: Option<PageSignals>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub active_time_ms: u64,
    pub project_id: Option<String>,
    pub subproject_id: Option<String>,
    pub fingerprint: String,
    pub opener_tab_id: Option<TabId>,
    pub manually_assigned: bool,
}

impl Tab {
    pub fn new(
        id: TabId,
        window_id: WindowId,
        url: &str,
        title: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let mut tab = Self {
            id,
            window_id,
            url: TabUrl::parse(url)?,
            title: title.into(),
            page: None,
            created_at: now,
            last_active_at: now,
            active_time_ms: 0,
            project_id: None,
            subproject_id: None,
            fingerprint: String::new(),
            opener_tab_id: None,
            manually_assigned: false,
        };
        tab.refresh_fingerprint();
        Ok(tab)
    }

    pub fn host(&self) -> &str {
        &self.url.host
    }

    /// Tokens from host, path, title, heading and meta description.
    pub fn features(&self) -> Vec<String> {
        let page = self.page.as_ref();
        extract_features(FeatureSource {
            host: &self.url.host,
            path_segments: &self.url.path_segments,
            title: &self.title,
            heading: page.and_then(|p| p.heading.as_deref()),
            meta_description: page.and_then(|p| p.meta_description.as_deref()),
        })
    }

    /// Recomputes the fingerprint; returns whether it changed.
    pub fn refresh_fingerprint(&mut self) -> bool {
        let next = fingerprint(&self.features());
        let changed = next != self.fingerprint;
        self.fingerprint = next;
        changed
    }

    pub fn assign(&mut self, project_id: String, subproject_id: Option<String>) {
        self.project_id = Some(project_id);
        self.subproject_id = subproject_id;
    }

    pub fn detach(&mut self) {
        self.project_id = None;
        self.subproject_id = None;
        self.manually_assigned = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tab_carries_fingerprint_of_its_features() {
        let tab = Tab::new(1, 10, "https://docs.rs/tokio/latest", "Tokio runtime", Utc::now()).unwrap();
        assert_eq!(tab.fingerprint, "docs|latest|runtime|tokio");
        assert!(!tab.manually_assigned);
    }

    #[test]
    fn fingerprint_changes_only_when_features_change() {
        let mut tab = Tab::new(1, 10, "https://docs.rs/tokio", "Tokio", Utc::now()).unwrap();
        assert!(!tab.refresh_fingerprint());

        tab.page = Some(PageSignals {
            heading: Some("Runtime".into()),
            ..PageSignals::default()
        });
        assert!(tab.refresh_fingerprint());
    }
}
