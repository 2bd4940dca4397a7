use chrono::{DateTime, Utc};

use crate::assignment::orchestrator::ActiveTab;
use crate::assignment::AssignmentEngine;
use crate::error::Result;
use crate::events::{EngineNotification, TabEvent};
use crate::features::TabUrl;
use crate::models::{PageSignals, Tab, TabAssignment, TabId, WindowId};
use crate::store::TabStore;

// Set to true to log every incoming tab event
const ENABLE_LOGS: bool = false;

use crate::{log_debug, log_warn};

impl<S: TabStore> AssignmentEngine<S> {
    /// Applies one lifecycle event. Returns the assignment when the event
    /// caused a (re)classification.
    pub async fn handle_event(
        &mut self,
        event: TabEvent,
        now: DateTime<Utc>,
    ) -> Result<Option<TabAssignment>> {
        log_debug!("{} event for tab {}", event.kind(), event.tab_id());

        match event {
            TabEvent::Created {
                tab_id,
                window_id,
                url,
                title,
                opener_tab_id,
            } => {
                self.on_created(tab_id, window_id, &url, title, opener_tab_id, now)
                    .await?;
                Ok(None)
            }
            TabEvent::Activated { tab_id, window_id } => {
                self.on_activated(tab_id, window_id, now).await
            }
            TabEvent::Updated {
                tab_id,
                url,
                title,
                page,
            } => self.on_updated(tab_id, url, title, page, now).await,
            TabEvent::Removed { tab_id } => {
                self.on_removed(tab_id).await?;
                Ok(None)
            }
        }
    }

    async fn on_created(
        &mut self,
        tab_id: TabId,
        window_id: WindowId,
        url: &str,
        title: String,
        opener_tab_id: Option<TabId>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut tab = Tab::new(tab_id, window_id, url, title, now)?;
        tab.opener_tab_id = opener_tab_id;
        self.store.put_tab(&tab).await?;
        self.notifier.emit(EngineNotification::TabUpdated { tab });
        Ok(())
    }

    async fn on_activated(
        &mut self,
        tab_id: TabId,
        window_id: WindowId,
        now: DateTime<Utc>,
    ) -> Result<Option<TabAssignment>> {
        // a tab focused here is no longer active in any other window
        let moved_from: Vec<WindowId> = self
            .active_tabs
            .iter()
            .filter(|(window, active)| **window != window_id && active.tab_id == tab_id)
            .map(|(window, _)| *window)
            .collect();
        for window in moved_from {
            if let Some(previous) = self.active_tabs.remove(&window) {
                self.credit_dwell(previous, now).await?;
            }
        }

        // credit the outgoing tab first so the context sees its dwell
        if let Some(previous) = self.active_tabs.get(&window_id).copied() {
            if previous.tab_id != tab_id {
                self.credit_dwell(previous, now).await?;
            }
        }

        let Some(mut tab) = self.store.get_tab(tab_id).await? else {
            log_warn!("activation for unknown tab {tab_id}, ignoring");
            return Ok(None);
        };

        if let Some(previous) = self.active_tabs.get(&window_id) {
            if previous.tab_id == tab_id {
                tab.active_time_ms += elapsed_ms(previous.since, now);
            }
        }

        tab.window_id = window_id;
        tab.last_active_at = now;
        self.store.put_tab(&tab).await?;
        self.active_tabs
            .insert(window_id, ActiveTab { tab_id, since: now });

        let context = self.refresh_context(&tab, now).await?;
        let assignment = self
            .classify_with_context(&mut tab, Some(&context), now)
            .await?;
        self.notifier.emit(EngineNotification::TabUpdated { tab });
        Ok(Some(assignment))
    }

    async fn on_updated(
        &mut self,
        tab_id: TabId,
        url: Option<String>,
        title: Option<String>,
        page: Option<PageSignals>,
        now: DateTime<Utc>,
    ) -> Result<Option<TabAssignment>> {
        let Some(mut tab) = self.store.get_tab(tab_id).await? else {
            log_warn!("update for unknown tab {tab_id}, ignoring");
            return Ok(None);
        };

        // parse before touching anything so a bad url leaves the tab intact
        if let Some(url) = url {
            tab.url = TabUrl::parse(&url)?;
        }
        if let Some(title) = title {
            tab.title = title;
        }
        if let Some(mut page) = page {
            page.extracted_at.get_or_insert(now);
            tab.page = Some(page);
        }

        let changed = tab.refresh_fingerprint();
        let assignment = if changed && !tab.manually_assigned {
            let context = self.tracker.get_context(tab.window_id, now).cloned();
            Some(
                self.classify_with_context(&mut tab, context.as_ref(), now)
                    .await?,
            )
        } else {
            self.store.put_tab(&tab).await?;
            None
        };

        self.notifier.emit(EngineNotification::TabUpdated { tab });
        Ok(assignment)
    }

    async fn on_removed(&mut self, tab_id: TabId) -> Result<()> {
        let window_id = self.store.get_tab(tab_id).await?.map(|tab| tab.window_id);
        self.store.delete_tab(tab_id).await?;
        self.active_tabs.retain(|_, active| active.tab_id != tab_id);

        if let Some(window_id) = window_id {
            if self.store.get_tabs_by_window(window_id).await?.is_empty() {
                log_debug!("window {window_id} has no tabs left, dropping its context");
                self.tracker.forget_window(window_id);
                self.active_tabs.remove(&window_id);
            }
        }
        Ok(())
    }

    async fn credit_dwell(&mut self, previous: ActiveTab, now: DateTime<Utc>) -> Result<()> {
        if let Some(mut tab) = self.store.get_tab(previous.tab_id).await? {
            tab.active_time_ms += elapsed_ms(previous.since, now);
            tab.last_active_at = now;
            self.store.put_tab(&tab).await?;
        }
        Ok(())
    }
}

fn elapsed_ms(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - since).num_milliseconds().max(0) as u64
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::error::EngineError;
    use crate::models::AssignmentMethod;
    use crate::settings::EngineSettings;
    use crate::store::MemoryStore;

    fn engine() -> AssignmentEngine<MemoryStore> {
        AssignmentEngine::new(Arc::new(MemoryStore::new()), &EngineSettings::default())
    }

    fn created(tab_id: TabId, url: &str) -> TabEvent {
        TabEvent::Created {
            tab_id,
            window_id: 1,
            url: url.into(),
            title: String::new(),
            opener_tab_id: None,
        }
    }

    #[tokio::test]
    async fn created_tab_is_stored_unassigned() {
        let mut engine = engine();
        let now = Utc::now();
        let result = engine
            .handle_event(
                TabEvent::Created {
                    tab_id: 2,
                    window_id: 1,
                    url: "https://github.com/org/repo".into(),
                    title: "Repo".into(),
                    opener_tab_id: Some(1),
                },
                now,
            )
            .await
            .unwrap();
        assert!(result.is_none());

        let tab = engine.store().get_tab(2).await.unwrap().unwrap();
        assert_eq!(tab.opener_tab_id, Some(1));
        assert!(tab.project_id.is_none());
    }

    #[tokio::test]
    async fn created_with_bad_url_is_invalid_input() {
        let mut engine = engine();
        let err = engine
            .handle_event(created(1, "not a url"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
        assert!(engine.store().get_tab(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn activation_classifies_and_credits_dwell() {
        let mut engine = engine();
        let start = Utc::now();
        engine.handle_event(created(1, "https://github.com/org/repo"), start).await.unwrap();
        engine.handle_event(created(2, "https://github.com/org/other"), start).await.unwrap();

        let first = engine
            .handle_event(TabEvent::Activated { tab_id: 1, window_id: 1 }, start)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.method, AssignmentMethod::Default);

        let later = start + Duration::seconds(45);
        let second = engine
            .handle_event(TabEvent::Activated { tab_id: 2, window_id: 1 }, later)
            .await
            .unwrap()
            .unwrap();
        // same host rule as the bootstrap project
        assert_eq!(second.project_id, first.project_id);

        let tab1 = engine.store().get_tab(1).await.unwrap().unwrap();
        assert_eq!(tab1.active_time_ms, 45_000);
        assert_eq!(tab1.last_active_at, later);
        assert!(engine.context(1, later).is_some());
    }

    #[tokio::test]
    async fn activation_of_unknown_tab_is_ignored() {
        let mut engine = engine();
        let result = engine
            .handle_event(TabEvent::Activated { tab_id: 9, window_id: 1 }, Utc::now())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn update_reclassifies_only_on_fingerprint_change() {
        let mut engine = engine();
        let now = Utc::now();
        engine.handle_event(created(1, "https://github.com/org/repo"), now).await.unwrap();
        engine
            .handle_event(TabEvent::Activated { tab_id: 1, window_id: 1 }, now)
            .await
            .unwrap();

        let same = engine
            .handle_event(
                TabEvent::Updated { tab_id: 1, url: None, title: None, page: None },
                now,
            )
            .await
            .unwrap();
        assert!(same.is_none());

        let moved = engine
            .handle_event(
                TabEvent::Updated {
                    tab_id: 1,
                    url: None,
                    title: Some("Pull requests".into()),
                    page: None,
                },
                now,
            )
            .await
            .unwrap();
        assert!(moved.is_some());
        let tab = engine.store().get_tab(1).await.unwrap().unwrap();
        assert_eq!(tab.title, "Pull requests");
    }

    #[tokio::test]
    async fn update_with_bad_url_leaves_tab_untouched() {
        let mut engine = engine();
        let now = Utc::now();
        engine.handle_event(created(1, "https://github.com/org/repo"), now).await.unwrap();
        let before = engine.store().get_tab(1).await.unwrap().unwrap();

        let result = engine
            .handle_event(
                TabEvent::Updated {
                    tab_id: 1,
                    url: Some("::".into()),
                    title: Some("changed".into()),
                    page: None,
                },
                now,
            )
            .await;
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
        assert_eq!(engine.store().get_tab(1).await.unwrap().unwrap(), before);
    }

    #[tokio::test]
    async fn removed_tab_is_deleted() {
        let mut engine = engine();
        let now = Utc::now();
        engine.handle_event(created(1, "https://github.com/org/repo"), now).await.unwrap();
        engine
            .handle_event(TabEvent::Activated { tab_id: 1, window_id: 1 }, now)
            .await
            .unwrap();
        engine.handle_event(TabEvent::Removed { tab_id: 1 }, now).await.unwrap();

        assert!(engine.store().get_tab(1).await.unwrap().is_none());
        assert!(engine.active_tabs.is_empty());
        assert!(engine.context(1, now).is_none());
    }

    #[tokio::test]
    async fn removing_one_of_several_tabs_keeps_window_context() {
        let mut engine = engine();
        let now = Utc::now();
        engine.handle_event(created(1, "https://github.com/org/repo"), now).await.unwrap();
        engine.handle_event(created(2, "https://github.com/org/other"), now).await.unwrap();
        engine
            .handle_event(TabEvent::Activated { tab_id: 1, window_id: 1 }, now)
            .await
            .unwrap();
        engine.handle_event(TabEvent::Removed { tab_id: 2 }, now).await.unwrap();

        assert!(engine.context(1, now).is_some());
        assert_eq!(engine.active_tabs.get(&1).map(|active| active.tab_id), Some(1));
    }

    #[tokio::test]
    async fn tab_moved_to_another_window_stops_accruing_dwell_in_the_first() {
        let mut engine = engine();
        let start = Utc::now();
        engine.handle_event(created(1, "https://github.com/org/repo"), start).await.unwrap();
        engine.handle_event(created(2, "https://github.com/org/other"), start).await.unwrap();

        engine
            .handle_event(TabEvent::Activated { tab_id: 1, window_id: 1 }, start)
            .await
            .unwrap();
        let moved = start + Duration::seconds(10);
        engine
            .handle_event(TabEvent::Activated { tab_id: 1, window_id: 2 }, moved)
            .await
            .unwrap();
        engine
            .handle_event(
                TabEvent::Activated { tab_id: 2, window_id: 1 },
                start + Duration::seconds(600),
            )
            .await
            .unwrap();

        let tab1 = engine.store().get_tab(1).await.unwrap().unwrap();
        assert_eq!(tab1.active_time_ms, 10_000);
        assert_eq!(tab1.window_id, 2);
        assert_eq!(tab1.last_active_at, moved);

        let active_windows: Vec<_> = engine
            .active_tabs
            .iter()
            .filter(|(_, active)| active.tab_id == 1)
            .map(|(window, _)| *window)
            .collect();
        assert_eq!(active_windows, vec![2]);
    }
}
