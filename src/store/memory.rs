use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::TabStore;
use crate::models::{Project, Tab, TabId, WindowId};

#[derive(Default)]
struct MemoryInner {
    tabs: BTreeMap<TabId, Tab>,
    projects: Vec<Project>,
}

/// In-process store; tabs come back ordered by id, projects by creation.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn tabs_where(&self, predicate: impl Fn(&Tab) -> bool) -> Result<Vec<Tab>> {
        Ok(self
            .lock()?
            .tabs
            .values()
            .filter(|tab| predicate(tab))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TabStore for MemoryStore {
    async fn get_tab(&self, tab_id: TabId) -> Result<Option<Tab>> {
        Ok(self.lock()?.tabs.get(&tab_id).cloned())
    }

    async fn put_tab(&self, tab: &Tab) -> Result<()> {
        self.lock()?.tabs.insert(tab.id, tab.clone());
        Ok(())
    }

    async fn delete_tab(&self, tab_id: TabId) -> Result<()> {
        self.lock()?.tabs.remove(&tab_id);
        Ok(())
    }

    async fn get_all_tabs(&self) -> Result<Vec<Tab>> {
        self.tabs_where(|_| true)
    }

    async fn get_tabs_by_project(&self, project_id: &str) -> Result<Vec<Tab>> {
        self.tabs_where(|tab| tab.project_id.as_deref() == Some(project_id))
    }

    async fn get_tabs_by_host(&self, host: &str) -> Result<Vec<Tab>> {
        self.tabs_where(|tab| tab.host() == host)
    }

    async fn get_tabs_by_window(&self, window_id: WindowId) -> Result<Vec<Tab>> {
        self.tabs_where(|tab| tab.window_id == window_id)
    }

    async fn get_project(&self, project_id: &str) -> Result<Option<Project>> {
        Ok(self
            .lock()?
            .projects
            .iter()
            .find(|project| project.id == project_id)
            .cloned())
    }

    async fn put_project(&self, project: &Project) -> Result<()> {
        let mut inner = self.lock()?;
        match inner.projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project.clone(),
            None => inner.projects.push(project.clone()),
        }
        Ok(())
    }

    async fn delete_project(&self, project_id: &str) -> Result<()> {
        self.lock()?.projects.retain(|project| project.id != project_id);
        Ok(())
    }

    async fn get_all_projects(&self) -> Result<Vec<Project>> {
        Ok(self.lock()?.projects.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn secondary_lookups_reflect_latest_writes() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let mut a = Tab::new(2, 10, "https://github.com/org/repo", "Repo", now).unwrap();
        let b = Tab::new(1, 11, "https://docs.rs/serde", "Serde", now).unwrap();
        store.put_tab(&a).await.unwrap();
        store.put_tab(&b).await.unwrap();

        a.project_id = Some("p".into());
        store.put_tab(&a).await.unwrap();

        assert_eq!(store.get_tabs_by_project("p").await.unwrap().len(), 1);
        assert_eq!(store.get_tabs_by_host("docs.rs").await.unwrap()[0].id, 1);
        assert_eq!(store.get_tabs_by_window(10).await.unwrap()[0].id, 2);
        let ids: Vec<TabId> = store.get_all_tabs().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);

        store.delete_tab(2).await.unwrap();
        assert!(store.get_tab(2).await.unwrap().is_none());
    }
}
