use anyhow::Result;
use async_trait::async_trait;

use super::Database;
use crate::models::{Project, Tab, TabId, WindowId};
use crate::store::TabStore;

#[async_trait]
impl TabStore for Database {
    async fn get_tab(&self, tab_id: TabId) -> Result<Option<Tab>> {
        self.get_tab_by_id(tab_id).await
    }

    async fn put_tab(&self, tab: &Tab) -> Result<()> {
        self.upsert_tab(tab).await
    }

    async fn delete_tab(&self, tab_id: TabId) -> Result<()> {
        self.remove_tab(tab_id).await
    }

    async fn get_all_tabs(&self) -> Result<Vec<Tab>> {
        self.list_tabs().await
    }

    async fn get_tabs_by_project(&self, project_id: &str) -> Result<Vec<Tab>> {
        self.list_tabs_for_project(project_id).await
    }

    async fn get_tabs_by_host(&self, host: &str) -> Result<Vec<Tab>> {
        self.list_tabs_for_host(host).await
    }

    async fn get_tabs_by_window(&self, window_id: WindowId) -> Result<Vec<Tab>> {
        self.list_tabs_for_window(window_id).await
    }

    async fn get_project(&self, project_id: &str) -> Result<Option<Project>> {
        self.get_project_by_id(project_id).await
    }

    async fn put_project(&self, project: &Project) -> Result<()> {
        self.upsert_project(project).await
    }

    async fn delete_project(&self, project_id: &str) -> Result<()> {
        self.remove_project(project_id).await
    }

    async fn get_all_projects(&self) -> Result<Vec<Project>> {
        self.list_projects().await
    }
}
