//! Storage collaborator contract.
//!
//! Misses are `Ok(None)` / empty vectors, never errors. Implementations must
//! give read-your-writes within one engine.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Project, Tab, TabId, WindowId};

pub use memory::MemoryStore;

#[async_trait]
pub trait TabStore: Send + Sync {
    async fn get_tab(&self, tab_id: TabId) -> Result<Option<Tab>>;
    async fn put_tab(&self, tab: &Tab) -> Result<()>;
    async fn delete_tab(&self, tab_id: TabId) -> Result<()>;
    async fn get_all_tabs(&self) -> Result<Vec<Tab>>;
    async fn get_tabs_by_project(&self, project_id: &str) -> Result<Vec<Tab>>;
    async fn get_tabs_by_host(&self, host: &str) -> Result<Vec<Tab>>;
    async fn get_tabs_by_window(&self, window_id: WindowId) -> Result<Vec<Tab>>;

    async fn get_project(&self, project_id: &str) -> Result<Option<Project>>;
    async fn put_project(&self, project: &Project) -> Result<()>;
    async fn delete_project(&self, project_id: &str) -> Result<()>;
    /// All projects in creation order.
    async fn get_all_projects(&self) -> Result<Vec<Project>>;
}
