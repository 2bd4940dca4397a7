//! Explicit user commands. The only paths that override scoring or delete
//! projects.

use crate::assignment::AssignmentEngine;
use crate::error::{EngineError, Result};
use crate::events::EngineNotification;
use crate::models::{AssignmentMethod, Project, TabAssignment, TabId};
use crate::store::TabStore;

impl<S: TabStore> AssignmentEngine<S> {
    /// Pins a tab to a project. Returns `None` when the tab is unknown.
    pub async fn assign_manually(
        &mut self,
        tab_id: TabId,
        project_id: &str,
        subproject_id: Option<&str>,
    ) -> Result<Option<TabAssignment>> {
        let Some(mut tab) = self.store.get_tab(tab_id).await? else {
            return Ok(None);
        };
        let project = self.require_project(project_id).await?;
        if let Some(sub_id) = subproject_id {
            if project.subproject(sub_id).is_none() {
                return Err(EngineError::invalid_input(format!(
                    "subproject {sub_id} does not belong to project {project_id}"
                )));
            }
        }

        tab.assign(project.id.clone(), subproject_id.map(str::to_string));
        tab.manually_assigned = true;
        self.store.put_tab(&tab).await?;

        let assignment = TabAssignment {
            tab_id,
            project_id: project.id,
            subproject_id: tab.subproject_id.clone(),
            confidence: 1.0,
            method: AssignmentMethod::Manual,
        };
        self.notifier.emit(EngineNotification::Assigned {
            assignment: assignment.clone(),
        });
        self.notifier.emit(EngineNotification::TabUpdated { tab });
        Ok(Some(assignment))
    }

    /// Drops a manual override; the next activation rescores the tab.
    pub async fn clear_manual_assignment(&mut self, tab_id: TabId) -> Result<bool> {
        let Some(mut tab) = self.store.get_tab(tab_id).await? else {
            return Ok(false);
        };
        if !tab.manually_assigned {
            return Ok(false);
        }
        tab.manually_assigned = false;
        self.store.put_tab(&tab).await?;
        self.notifier.emit(EngineNotification::TabUpdated { tab });
        Ok(true)
    }

    pub async fn rename_project(&mut self, project_id: &str, name: &str) -> Result<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::invalid_input("project name must not be empty"));
        }
        let mut project = self.require_project(project_id).await?;
        project.name = name.to_string();
        self.store.put_project(&project).await?;
        Ok(project)
    }

    pub async fn set_project_flags(
        &mut self,
        project_id: &str,
        pinned: Option<bool>,
        locked: Option<bool>,
    ) -> Result<Project> {
        let mut project = self.require_project(project_id).await?;
        if let Some(pinned) = pinned {
            project.pinned = pinned;
        }
        if let Some(locked) = locked {
            project.locked = locked;
        }
        self.store.put_project(&project).await?;
        Ok(project)
    }

    /// Deletes a project and detaches its tabs. Returns the detached count.
    pub async fn delete_project(&mut self, project_id: &str) -> Result<usize> {
        self.require_project(project_id).await?;

        let tabs = self.store.get_tabs_by_project(project_id).await?;
        let detached = tabs.len();
        for mut tab in tabs {
            tab.detach();
            self.store.put_tab(&tab).await?;
            self.notifier.emit(EngineNotification::TabUpdated { tab });
        }
        self.store.delete_project(project_id).await?;
        Ok(detached)
    }

    async fn require_project(&self, project_id: &str) -> Result<Project> {
        self.store
            .get_project(project_id)
            .await?
            .ok_or_else(|| EngineError::invalid_input(format!("unknown project {project_id}")))
    }
}
