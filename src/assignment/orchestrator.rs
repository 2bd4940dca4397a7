use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::assignment::synthesis::{apply_feedback, synthesize_project};
use crate::context::ContextTracker;
use crate::error::Result;
use crate::events::{EngineNotification, Notifier};
use crate::matching::Matcher;
use crate::models::{
    ActiveContext, AssignmentMethod, Project, ScoringResult, Tab, TabAssignment, TabId, WindowId,
};
use crate::settings::{AssignmentConfig, EngineSettings};
use crate::store::TabStore;

// Set to true to log every assignment decision
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// The tab currently holding focus in a window, for dwell accounting.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ActiveTab {
    pub tab_id: TabId,
    pub since: DateTime<Utc>,
}

/// Decides which project each tab belongs to and feeds the result back
/// into project centroids. Owns the per-window context cache; the store is
/// shared with whoever else reads it.
pub struct AssignmentEngine<S: TabStore> {
    pub(crate) store: Arc<S>,
    pub(crate) matcher: Matcher,
    pub(crate) tracker: ContextTracker,
    pub(crate) config: AssignmentConfig,
    pub(crate) notifier: Notifier,
    pub(crate) active_tabs: HashMap<WindowId, ActiveTab>,
}

impl<S: TabStore> AssignmentEngine<S> {
    pub fn new(store: Arc<S>, settings: &EngineSettings) -> Self {
        Self {
            store,
            matcher: Matcher::new(settings.matcher.clone()),
            tracker: ContextTracker::new(settings.context.clone()),
            config: settings.assignment.clone(),
            notifier: Notifier::default(),
            active_tabs: HashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineNotification> {
        self.notifier.subscribe()
    }

    /// Cached context for a window, if still fresh.
    pub fn context(&self, window_id: WindowId, now: DateTime<Utc>) -> Option<&ActiveContext> {
        self.tracker.get_context(window_id, now)
    }

    /// Refreshes the tab's window context, then classifies it.
    pub async fn classify_tab(&mut self, tab: &mut Tab, now: DateTime<Utc>) -> Result<TabAssignment> {
        let context = self.refresh_context(tab, now).await?;
        self.classify_with_context(tab, Some(&context), now).await
    }

    pub(crate) async fn refresh_context(&mut self, tab: &Tab, now: DateTime<Utc>) -> Result<ActiveContext> {
        let context = self
            .tracker
            .update_context(self.store.as_ref(), tab.window_id, tab, now)
            .await?;
        self.notifier.emit(EngineNotification::ContextUpdated {
            context: context.clone(),
        });
        Ok(context)
    }

    /// Runs the assignment decision for `tab` and commits it.
    ///
    /// The tab is updated in place and written back. A failed project
    /// feedback write is logged; the returned assignment stands.
    pub async fn classify_with_context(
        &mut self,
        tab: &mut Tab,
        context: Option<&ActiveContext>,
        now: DateTime<Utc>,
    ) -> Result<TabAssignment> {
        let assignment = match manual_assignment(tab) {
            Some(assignment) => assignment,
            None => self.decide(tab, context, now).await?,
        };

        self.store.put_tab(tab).await?;

        log_info!(
            "tab {} -> project {} ({}, confidence {:.3})",
            tab.id,
            assignment.project_id,
            assignment.method.as_str(),
            assignment.confidence
        );
        self.notifier.emit(EngineNotification::Assigned {
            assignment: assignment.clone(),
        });
        Ok(assignment)
    }

    async fn decide(
        &mut self,
        tab: &mut Tab,
        context: Option<&ActiveContext>,
        now: DateTime<Utc>,
    ) -> Result<TabAssignment> {
        let projects = self.store.get_all_projects().await?;
        let tokens = tab.features();

        if projects.is_empty() {
            return self.create_project_for(tab, &tokens, 0, now).await;
        }

        match self.matcher.best_match(tab, &projects, context, now) {
            Some(best) if best.score > self.config.assign_threshold => {
                Ok(self.commit_match(tab, &tokens, &projects, best, now).await)
            }
            best => {
                log_debug!(
                    "tab {}: best score {:?} does not clear {}, creating project",
                    tab.id,
                    best.map(|result| result.score),
                    self.config.assign_threshold
                );
                self.create_project_for(tab, &tokens, projects.len(), now)
                    .await
            }
        }
    }

    async fn commit_match(
        &mut self,
        tab: &mut Tab,
        tokens: &[String],
        projects: &[Project],
        best: ScoringResult,
        now: DateTime<Utc>,
    ) -> TabAssignment {
        tab.assign(best.project_id.clone(), best.subproject_id.clone());

        if let Some(project) = projects.iter().find(|project| project.id == best.project_id) {
            let updated = apply_feedback(
                project,
                best.subproject_id.as_deref(),
                tokens,
                &self.config,
                now,
            );
            if let Err(err) = self.store.put_project(&updated).await {
                log_warn!(
                    "feedback write for project {} failed after assigning tab {}: {err:?}",
                    project.id,
                    tab.id
                );
            }
        }

        let method = if best.score > self.config.deterministic_threshold {
            AssignmentMethod::Deterministic
        } else {
            AssignmentMethod::Semantic
        };

        TabAssignment {
            tab_id: tab.id,
            project_id: best.project_id,
            subproject_id: best.subproject_id,
            confidence: best.score,
            method,
        }
    }

    async fn create_project_for(
        &mut self,
        tab: &mut Tab,
        tokens: &[String],
        project_count: usize,
        now: DateTime<Utc>,
    ) -> Result<TabAssignment> {
        let project = synthesize_project(tab, tokens, project_count, &self.config, now);
        self.store.put_project(&project).await?;

        let subproject_id = project.subprojects.first().map(|sub| sub.id.clone());
        tab.assign(project.id.clone(), subproject_id.clone());

        log_info!("created project {} ({}) for tab {}", project.name, project.id, tab.id);

        Ok(TabAssignment {
            tab_id: tab.id,
            project_id: project.id,
            subproject_id,
            confidence: 1.0,
            method: AssignmentMethod::Default,
        })
    }
}

/// A manually pinned tab short-circuits scoring entirely.
fn manual_assignment(tab: &Tab) -> Option<TabAssignment> {
    if !tab.manually_assigned {
        return None;
    }
    tab.project_id.as_ref().map(|project_id| TabAssignment {
        tab_id: tab.id,
        project_id: project_id.clone(),
        subproject_id: tab.subproject_id.clone(),
        confidence: 1.0,
        method: AssignmentMethod::Manual,
    })
}
