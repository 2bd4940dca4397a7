//! Tab lifecycle events in, change notifications out.

pub mod controller;
pub mod handler;
pub mod loop_worker;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::{ActiveContext, PageSignals, Tab, TabAssignment, TabId, WindowId};

pub use controller::EngineController;

const NOTIFICATION_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TabEvent {
    Created {
        tab_id: TabId,
        window_id: WindowId,
        url: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        opener_tab_id: Option<TabId>,
    },
    Activated {
        tab_id: TabId,
        window_id: WindowId,
    },
    Updated {
        tab_id: TabId,
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        page: Option<PageSignals>,
    },
    Removed {
        tab_id: TabId,
    },
}

impl TabEvent {
    pub fn tab_id(&self) -> TabId {
        match self {
            TabEvent::Created { tab_id, .. }
            | TabEvent::Activated { tab_id, .. }
            | TabEvent::Updated { tab_id, .. }
            | TabEvent::Removed { tab_id } => *tab_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TabEvent::Created { .. } => "created",
            TabEvent::Activated { .. } => "activated",
            TabEvent::Updated { .. } => "updated",
            TabEvent::Removed { .. } => "removed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EngineNotification {
    ContextUpdated { context: ActiveContext },
    TabUpdated { tab: Tab },
    Assigned { assignment: TabAssignment },
}

/// Fire-and-forget fan-out of [`EngineNotification`]s.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<EngineNotification>,
}

impl Default for Notifier {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self { sender }
    }
}

impl Notifier {
    pub fn subscribe(&self) -> broadcast::Receiver<EngineNotification> {
        self.sender.subscribe()
    }

    /// Dropped silently when nobody is listening.
    pub fn emit(&self, notification: EngineNotification) {
        let _ = self.sender.send(notification);
    }
}
