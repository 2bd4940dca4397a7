use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::assignment::AssignmentEngine;
use crate::error::EngineError;
use crate::store::TabStore;

use super::TabEvent;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

pub async fn event_loop<S: TabStore>(
    mut engine: AssignmentEngine<S>,
    mut events: mpsc::Receiver<TabEvent>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    log_info!("event queue closed, event loop exiting");
                    break;
                };
                let kind = event.kind();
                let tab_id = event.tab_id();
                match engine.handle_event(event, Utc::now()).await {
                    Ok(_) => {}
                    Err(EngineError::InvalidInput(reason)) => {
                        log_warn!("rejected {} event for tab {}: {}", kind, tab_id, reason)
                    }
                    Err(err) => log_error!("{} event for tab {} failed: {err:?}", kind, tab_id),
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("event loop shutting down");
                break;
            }
        }
    }
}
