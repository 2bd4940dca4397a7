use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::assignment::AssignmentEngine;
use crate::store::TabStore;

use super::loop_worker::event_loop;
use super::TabEvent;

const EVENT_QUEUE_CAPACITY: usize = 1024;

/// Owns the background task that feeds tab events to the engine, one at a
/// time, in arrival order.
pub struct EngineController {
    sender: Option<mpsc::Sender<TabEvent>>,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl Default for EngineController {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineController {
    pub fn new() -> Self {
        Self {
            sender: None,
            handle: None,
            cancel_token: None,
        }
    }

    pub fn start<S>(&mut self, engine: AssignmentEngine<S>) -> Result<()>
    where
        S: TabStore + 'static,
    {
        if self.handle.is_some() {
            bail!("event loop already running");
        }

        let cancel_token = CancellationToken::new();
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);

        let handle = tokio::spawn(event_loop(engine, rx, cancel_token.clone()));

        self.sender = Some(tx);
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn submit(&self, event: TabEvent) -> Result<()> {
        let Some(sender) = &self.sender else {
            bail!("event loop not running");
        };
        sender
            .send(event)
            .await
            .context("event loop stopped accepting events")
    }

    /// Closes the queue and waits for already submitted events to drain.
    pub async fn finish(&mut self) -> Result<()> {
        self.sender.take();
        self.cancel_token.take();
        self.join().await
    }

    /// Stops after the event in flight; queued events are dropped.
    pub async fn stop(&mut self) -> Result<()> {
        self.sender.take();
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
            info!("cancellation sent to event loop");
        }
        self.join().await
    }

    async fn join(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            handle.await.context("event loop task failed to join")
        } else {
            Ok(())
        }
    }
}
