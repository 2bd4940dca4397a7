pub mod assignment;
pub mod context;
pub mod db;
pub mod error;
pub mod events;
pub mod features;
pub mod matching;
pub mod models;
pub mod settings;
pub mod store;
mod utils;

use std::{io::Write, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use assignment::AssignmentEngine;
use db::Database;
use events::{EngineController, EngineNotification, TabEvent};
use settings::SettingsStore;

pub use error::{EngineError, Result as EngineResult};

const DATA_DIR_ENV: &str = "TABFOCUS_DATA_DIR";
const DEFAULT_DATA_DIR: &str = ".tabfocus";

fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub fn run() -> Result<()> {
    // Info by default; RUST_LOG overrides
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("tabfocus starting up...");

    let data_dir = data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let settings = SettingsStore::new(data_dir.join("settings.json"))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(serve(data_dir, settings))
}

async fn serve(data_dir: PathBuf, settings: SettingsStore) -> Result<()> {
    let database = Database::new(data_dir.join("tabfocus.sqlite3"))?;
    let engine = AssignmentEngine::new(Arc::new(database), &settings.engine());

    let printer = tokio::spawn(print_notifications(engine.subscribe()));

    let mut controller = EngineController::new();
    controller.start(engine)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let interrupted = loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break false;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<TabEvent>(line) {
                    Ok(event) => controller.submit(event).await?,
                    Err(err) => warn!("skipping malformed event line: {err}"),
                }
            }
            _ = &mut shutdown => {
                info!("interrupt received, shutting down");
                break true;
            }
        }
    };

    if interrupted {
        controller.stop().await?;
    } else {
        controller.finish().await?;
    }

    printer
        .await
        .context("notification printer failed to join")?;
    info!("tabfocus stopped");
    Ok(())
}

/// Writes each notification as one JSON line on stdout until the engine
/// goes away.
async fn print_notifications(mut rx: broadcast::Receiver<EngineNotification>) {
    loop {
        match rx.recv().await {
            Ok(notification) => match serde_json::to_string(&notification) {
                Ok(line) => {
                    let mut stdout = std::io::stdout().lock();
                    if let Err(err) = writeln!(stdout, "{line}") {
                        warn!("failed to write notification: {err}");
                    }
                }
                Err(err) => warn!("failed to encode notification: {err}"),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("notification printer lagged, {skipped} notifications dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
