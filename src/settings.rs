use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::context::ContextConfig;
use crate::matching::MatcherConfig;

/// Orchestrator thresholds and feedback rates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AssignmentConfig {
    /// A best match must score strictly above this to be committed
    pub assign_threshold: f64,
    /// Committed matches strictly above this are `deterministic`
    pub deterministic_threshold: f64,

    /// Centroid feedback weights after a committed match
    pub project_update_weight: f64,
    pub subproject_update_weight: f64,

    /// Path depth used for a synthesized project's first subproject
    pub seed_prefix_depth: usize,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            assign_threshold: 0.5,
            deterministic_threshold: 0.8,
            project_update_weight: 0.1,
            subproject_update_weight: 0.2,
            seed_prefix_depth: 2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineSettings {
    pub matcher: MatcherConfig,
    pub context: ContextConfig,
    pub assignment: AssignmentConfig,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<EngineSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unparseable settings at {}: {err}", path.display());
                EngineSettings::default()
            })
        } else {
            EngineSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, EngineSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, EngineSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn engine(&self) -> EngineSettings {
        self.read().clone()
    }

    pub fn update_engine(&self, settings: EngineSettings) -> Result<()> {
        let mut guard = self.write();
        *guard = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: EngineSettings = serde_json::from_str(&contents)?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &EngineSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.engine(), EngineSettings::default());
        assert_eq!(store.engine().matcher.weight_host, 3.0);
        assert_eq!(store.engine().context.freshness_ms, 5_000);
    }

    #[test]
    fn partial_json_fills_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"matcher":{"normalizeScores":true,"minScore":0.05}}"#).unwrap();

        let settings = SettingsStore::new(path).unwrap().engine();
        assert!(settings.matcher.normalize_scores);
        assert_eq!(settings.matcher.min_score, 0.05);
        assert_eq!(settings.matcher.weight_path, 2.0);
        assert_eq!(settings.assignment, AssignmentConfig::default());
    }

    #[test]
    fn updates_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut settings = store.engine();
        settings.assignment.assign_threshold = 1.5;
        store.update_engine(settings.clone()).unwrap();

        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.engine(), settings);
        reopened.reload().unwrap();
        assert_eq!(reopened.engine().assignment.assign_threshold, 1.5);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(SettingsStore::new(path).unwrap().engine(), EngineSettings::default());
    }
}
