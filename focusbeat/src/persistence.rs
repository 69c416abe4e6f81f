use crate::settings::{clamp_minutes, DurationProvider, Durations};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use focusbeat_ipc::SessionMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// On-disk shape. Field names match the keys the settings were first stored under.
#[derive(Serialize, Deserialize, Default)]
struct StoredSettings {
    #[serde(rename = "workDuration_seconds", default)]
    work_duration_seconds: Option<i64>,
    #[serde(rename = "breakDuration_seconds", default)]
    break_duration_seconds: Option<i64>,
}

/// User-adjustable durations backed by a small JSON file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    durations: Durations,
}

impl SettingsStore {
    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "focusbeat", "FocusBeat").map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Open the store in the platform data directory, or an in-memory one when
    /// no home directory can be determined.
    pub fn open_default() -> Self {
        match Self::data_dir() {
            Some(dir) => Self::open(dir.join("settings.json")),
            None => {
                warn!("Could not determine data directory, settings will not be saved");
                Self::in_memory(Durations::default())
            }
        }
    }

    /// Load from `path`. Never fails: anything unreadable is treated as absent.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let durations = match Self::read(&path) {
            Ok(Some(stored)) => Durations::sanitized(
                stored.work_duration_seconds,
                stored.break_duration_seconds,
            ),
            Ok(None) => Durations::default(),
            Err(e) => {
                warn!("Ignoring unreadable settings at {:?}: {:#}", path, e);
                Durations::default()
            }
        };
        debug!(?durations, "settings loaded");
        Self {
            path: Some(path),
            durations,
        }
    }

    pub fn in_memory(durations: Durations) -> Self {
        Self {
            path: None,
            durations,
        }
    }

    fn read(path: &Path) -> Result<Option<StoredSettings>> {
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file at {:?}", path))?;
        let stored = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings file at {:?}", path))?;
        Ok(Some(stored))
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let stored = StoredSettings {
            work_duration_seconds: Some(i64::from(self.durations.focus_secs)),
            break_duration_seconds: Some(i64::from(self.durations.break_secs)),
        };
        fs::write(path, serde_json::to_string_pretty(&stored)?)
            .with_context(|| format!("Failed to write settings file at {:?}", path))?;
        Ok(())
    }

    pub fn durations(&self) -> Durations {
        self.durations
    }

    pub fn set_minutes(&mut self, mode: SessionMode, minutes: i64) {
        *self.durations.secs_mut(mode) = clamp_minutes(minutes);
    }

    /// Nudge a duration by whole minutes, staying within bounds.
    pub fn step_minutes(&mut self, mode: SessionMode, delta: i64) {
        let current = i64::from(self.durations.secs_for(mode) / 60);
        self.set_minutes(mode, current + delta);
    }

    pub fn restore_defaults(&mut self) {
        self.durations = Durations::default();
    }
}

impl DurationProvider for SettingsStore {
    fn focus_secs(&self) -> u32 {
        self.durations.focus_secs
    }

    fn break_secs(&self) -> u32 {
        self.durations.break_secs
    }
}
