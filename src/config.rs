// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Persisted as JSON under the platform config directory. Missing or
//! unreadable files fall back to defaults so a broken config never blocks
//! a capture.

use crate::backends::device::types::Facing;
use crate::constants::{HOLD_THRESHOLD, MAX_RECORDING};
use crate::effects::DEFAULT_EFFECT_ID;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Facing used when a session starts
    pub default_facing: Facing,
    /// Effect activated when a session starts
    pub default_effect: String,
    /// Mirror the preview for the front camera (selfie mode)
    pub mirror_preview: bool,
    /// Tap/hold disambiguation threshold in milliseconds
    pub hold_threshold_ms: u64,
    /// Hard recording cap in seconds
    pub max_recording_secs: u64,
    /// Override for the photo output directory
    pub photos_dir: Option<PathBuf>,
    /// Override for the video output directory
    pub videos_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_facing: Facing::Front,
            default_effect: DEFAULT_EFFECT_ID.to_string(),
            mirror_preview: true, // Selfie-style preview by default
            hold_threshold_ms: HOLD_THRESHOLD.as_millis() as u64,
            max_recording_secs: MAX_RECORDING.as_secs(),
            photos_dir: None,
            videos_dir: None,
        }
    }
}

impl Config {
    /// Path of the config file under the platform config directory
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("booth").join("config.json"))
    }

    /// Load the config, falling back to defaults when absent or invalid
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist the config
    pub fn save(&self) -> AppResult<()> {
        let path = Self::path().ok_or_else(|| AppError::Config("no config directory".into()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(&path, json)?;
        Ok(())
    }
}
