// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Runtime preferences persisted as TOML.
//!
//! Views read their camera from here in `restore_settings` and write it back
//! in `save_settings`. Missing keys fall back to defaults so older files keep
//! loading.

use crate::error::PreferencesError;
use crate::settings;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Saved camera of one view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    pub zoom: f64,
    pub translation: [f64; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: f64,
    pub height: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: settings::render::DEFAULT_RESOLUTION.width,
            height: settings::render::DEFAULT_RESOLUTION.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixingSettings {
    pub limbo_scale: f64,
}

impl Default for MixingSettings {
    fn default() -> Self {
        Self {
            limbo_scale: settings::mixing::LIMBO_SCALE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionSettings {
    /// Seconds taken by `play`
    pub duration: f64,
    /// Cross fade into the new session instead of fading through the fade color
    pub cross_fade: bool,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            duration: settings::transition::DURATION,
            cross_fade: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Keyed by view name
    pub views: BTreeMap<String, ViewSettings>,
    pub render: RenderSettings,
    pub mixing: MixingSettings,
    pub transition: TransitionSettings,
    pub last_saved: Option<String>,
}

impl Preferences {
    pub fn view(&self, name: &str) -> Option<&ViewSettings> {
        self.views.get(name)
    }

    pub fn set_view(&mut self, name: &str, view: ViewSettings) {
        self.views.insert(name.to_string(), view);
    }

    pub fn from_toml(text: &str, path: &Path) -> Result<Self, PreferencesError> {
        toml::from_str(text).map_err(|source| PreferencesError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, PreferencesError> {
        let text = std::fs::read_to_string(path).map_err(|source| PreferencesError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let prefs = Self::from_toml(&text, path)?;
        tracing::info!("Loaded preferences from {}", path.display());
        Ok(prefs)
    }

    /// Write to `path`, stamping `last_saved`
    pub fn save(&mut self, path: &Path) -> Result<(), PreferencesError> {
        self.last_saved = Some(Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| PreferencesError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Saved preferences to {}", path.display());
        Ok(())
    }
}
