//! User settings and their store.
//!
//! The store is a boundary: the client only reads `auto_fill_forms`,
//! `fps_limit`, `highlight_elements` and `debug_mode` as behavioral toggles.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use webglass_core::error::{Result, WebGlassError};

pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub quality: Quality,
    pub fps_limit: u32,
    pub theme: Theme,
    pub highlight_elements: bool,
    pub debug_mode: bool,
    pub auto_fill_forms: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: Quality::Medium,
            fps_limit: 10,
            theme: Theme::Light,
            highlight_elements: true,
            debug_mode: false,
            auto_fill_forms: true,
        }
    }
}

impl Settings {
    /// Frame rate to request from the remote.
    pub fn effective_fps(&self) -> u32 {
        self.fps_limit.clamp(MIN_FPS, MAX_FPS)
    }
}

pub trait SettingsStore: Send {
    fn load(&self) -> Result<Settings>;
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// JSON file store. A missing file means defaults.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load, falling back to defaults when the file is unreadable or corrupt.
    pub fn load_or_default(&self) -> Settings {
        match self.load() {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "settings unreadable, using defaults");
                Settings::default()
            }
        }
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Settings> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
            Err(e) => {
                return Err(WebGlassError::Config(format!(
                    "read settings failed ({}): {e}",
                    self.path.display()
                )))
            }
        };
        serde_json::from_str(&raw)
            .map_err(|e| WebGlassError::Config(format!("invalid settings json: {e}")))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let raw = serde_json::to_string_pretty(settings)
            .map_err(|e| WebGlassError::Internal(format!("settings encode failed: {e}")))?;
        fs::write(&self.path, raw).map_err(|e| {
            WebGlassError::Config(format!("write settings failed ({}): {e}", self.path.display()))
        })
    }
}

/// In-memory store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Option<Settings>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(settings: Settings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(settings))),
        }
    }

    /// Last saved settings, if any.
    pub fn saved(&self) -> Option<Settings> {
        self.inner.lock().ok().and_then(|g| g.clone())
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Settings> {
        let g = self
            .inner
            .lock()
            .map_err(|_| WebGlassError::Internal("settings lock poisoned".into()))?;
        Ok(g.clone().unwrap_or_default())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let mut g = self
            .inner
            .lock()
            .map_err(|_| WebGlassError::Internal("settings lock poisoned".into()))?;
        *g = Some(settings.clone());
        Ok(())
    }
}
