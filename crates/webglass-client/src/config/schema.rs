use std::time::Duration;

use serde::Deserialize;
use webglass_core::error::{Result, WebGlassError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    pub remote: RemoteSection,

    #[serde(default)]
    pub input: InputSection,

    #[serde(default)]
    pub navigation: NavigationSection,

    #[serde(default)]
    pub frames: FramesSection,

    #[serde(default = "default_settings_path")]
    pub settings_path: String,
}

impl ClientConfig {
    /// Defaults for everything but the remote endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            version: 1,
            remote: RemoteSection {
                url: url.into(),
                reconnect_delay_ms: default_reconnect_delay_ms(),
                username: None,
                password: None,
            },
            input: InputSection::default(),
            navigation: NavigationSection::default(),
            frames: FramesSection::default(),
            settings_path: default_settings_path(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(WebGlassError::UnsupportedVersion);
        }

        self.remote.validate()?;
        self.input.validate()?;
        self.navigation.validate()?;
        self.frames.validate()?;

        Ok(())
    }
}

fn default_settings_path() -> String {
    "webglass-settings.json".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteSection {
    pub url: String,

    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl RemoteSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(WebGlassError::Config(
                "remote.url must start with ws:// or wss://".into(),
            ));
        }
        if !(100..=60000).contains(&self.reconnect_delay_ms) {
            return Err(WebGlassError::Config(
                "remote.reconnect_delay_ms must be between 100 and 60000".into(),
            ));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(WebGlassError::Config(
                "remote.username and remote.password must be set together".into(),
            ));
        }
        Ok(())
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputSection {
    #[serde(default = "default_drag_threshold_px")]
    pub drag_threshold_px: f64,

    #[serde(default = "default_click_dwell_ms")]
    pub click_dwell_ms: u64,

    #[serde(default = "default_hover_throttle_ms")]
    pub hover_throttle_ms: u64,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            drag_threshold_px: default_drag_threshold_px(),
            click_dwell_ms: default_click_dwell_ms(),
            hover_throttle_ms: default_hover_throttle_ms(),
        }
    }
}

impl InputSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.drag_threshold_px > 0.0 && self.drag_threshold_px.is_finite()) {
            return Err(WebGlassError::Config(
                "input.drag_threshold_px must be a positive number".into(),
            ));
        }
        if !(10..=2000).contains(&self.click_dwell_ms) {
            return Err(WebGlassError::Config(
                "input.click_dwell_ms must be between 10 and 2000".into(),
            ));
        }
        if !(10..=5000).contains(&self.hover_throttle_ms) {
            return Err(WebGlassError::Config(
                "input.hover_throttle_ms must be between 10 and 5000".into(),
            ));
        }
        Ok(())
    }
}

fn default_drag_threshold_px() -> f64 {
    5.0
}
fn default_click_dwell_ms() -> u64 {
    150
}
fn default_hover_throttle_ms() -> u64 {
    200
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavigationSection {
    #[serde(default = "default_autofill_delay_ms")]
    pub autofill_delay_ms: u64,
}

impl Default for NavigationSection {
    fn default() -> Self {
        Self {
            autofill_delay_ms: default_autofill_delay_ms(),
        }
    }
}

impl NavigationSection {
    pub fn validate(&self) -> Result<()> {
        if self.autofill_delay_ms > 30000 {
            return Err(WebGlassError::Config(
                "navigation.autofill_delay_ms must be at most 30000".into(),
            ));
        }
        Ok(())
    }
}

fn default_autofill_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FramesSection {
    #[serde(default = "default_fps_window_ms")]
    pub fps_window_ms: u64,
}

impl Default for FramesSection {
    fn default() -> Self {
        Self {
            fps_window_ms: default_fps_window_ms(),
        }
    }
}

impl FramesSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=10000).contains(&self.fps_window_ms) {
            return Err(WebGlassError::Config(
                "frames.fps_window_ms must be between 100 and 10000".into(),
            ));
        }
        Ok(())
    }
}

fn default_fps_window_ms() -> u64 {
    1000
}
