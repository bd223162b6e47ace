//! Client config loader (strict parsing).

pub mod schema;

use std::fs;

use webglass_core::error::{Result, WebGlassError};

pub use schema::{
    ClientConfig, FramesSection, InputSection, NavigationSection, RemoteSection,
};

/// Environment variable that overrides the config path.
pub const CONFIG_ENV: &str = "WEBGLASS_CONFIG";
/// Config path used when `WEBGLASS_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "webglass.yaml";

pub fn load_from_file(path: &str) -> Result<ClientConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| WebGlassError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ClientConfig> {
    let cfg: ClientConfig = serde_yaml::from_str(s)
        .map_err(|e| WebGlassError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the config path from the environment.
pub fn config_path() -> String {
    std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}
