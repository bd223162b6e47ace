//! Top-level facade crate for webglass.
//!
//! Re-exports the protocol core and the client runtime so users can depend on
//! a single crate, plus `spawn` for the common case of one session against a
//! URL with default tunables.

use std::sync::Arc;

use tokio::sync::mpsc;

pub mod core {
    pub use webglass_core::*;
}

pub mod client {
    pub use webglass_client::*;
}

pub mod prelude {
    pub use webglass_client::config::ClientConfig;
    pub use webglass_client::settings::{JsonFileStore, MemoryStore, Settings, SettingsStore};
    pub use webglass_client::{
        ChannelState, Client, ClientEvent, Connector, LocalInput, Session, SessionHandle,
        WsConnector,
    };
    pub use webglass_core::{ErrorClass, Result, WebGlassError};
}

use prelude::*;

/// Validate `url`, then spawn a session on the current tokio runtime with
/// in-memory settings.
pub fn spawn(url: &str) -> Result<(SessionHandle, mpsc::UnboundedReceiver<ClientEvent>)> {
    let cfg = ClientConfig::new(url);
    cfg.validate()?;
    let (session, events) = Session::new(
        WsConnector::from_config(&cfg.remote),
        &cfg,
        Settings::default(),
        Box::new(MemoryStore::new()),
        Arc::new(webglass_client::obs::ClientMetrics::new()),
    );
    Ok((session.spawn(), events))
}
