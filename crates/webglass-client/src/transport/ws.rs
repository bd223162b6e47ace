//! tokio-tungstenite connector.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use futures_util::{future, SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;

use webglass_core::error::{Result, WebGlassError};

use crate::config::RemoteSection;
use crate::transport::codec;
use crate::transport::connector::{Connector, Link};

#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
    basic_auth: Option<(String, String)>,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            basic_auth: None,
        }
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((username.into(), password.into()));
        self
    }

    pub fn from_config(remote: &RemoteSection) -> Self {
        let c = Self::new(remote.url.clone());
        match (&remote.username, &remote.password) {
            (Some(u), Some(p)) => c.with_basic_auth(u.clone(), p.clone()),
            _ => c,
        }
    }

    fn authorization(&self) -> Result<Option<HeaderValue>> {
        let Some((user, pass)) = &self.basic_auth else {
            return Ok(None);
        };
        let token = STANDARD.encode(format!("{user}:{pass}"));
        HeaderValue::from_str(&format!("Basic {token}"))
            .map(Some)
            .map_err(|e| WebGlassError::Config(format!("invalid credentials: {e}")))
    }
}

#[async_trait]
impl Connector for WsConnector {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn connect(&self) -> Result<Link> {
        let mut req = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| WebGlassError::Config(format!("invalid remote url: {e}")))?;
        if let Some(auth) = self.authorization()? {
            req.headers_mut().insert(AUTHORIZATION, auth);
        }

        let (ws, resp) = connect_async(req)
            .await
            .map_err(|e| WebGlassError::Transport(format!("connect {} failed: {e}", self.url)))?;
        tracing::debug!(status = %resp.status(), "websocket upgraded");

        let (ws_tx, ws_rx) = ws.split();
        let sink = ws_tx
            .sink_map_err(|e| WebGlassError::Transport(e.to_string()))
            .with(|text: String| future::ready(Ok::<_, WebGlassError>(codec::encode(text))));
        let stream = ws_rx.filter_map(|item| future::ready(codec::decode(item)));

        Ok(Link::new(Box::pin(sink), Box::pin(stream)))
    }
}
