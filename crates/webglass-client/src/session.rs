//! Session driver.
//!
//! One task owns the channel manager and the client. Each loop turn waits on
//! whichever comes first: a channel event, a local input command, or the
//! earliest client deadline. Afterwards pending outbound messages are written
//! to the channel and client events are forwarded to the presentation side.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use webglass_core::error::{Result, WebGlassError};

use crate::channel::{ChannelEvent, ChannelManager};
use crate::client::{Client, ClientEvent, Tunables};
use crate::config::ClientConfig;
use crate::obs::ClientMetrics;
use crate::sched;
use crate::settings::{Settings, SettingsStore};
use crate::transport::Connector;

const INPUT_QUEUE: usize = 256;

/// Commands from the presentation side.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalInput {
    Navigate(String),
    Back,
    Forward,
    Refresh,
    Home,
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    PointerLeave,
    Key(String),
    Wheel { dx: f64, dy: f64 },
    VisibilityRegained,
    ToggleBookmark,
    RemoveBookmark(String),
    RequestBookmarks,
    RequestHistory,
    ClearHistory,
    ClearCookies,
    ClearFormData,
    SaveFormData(Vec<(String, String)>),
    ExecuteScript { script: String, args: Vec<Value> },
    SetFpsLimit(u32),
    SetAutoFill(bool),
    SetHighlightElements(bool),
    SetDebugMode(bool),
}

pub struct Session<C: Connector> {
    channel: ChannelManager<C>,
    client: Client,
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl<C: Connector> Session<C> {
    pub fn new(
        connector: C,
        cfg: &ClientConfig,
        settings: Settings,
        store: Box<dyn SettingsStore>,
        metrics: Arc<ClientMetrics>,
    ) -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let channel = ChannelManager::new(connector, cfg.remote.reconnect_delay(), Arc::clone(&metrics));
        let client = Client::new(Tunables::from(cfg), settings, store, metrics, sched::now());
        (
            Self {
                channel,
                client,
                events,
            },
            events_rx,
        )
    }

    /// Run until the input side closes or a shutdown is requested.
    pub async fn run(
        mut self,
        mut input: mpsc::Receiver<LocalInput>,
        mut shutdown: mpsc::Receiver<()>,
    ) -> Result<()> {
        self.channel.open();
        loop {
            let deadline = self.client.next_deadline();
            tokio::select! {
                ev = self.channel.next_event() => match ev {
                    ChannelEvent::State(state) => self.client.on_channel_state(&state),
                    ChannelEvent::Text(text) => self.client.on_text(&text, sched::now()),
                    ChannelEvent::TransportError(msg) => self.client.on_transport_error(&msg),
                },

                cmd = input.recv() => match cmd {
                    Some(cmd) => self.apply(cmd),
                    None => break,
                },

                _ = shutdown.recv() => break,

                _ = sched::sleep_until(deadline) => self.client.on_tick(sched::now()),
            }
            self.flush().await;
        }

        self.channel.close().await;
        for ev in self.channel.take_events() {
            if let ChannelEvent::State(state) = ev {
                self.client.on_channel_state(&state);
            }
        }
        self.forward_events();
        tracing::info!("session stopped");
        Ok(())
    }

    /// Spawn the session on the current runtime.
    pub fn spawn(self) -> SessionHandle {
        let (input_tx, input_rx) = mpsc::channel(INPUT_QUEUE);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let span = tracing::info_span!("session", endpoint = %self.channel.endpoint());
        let task = tokio::spawn(self.run(input_rx, shutdown_rx).instrument(span));
        SessionHandle {
            input: input_tx,
            shutdown: shutdown_tx,
            task,
        }
    }

    fn apply(&mut self, cmd: LocalInput) {
        let now = sched::now();
        let c = &mut self.client;
        match cmd {
            LocalInput::Navigate(url) => {
                c.navigate(&url, now);
            }
            LocalInput::Back => {
                c.back(now);
            }
            LocalInput::Forward => {
                c.forward(now);
            }
            LocalInput::Refresh => {
                c.refresh(now);
            }
            LocalInput::Home => {
                c.home(now);
            }
            LocalInput::PointerDown { x, y } => c.pointer_down(x, y, now),
            LocalInput::PointerMove { x, y } => c.pointer_move(x, y, now),
            LocalInput::PointerUp { x, y } => c.pointer_up(x, y, now),
            LocalInput::PointerLeave => c.pointer_leave(),
            LocalInput::Key(key) => c.key(&key),
            LocalInput::Wheel { dx, dy } => c.wheel(dx, dy),
            LocalInput::VisibilityRegained => c.visibility_regained(),
            LocalInput::ToggleBookmark => c.toggle_bookmark(),
            LocalInput::RemoveBookmark(url) => c.remove_bookmark(&url),
            LocalInput::RequestBookmarks => c.request_bookmarks(),
            LocalInput::RequestHistory => c.request_history(),
            LocalInput::ClearHistory => c.clear_history(),
            LocalInput::ClearCookies => c.clear_cookies(),
            LocalInput::ClearFormData => c.clear_form_data(),
            LocalInput::SaveFormData(fields) => c.save_form_data(fields),
            LocalInput::ExecuteScript { script, args } => c.execute_script(script, args),
            LocalInput::SetFpsLimit(fps) => c.set_fps_limit(fps),
            LocalInput::SetAutoFill(on) => c.set_auto_fill(on),
            LocalInput::SetHighlightElements(on) => c.set_highlight_elements(on),
            LocalInput::SetDebugMode(on) => c.set_debug_mode(on),
        }
    }

    async fn flush(&mut self) {
        for msg in self.client.drain_outbound() {
            if !self.channel.send(&msg).await {
                tracing::debug!(msg_type = msg.msg_type(), "outbound not delivered");
            }
        }
        self.forward_events();
    }

    fn forward_events(&mut self) {
        for ev in self.client.drain_events() {
            if self.events.send(ev).is_err() {
                tracing::trace!("event receiver gone");
            }
        }
    }
}

/// Handle to a spawned session.
pub struct SessionHandle {
    input: mpsc::Sender<LocalInput>,
    shutdown: mpsc::Sender<()>,
    task: JoinHandle<Result<()>>,
}

impl SessionHandle {
    pub async fn send(&self, cmd: LocalInput) -> Result<()> {
        self.input
            .send(cmd)
            .await
            .map_err(|_| WebGlassError::Internal("session stopped".into()))
    }

    /// Sender for feeding input from another task.
    pub fn input(&self) -> mpsc::Sender<LocalInput> {
        self.input.clone()
    }

    /// Close the channel deliberately (no reconnect) and wait for the task.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown.send(()).await;
        self.task
            .await
            .map_err(|e| WebGlassError::Internal(format!("session task failed: {e}")))?
    }
}
