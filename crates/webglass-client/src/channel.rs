//! Channel manager: owns the one live link to the remote browser.
//!
//! States: `Connecting -> Open -> Closed(reason)`. Any close other than a
//! deliberate one schedules a new attempt after a fixed delay (no backoff).
//! Each attempt builds a fresh link; nothing survives a reconnect.
//!
//! `next_event` is cancel-safe: the in-flight connect future, the open
//! stream and the retry deadline all live in `self`, so dropping the
//! returned future inside `select!` loses nothing.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tracing::Instrument;

use webglass_core::error::{ErrorClass, Result};
use webglass_core::protocol::Outbound;

use crate::obs::ClientMetrics;
use crate::sched::{self, Deadline};
use crate::transport::{Connector, Link};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// No attempt has been made yet.
    NotStarted,
    /// The connect attempt itself failed.
    ConnectFailed(String),
    /// The remote ended the stream.
    Remote,
    /// A read or write on the open link failed.
    Error(String),
    /// `close()` was called; no reconnect follows.
    Deliberate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed(CloseReason),
}

impl ChannelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelState::Connecting => "connecting",
            ChannelState::Open => "open",
            ChannelState::Closed(_) => "closed",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ChannelState::Open)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Every state transition, in order.
    State(ChannelState),
    /// One inbound text frame.
    Text(String),
    /// Transport failure to surface to the user. Never fatal.
    TransportError(String),
}

type ConnectFuture = Pin<Box<dyn Future<Output = Result<Link>> + Send>>;

enum Conn {
    Idle,
    Connecting(ConnectFuture),
    Open(Link),
}

pub struct ChannelManager<C: Connector> {
    connector: Arc<C>,
    state: ChannelState,
    conn: Conn,
    retry: Deadline<()>,
    reconnect_delay: Duration,
    attempts: u64,
    shut: bool,
    pending: VecDeque<ChannelEvent>,
    metrics: Arc<ClientMetrics>,
}

impl<C: Connector> ChannelManager<C> {
    pub fn new(connector: C, reconnect_delay: Duration, metrics: Arc<ClientMetrics>) -> Self {
        Self {
            connector: Arc::new(connector),
            state: ChannelState::Closed(CloseReason::NotStarted),
            conn: Conn::Idle,
            retry: Deadline::new(),
            reconnect_delay,
            attempts: 0,
            shut: false,
            pending: VecDeque::new(),
            metrics,
        }
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Connect attempts made so far; also the generation of the current link.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn endpoint(&self) -> &str {
        self.connector.endpoint()
    }

    /// Events queued but not yet returned by `next_event`.
    pub fn take_events(&mut self) -> Vec<ChannelEvent> {
        self.pending.drain(..).collect()
    }

    /// When the next reconnect attempt is due, if one is scheduled.
    pub fn retry_at(&self) -> Option<std::time::Instant> {
        self.retry.at()
    }

    /// Start a connect attempt. No-op after a deliberate close or while a
    /// link is already connecting or open.
    pub fn open(&mut self) {
        if self.shut || !matches!(self.conn, Conn::Idle) {
            return;
        }
        self.retry.cancel();
        self.attempts += 1;
        self.metrics.connect_attempts.inc(&[]);

        let connector = Arc::clone(&self.connector);
        let span = tracing::info_span!("connect", attempt = self.attempts, endpoint = %connector.endpoint());
        self.conn = Conn::Connecting(Box::pin(
            async move { connector.connect().await }.instrument(span),
        ));
        self.transition(ChannelState::Connecting);
    }

    /// Wait for the next channel event, driving connects and reconnects.
    pub async fn next_event(&mut self) -> ChannelEvent {
        loop {
            if let Some(ev) = self.pending.pop_front() {
                return ev;
            }
            match &mut self.conn {
                Conn::Connecting(fut) => {
                    let res = fut.as_mut().await;
                    match res {
                        Ok(link) => {
                            self.conn = Conn::Open(link);
                            self.transition(ChannelState::Open);
                        }
                        Err(e) => {
                            self.conn = Conn::Idle;
                            let msg = e.to_string();
                            self.pending.push_back(ChannelEvent::TransportError(msg.clone()));
                            self.lost(CloseReason::ConnectFailed(msg));
                        }
                    }
                }
                Conn::Open(link) => match link.stream.next().await {
                    Some(Ok(text)) => return ChannelEvent::Text(text),
                    Some(Err(e)) if e.class() == ErrorClass::Protocol => {
                        self.metrics
                            .decode_errors
                            .inc(&[("class", e.class().as_str())]);
                        tracing::warn!(error = %e, "undecodable frame dropped");
                    }
                    Some(Err(e)) => {
                        self.conn = Conn::Idle;
                        let msg = e.to_string();
                        self.pending.push_back(ChannelEvent::TransportError(msg.clone()));
                        self.lost(CloseReason::Error(msg));
                    }
                    None => {
                        self.conn = Conn::Idle;
                        self.lost(CloseReason::Remote);
                    }
                },
                Conn::Idle => {
                    sched::sleep_until(self.retry.at()).await;
                    if self.retry.take_due(sched::now()).is_some() {
                        tracing::info!(attempt = self.attempts + 1, "reconnecting");
                        self.open();
                    }
                }
            }
        }
    }

    /// Send one message. Returns `false` when the channel is not open; the
    /// message is dropped, never queued.
    pub async fn send(&mut self, msg: &Outbound) -> bool {
        let Conn::Open(link) = &mut self.conn else {
            self.metrics.outbound_dropped.inc(&[("type", msg.msg_type())]);
            tracing::debug!(msg_type = msg.msg_type(), "channel not open, message dropped");
            return false;
        };
        let text = match msg.to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(msg_type = msg.msg_type(), error = %e, "encode failed");
                return false;
            }
        };
        match link.sink.send(text).await {
            Ok(()) => {
                self.metrics.outbound_messages.inc(&[("type", msg.msg_type())]);
                true
            }
            Err(e) => {
                self.conn = Conn::Idle;
                let msg = e.to_string();
                self.pending.push_back(ChannelEvent::TransportError(msg.clone()));
                self.lost(CloseReason::Error(msg));
                false
            }
        }
    }

    /// Close for good: no reconnect is scheduled afterwards.
    pub async fn close(&mut self) {
        self.shut = true;
        self.retry.cancel();
        if let Conn::Open(link) = &mut self.conn {
            if let Err(e) = link.sink.close().await {
                tracing::debug!(error = %e, "close handshake failed");
            }
        }
        self.conn = Conn::Idle;
        if self.state != ChannelState::Closed(CloseReason::Deliberate) {
            self.transition(ChannelState::Closed(CloseReason::Deliberate));
        }
    }

    fn lost(&mut self, reason: CloseReason) {
        tracing::warn!(?reason, delay_ms = self.reconnect_delay.as_millis() as u64, "channel closed");
        self.transition(ChannelState::Closed(reason));
        if !self.shut {
            self.retry.arm_after(sched::now(), self.reconnect_delay, ());
        }
    }

    fn transition(&mut self, next: ChannelState) {
        tracing::info!(from = self.state.as_str(), to = next.as_str(), "channel transition");
        self.metrics
            .channel_transitions
            .inc(&[("state", next.as_str())]);
        self.state = next.clone();
        self.pending.push_back(ChannelEvent::State(next));
    }
}
