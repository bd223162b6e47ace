//! Message router.
//!
//! Classifies each inbound text frame as a typed message, an unknown type or
//! a malformed frame, then hands typed messages to exactly one
//! `InboundHandler` method. Nothing here closes the channel.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use webglass_core::error::WebGlassError;
use webglass_core::protocol::{
    Ack, BookmarkList, ElementFound, Envelope, FillFormReport, HistoryList, Inbound, NavKind,
    NavOutcome, OpResult, Screenshot,
};

use crate::obs::ClientMetrics;

/// Debug-mode logs show at most this many characters of a raw message.
const DEBUG_PREVIEW_CHARS: usize = 50;

/// Result of classifying one inbound text frame.
#[derive(Debug)]
pub enum Routed {
    Message(Inbound),
    /// Well-formed envelope with a `type` nobody handles.
    Unknown(String),
    /// Not JSON, no `type`, or a payload that does not match its type.
    Malformed(WebGlassError),
}

/// Decode `text` into a typed message without touching any state.
pub fn route(text: &str) -> Routed {
    let env = match Envelope::decode(text) {
        Ok(env) => env,
        Err(e) => return Routed::Malformed(e),
    };
    let msg_type = env.msg_type().to_string();
    match Inbound::from_envelope(env) {
        Ok(Some(msg)) => Routed::Message(msg),
        Ok(None) => Routed::Unknown(msg_type),
        Err(e) => Routed::Malformed(e),
    }
}

/// One handler per inbound message type.
pub trait InboundHandler {
    fn on_screenshot(&mut self, shot: Screenshot, now: Instant);
    fn on_screenshot_result(&mut self, data: Option<String>, error: Option<String>, now: Instant);
    fn on_nav_result(&mut self, kind: NavKind, result: OpResult<NavOutcome>, now: Instant);
    fn on_element_info(&mut self, result: OpResult<ElementFound>);
    fn on_fill_form(&mut self, result: OpResult<FillFormReport>);
    fn on_bookmarks(&mut self, result: OpResult<BookmarkList>);
    fn on_bookmark_added(&mut self, result: OpResult<Ack>);
    fn on_bookmark_removed(&mut self, result: OpResult<Ack>);
    fn on_history(&mut self, result: OpResult<HistoryList>);
    fn on_frame_rate_set(&mut self, fps: u32);
    fn on_action_ack(&mut self, action: String, result: OpResult<Value>);
    fn on_remote_error(&mut self, message: String);
}

/// Routes inbound text to an `InboundHandler`.
///
/// Unknown types and malformed messages are logged and counted, never
/// propagated: a bad message must not stop the session.
#[derive(Clone)]
pub struct MessageRouter {
    metrics: Arc<ClientMetrics>,
    debug: bool,
}

impl MessageRouter {
    pub fn new(metrics: Arc<ClientMetrics>) -> Self {
        Self {
            metrics,
            debug: false,
        }
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Decode and dispatch one text frame. Returns how it was classified.
    pub fn dispatch_text<H: InboundHandler>(&self, text: &str, handler: &mut H, now: Instant) -> RouteKind {
        match route(text) {
            Routed::Message(msg) => {
                let msg_type = msg.msg_type();
                self.metrics
                    .inbound_messages
                    .inc(&[("type", msg_type.as_str())]);
                if self.debug {
                    tracing::info!(msg_type = %msg_type, preview = %preview(text), "inbound");
                }
                self.dispatch(msg, handler, now);
                RouteKind::Handled
            }
            Routed::Unknown(msg_type) => {
                self.metrics.unknown_types.inc(&[("type", msg_type.as_str())]);
                tracing::debug!(msg_type = %msg_type, "unknown message type ignored");
                RouteKind::Unknown
            }
            Routed::Malformed(e) => {
                self.metrics
                    .decode_errors
                    .inc(&[("class", e.class().as_str())]);
                tracing::warn!(error = %e, preview = %preview(text), "malformed message dropped");
                RouteKind::Malformed
            }
        }
    }

    pub fn dispatch<H: InboundHandler>(&self, msg: Inbound, handler: &mut H, now: Instant) {
        match msg {
            Inbound::Screenshot(shot) => handler.on_screenshot(shot, now),
            Inbound::ScreenshotResult { data, error } => handler.on_screenshot_result(data, error, now),
            Inbound::NavResult { kind, result } => handler.on_nav_result(kind, result, now),
            Inbound::ElementInfo(result) => handler.on_element_info(result),
            Inbound::FillForm(result) => handler.on_fill_form(result),
            Inbound::Bookmarks(result) => handler.on_bookmarks(result),
            Inbound::BookmarkAdded(result) => handler.on_bookmark_added(result),
            Inbound::BookmarkRemoved(result) => handler.on_bookmark_removed(result),
            Inbound::History(result) => handler.on_history(result),
            Inbound::FrameRateSet { fps } => handler.on_frame_rate_set(fps),
            Inbound::ActionAck { action, result } => handler.on_action_ack(action, result),
            Inbound::Error { message } => handler.on_remote_error(message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Handled,
    Unknown,
    Malformed,
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(DEBUG_PREVIEW_CHARS).collect();
    if text.chars().nth(DEBUG_PREVIEW_CHARS).is_some() {
        out.push_str("...");
    }
    out
}
