//! Client state owner.
//!
//! `Client` is synchronous: it takes local input, channel transitions and
//! inbound text, and produces outbound messages plus `ClientEvent`s for the
//! presentation layer. It never blocks and never touches the network; the
//! session loop drains `drain_outbound()` into the channel after every step.
//! Every timed behavior is driven through `on_tick(now)` and `next_deadline()`.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use webglass_core::error::ErrorClass;
use webglass_core::protocol::{
    Ack, Bookmark, BookmarkList, Element, ElementFound, ElementRect, FillFormReport, HistoryList,
    NavKind, NavOutcome, OpResult, Outbound, Screenshot,
};

use crate::channel::ChannelState;
use crate::config::ClientConfig;
use crate::dispatch::{InboundHandler, MessageRouter};
use crate::frames::{Frame, FrameBuffer, FrameOutcome};
use crate::input::{key_request, Gesture, GestureConfig, GestureRecognizer, Phase, Point};
use crate::library::{HistoryEntry, Library};
use crate::nav::{NavState, NavigationStateMachine};
use crate::obs::ClientMetrics;
use crate::sched;
use crate::settings::{Settings, SettingsStore, MAX_FPS, MIN_FPS};

/// Timing knobs taken from the config file.
#[derive(Debug, Clone)]
pub struct Tunables {
    pub gestures: GestureConfig,
    pub autofill_delay: Duration,
    pub fps_window: Duration,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            gestures: GestureConfig::default(),
            autofill_delay: Duration::from_millis(1000),
            fps_window: Duration::from_millis(1000),
        }
    }
}

impl From<&ClientConfig> for Tunables {
    fn from(cfg: &ClientConfig) -> Self {
        Self {
            gestures: GestureConfig::from(&cfg.input),
            autofill_delay: Duration::from_millis(cfg.navigation.autofill_delay_ms),
            fps_window: Duration::from_millis(cfg.frames.fps_window_ms),
        }
    }
}

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Connectivity(ChannelState),
    /// User-visible, dismissible error.
    Error { class: ErrorClass, message: String },
    FrameRendered { frame: Frame, fps: Option<u32> },
    NavChanged(NavState),
    /// Page-loading indicator, independent of `NavState::is_loading`.
    LoadingIndicator(bool),
    ElementInfo(Element),
    Highlight(ElementRect),
    HideHighlight,
    /// Bookmarks, newest first.
    Bookmarks(Vec<Bookmark>),
    /// History, newest first.
    History(Vec<HistoryEntry>),
    FrameRateSet(u32),
}

pub struct Client {
    settings: Settings,
    store: Box<dyn SettingsStore>,
    metrics: Arc<ClientMetrics>,
    router: MessageRouter,
    gestures: GestureRecognizer,
    nav: NavigationStateMachine,
    frames: FrameBuffer,
    library: Library,
    connected: bool,
    page_loading: bool,
    /// URLs of bookmark add/remove requests awaiting a result, in send order.
    bookmark_adds: VecDeque<String>,
    bookmark_removals: VecDeque<String>,
    outbox: Vec<Outbound>,
    events: Vec<ClientEvent>,
}

impl Client {
    pub fn new(
        tunables: Tunables,
        settings: Settings,
        store: Box<dyn SettingsStore>,
        metrics: Arc<ClientMetrics>,
        now: Instant,
    ) -> Self {
        let mut router = MessageRouter::new(Arc::clone(&metrics));
        router.set_debug(settings.debug_mode);
        Self {
            settings,
            store,
            metrics,
            router,
            gestures: GestureRecognizer::new(tunables.gestures),
            nav: NavigationStateMachine::new(tunables.autofill_delay),
            frames: FrameBuffer::new(tunables.fps_window, now),
            library: Library::new(),
            connected: false,
            page_loading: false,
            bookmark_adds: VecDeque::new(),
            bookmark_removals: VecDeque::new(),
            outbox: Vec::new(),
            events: Vec::new(),
        }
    }

    // ---- accessors ----

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn nav(&self) -> &NavigationStateMachine {
        &self.nav
    }

    pub fn nav_state(&self) -> &NavState {
        self.nav.state()
    }

    pub fn frames(&self) -> &FrameBuffer {
        &self.frames
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn gesture_phase(&self) -> Phase {
        self.gestures.phase()
    }

    pub fn page_loading(&self) -> bool {
        self.page_loading
    }

    pub fn metrics(&self) -> &Arc<ClientMetrics> {
        &self.metrics
    }

    // ---- channel hooks ----

    pub fn on_channel_state(&mut self, state: &ChannelState) {
        let was = self.connected;
        self.connected = state.is_open();
        self.events.push(ClientEvent::Connectivity(state.clone()));

        if self.connected && !was {
            let fps = self.settings.effective_fps();
            self.send(Outbound::SetFrameRate { fps });
            self.send(Outbound::GetBookmarks);
            self.send(Outbound::GetHistory);
        } else if !self.connected && was {
            self.gestures.pointer_leave();
            self.bookmark_adds.clear();
            self.bookmark_removals.clear();
        }
    }

    pub fn on_transport_error(&mut self, message: &str) {
        self.surface(ErrorClass::Transport, message.to_string());
    }

    pub fn on_text(&mut self, text: &str, now: Instant) {
        let router = self.router.clone();
        router.dispatch_text(text, self, now);
    }

    // ---- timers ----

    pub fn next_deadline(&self) -> Option<Instant> {
        sched::earliest([self.gestures.next_deadline(), self.nav.next_deadline()])
    }

    pub fn on_tick(&mut self, now: Instant) {
        if let Some(g) = self.gestures.on_tick(now) {
            self.send_gesture(g);
        }
        if self.nav.on_tick(now) && self.settings.auto_fill_forms {
            self.send(Outbound::FillForm);
        }
    }

    // ---- navigation ----

    pub fn navigate(&mut self, url: &str, now: Instant) -> bool {
        let url = url.trim();
        if url.is_empty() {
            return false;
        }
        self.request_nav(NavKind::Navigate, Some(url), now)
    }

    pub fn back(&mut self, now: Instant) -> bool {
        self.request_nav(NavKind::Back, None, now)
    }

    pub fn forward(&mut self, now: Instant) -> bool {
        self.request_nav(NavKind::Forward, None, now)
    }

    pub fn refresh(&mut self, now: Instant) -> bool {
        self.request_nav(NavKind::Refresh, None, now)
    }

    pub fn home(&mut self, now: Instant) -> bool {
        self.request_nav(NavKind::Navigate, Some("about:blank"), now)
    }

    fn request_nav(&mut self, kind: NavKind, url: Option<&str>, now: Instant) -> bool {
        if !self.connected {
            self.drop_precondition(kind.request_type());
            return false;
        }
        match self.nav.request(kind, url, now) {
            Ok(msg) => {
                self.send(msg);
                self.set_page_loading(true);
                self.events.push(ClientEvent::NavChanged(self.nav.state().clone()));
                true
            }
            Err(rejection) => {
                tracing::debug!(kind = kind.request_type(), ?rejection, "navigation control disabled");
                false
            }
        }
    }

    // ---- pointer / keyboard ----

    pub fn pointer_down(&mut self, x: f64, y: f64, now: Instant) {
        if !self.connected {
            return;
        }
        self.gestures.pointer_down(Point::new(x, y), now);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, now: Instant) {
        if !self.connected {
            return;
        }
        if let Some(g) = self.gestures.pointer_move(Point::new(x, y), now) {
            self.send_gesture(g);
        }
    }

    pub fn pointer_up(&mut self, x: f64, y: f64, now: Instant) {
        if !self.connected {
            self.gestures.pointer_leave();
            return;
        }
        if let Some(g) = self.gestures.pointer_up(Point::new(x, y), now) {
            self.send_gesture(g);
        }
    }

    /// Pointer left the surface: abort any press and hide the highlight.
    pub fn pointer_leave(&mut self) {
        self.gestures.pointer_leave();
        self.events.push(ClientEvent::HideHighlight);
    }

    pub fn key(&mut self, key: &str) {
        match key_request(key) {
            Some(msg) => self.send(msg),
            None => tracing::trace!(key, "key ignored"),
        }
    }

    pub fn wheel(&mut self, dx: f64, dy: f64) {
        self.send(Outbound::Scroll { x: dx, y: dy });
    }

    pub fn visibility_regained(&mut self) {
        self.send(Outbound::GetScreenshot { force_new: true });
    }

    fn send_gesture(&mut self, g: Gesture) {
        let msg = match g {
            Gesture::Click(p) => Outbound::Click { x: p.x, y: p.y },
            Gesture::Drag { start, end } => Outbound::Drag {
                start_x: start.x,
                start_y: start.y,
                end_x: end.x,
                end_y: end.y,
            },
            Gesture::Hover(p) => Outbound::GetElementInfo { x: p.x, y: p.y },
        };
        self.send(msg);
    }

    // ---- bookmarks / history / privacy ----

    pub fn toggle_bookmark(&mut self) {
        if !self.connected {
            self.drop_precondition("toggle_bookmark");
            return;
        }
        let state = self.nav.state();
        let url = state.url().to_string();
        if state.is_bookmarked() {
            self.bookmark_removals.push_back(url.clone());
            self.send(Outbound::RemoveBookmark { url });
        } else {
            let title = match state.title() {
                Some(t) if !t.is_empty() => t.to_string(),
                _ => url.clone(),
            };
            self.bookmark_adds.push_back(url.clone());
            self.send(Outbound::AddBookmark { url, title });
        }
    }

    pub fn remove_bookmark(&mut self, url: &str) {
        if !self.connected {
            self.drop_precondition("remove_bookmark");
            return;
        }
        self.bookmark_removals.push_back(url.to_string());
        self.send(Outbound::RemoveBookmark { url: url.to_string() });
    }

    pub fn request_bookmarks(&mut self) {
        self.send(Outbound::GetBookmarks);
    }

    pub fn request_history(&mut self) {
        self.send(Outbound::GetHistory);
    }

    pub fn clear_history(&mut self) {
        if !self.connected {
            self.drop_precondition("clear_history");
            return;
        }
        self.send(Outbound::ClearHistory);
        self.library.clear_history();
        self.events.push(ClientEvent::History(Vec::new()));
    }

    pub fn clear_cookies(&mut self) {
        self.send(Outbound::ClearCookies);
    }

    pub fn clear_form_data(&mut self) {
        self.send(Outbound::ClearFormData);
    }

    /// One `add_form_data` per field.
    pub fn save_form_data<I>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (field, value) in fields {
            self.send(Outbound::AddFormData { field, value });
        }
    }

    pub fn execute_script(&mut self, script: impl Into<String>, args: Vec<Value>) {
        self.send(Outbound::ExecuteScript {
            script: script.into(),
            args,
        });
    }

    // ---- settings ----

    /// Store a new frame-rate limit (clamped) and ask the remote for it.
    pub fn set_fps_limit(&mut self, fps: u32) {
        let fps = fps.clamp(MIN_FPS, MAX_FPS);
        self.settings.fps_limit = fps;
        self.persist();
        self.send(Outbound::SetFrameRate { fps });
    }

    pub fn set_auto_fill(&mut self, on: bool) {
        self.settings.auto_fill_forms = on;
        self.persist();
        if !on {
            self.nav.cancel_autofill();
        }
    }

    pub fn set_highlight_elements(&mut self, on: bool) {
        self.settings.highlight_elements = on;
        self.persist();
        if !on {
            self.events.push(ClientEvent::HideHighlight);
        }
    }

    pub fn set_debug_mode(&mut self, on: bool) {
        self.settings.debug_mode = on;
        self.router.set_debug(on);
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.settings) {
            tracing::warn!(error = %e, "settings not saved");
        }
    }

    // ---- outputs ----

    /// Messages to send, in order.
    pub fn drain_outbound(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    pub fn drain_events(&mut self) -> Vec<ClientEvent> {
        std::mem::take(&mut self.events)
    }

    fn send(&mut self, msg: Outbound) {
        if !self.connected {
            self.drop_precondition(msg.msg_type());
            return;
        }
        if self.router.debug() {
            tracing::debug!(msg_type = msg.msg_type(), "outbound");
        }
        self.outbox.push(msg);
    }

    fn drop_precondition(&self, what: &str) {
        self.metrics.outbound_dropped.inc(&[("type", what)]);
        tracing::debug!(what, class = ErrorClass::Precondition.as_str(), "not connected, request dropped");
    }

    fn surface(&mut self, class: ErrorClass, message: String) {
        tracing::warn!(class = class.as_str(), %message, "error");
        if class.is_user_visible() {
            self.events.push(ClientEvent::Error { class, message });
        }
    }

    fn set_page_loading(&mut self, on: bool) {
        if self.page_loading != on {
            self.page_loading = on;
            self.events.push(ClientEvent::LoadingIndicator(on));
        }
    }

    fn accept_frame(&mut self, data: &str, now: Instant) {
        let frame = match Frame::from_base64(data) {
            Ok(frame) => frame,
            Err(e) => {
                self.metrics.decode_errors.inc(&[("class", e.class().as_str())]);
                tracing::warn!(error = %e, "screenshot dropped");
                return;
            }
        };
        match self.frames.accept(frame.clone(), now) {
            FrameOutcome::Rendered => {
                self.metrics.frames.inc(&[("outcome", "rendered")]);
                let fps = self.frames.fps();
                if let Some(fps) = fps {
                    self.metrics.fps.set(&[], i64::from(fps));
                }
                self.set_page_loading(false);
                self.events.push(ClientEvent::FrameRendered { frame, fps });
            }
            FrameOutcome::DroppedDuplicate => {
                self.metrics.frames.inc(&[("outcome", "duplicate")]);
            }
        }
    }

    fn bookmark_confirmed(&mut self, url: Option<String>, bookmarked: bool) {
        let current = url.as_deref() == Some(self.nav.state().url());
        if current && self.nav.set_bookmarked(bookmarked) {
            self.events.push(ClientEvent::NavChanged(self.nav.state().clone()));
        }
        self.send(Outbound::GetBookmarks);
    }
}

impl InboundHandler for Client {
    fn on_screenshot(&mut self, shot: Screenshot, now: Instant) {
        match shot.page_info {
            Some(OpResult::Success(info)) => {
                if self.nav.apply_page_info(&info) {
                    self.events.push(ClientEvent::NavChanged(self.nav.state().clone()));
                }
            }
            Some(other) => {
                tracing::debug!(message = other.error_message().unwrap_or(""), "page info unavailable");
            }
            None => {}
        }
        self.accept_frame(&shot.data, now);
    }

    fn on_screenshot_result(&mut self, data: Option<String>, error: Option<String>, now: Instant) {
        match (data, error) {
            (Some(data), _) => self.accept_frame(&data, now),
            (None, Some(error)) => tracing::warn!(%error, "forced screenshot failed"),
            (None, None) => tracing::debug!("empty screenshot_result"),
        }
    }

    fn on_nav_result(&mut self, kind: NavKind, result: OpResult<NavOutcome>, now: Instant) {
        let effect = self
            .nav
            .on_result(kind, &result, now, self.settings.auto_fill_forms);
        if let Some(p) = effect.completed {
            self.metrics.nav_latency.observe(
                &[("kind", p.kind.request_type())],
                now.saturating_duration_since(p.sent_at),
            );
        }
        self.set_page_loading(false);
        if let Some(message) = effect.error {
            self.surface(ErrorClass::Operation, message);
        }
        if effect.changed {
            self.events.push(ClientEvent::NavChanged(self.nav.state().clone()));
        }
    }

    fn on_element_info(&mut self, result: OpResult<ElementFound>) {
        match result {
            OpResult::Success(ElementFound { element: Some(el) }) => {
                if self.settings.highlight_elements {
                    self.events.push(ClientEvent::Highlight(el.rect));
                }
                self.events.push(ClientEvent::ElementInfo(el));
            }
            OpResult::Success(ElementFound { element: None }) => {}
            other => tracing::debug!(message = other.error_message().unwrap_or(""), "no element info"),
        }
    }

    fn on_fill_form(&mut self, result: OpResult<FillFormReport>) {
        match result {
            OpResult::Success(report) => tracing::info!(results = %report.results, "forms filled"),
            other => tracing::warn!(message = other.error_message().unwrap_or(""), "form fill failed"),
        }
    }

    fn on_bookmarks(&mut self, result: OpResult<BookmarkList>) {
        match result {
            OpResult::Success(list) => {
                self.library.set_bookmarks(list.bookmarks);
                let listing = self.library.bookmarks("").into_iter().cloned().collect();
                self.events.push(ClientEvent::Bookmarks(listing));
            }
            other => self.result_error("get_bookmarks", &other),
        }
    }

    fn on_bookmark_added(&mut self, result: OpResult<Ack>) {
        let url = self.bookmark_adds.pop_front();
        match result {
            OpResult::Success(_) => self.bookmark_confirmed(url, true),
            other => self.result_error("add_bookmark", &other),
        }
    }

    fn on_bookmark_removed(&mut self, result: OpResult<Ack>) {
        let url = self.bookmark_removals.pop_front();
        match result {
            OpResult::Success(_) => self.bookmark_confirmed(url, false),
            other => self.result_error("remove_bookmark", &other),
        }
    }

    fn on_history(&mut self, result: OpResult<HistoryList>) {
        match result {
            OpResult::Success(list) => {
                self.library.set_history(list.history);
                let listing = self.library.history("");
                self.events.push(ClientEvent::History(listing));
            }
            other => self.result_error("get_history", &other),
        }
    }

    fn on_frame_rate_set(&mut self, fps: u32) {
        tracing::info!(fps, "remote frame rate set");
        self.events.push(ClientEvent::FrameRateSet(fps));
    }

    fn on_action_ack(&mut self, action: String, result: OpResult<Value>) {
        match result {
            OpResult::Error { .. } => {
                tracing::warn!(%action, message = result.error_message().unwrap_or(""), "action failed")
            }
            _ => tracing::trace!(%action, "action acknowledged"),
        }
    }

    fn on_remote_error(&mut self, message: String) {
        self.surface(ErrorClass::Operation, message);
    }
}

impl Client {
    /// `error` results are surfaced; `info` results are logged only.
    fn result_error<T>(&mut self, op: &str, result: &OpResult<T>) {
        match result {
            OpResult::Error { .. } => {
                let message = result.error_message().unwrap_or("unknown error").to_string();
                self.surface(ErrorClass::Operation, format!("{op}: {message}"));
            }
            OpResult::Info { message } => {
                tracing::info!(op, message = message.as_deref().unwrap_or(""), "remote info")
            }
            OpResult::Success(_) => {}
        }
    }
}
