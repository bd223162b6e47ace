//! Navigation state machine.
//!
//! Mirrors the remote browser's navigation status. Fields change only on
//! confirmed remote results and `page_info` pushes, except the loading flag,
//! which is raised when a navigation-class request is sent and lowered when
//! any navigation-class result arrives. There is no timeout on a pending
//! request: without a result the machine stays `Loading` until a new
//! `navigate` supersedes it.

use std::time::{Duration, Instant};

use webglass_core::protocol::{NavKind, NavOutcome, OpResult, Outbound, PageInfo};

use crate::sched::Deadline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    Secure,
    Insecure,
}

impl Security {
    pub fn classify(url: &str) -> Self {
        if url.starts_with("https:") {
            Security::Secure
        } else {
            Security::Insecure
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Security::Secure => "secure",
            Security::Insecure => "insecure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPhase {
    Idle,
    Loading,
}

/// Local mirror of the remote page. Read-only outside this module.
#[derive(Debug, Clone, PartialEq)]
pub struct NavState {
    url: String,
    can_go_back: bool,
    can_go_forward: bool,
    is_bookmarked: bool,
    is_loading: bool,
    title: Option<String>,
    favicon: Option<String>,
    security: Security,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            url: "about:blank".to_string(),
            can_go_back: false,
            can_go_forward: false,
            is_bookmarked: false,
            is_loading: false,
            title: None,
            favicon: None,
            security: Security::Insecure,
        }
    }
}

impl NavState {
    pub fn url(&self) -> &str {
        &self.url
    }
    pub fn can_go_back(&self) -> bool {
        self.can_go_back
    }
    pub fn can_go_forward(&self) -> bool {
        self.can_go_forward
    }
    pub fn is_bookmarked(&self) -> bool {
        self.is_bookmarked
    }
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
    pub fn favicon(&self) -> Option<&str> {
        self.favicon.as_deref()
    }
    pub fn security(&self) -> Security {
        self.security
    }

    /// Title shown for the page; the remote may send none.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => "Untitled",
        }
    }

    fn set_url(&mut self, url: &str) {
        if self.url != url {
            self.url = url.to_string();
        }
        self.security = Security::classify(url);
    }
}

/// The outstanding navigation-class request. At most one is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    pub kind: NavKind,
    pub sent_at: Instant,
}

/// Why a navigation request was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavRejection {
    /// Another request is in flight and this control is disabled.
    Busy,
    /// Back/forward is not available on the remote.
    Unavailable,
}

/// What applying a result did.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEffect {
    /// The request this result completed, if one was pending.
    pub completed: Option<PendingRequest>,
    /// Error text to surface to the user.
    pub error: Option<String>,
    /// Whether any state field changed.
    pub changed: bool,
}

#[derive(Debug)]
pub struct NavigationStateMachine {
    state: NavState,
    pending: Option<PendingRequest>,
    autofill: Deadline<()>,
    autofill_delay: Duration,
}

impl NavigationStateMachine {
    pub fn new(autofill_delay: Duration) -> Self {
        Self {
            state: NavState::default(),
            pending: None,
            autofill: Deadline::new(),
            autofill_delay,
        }
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn phase(&self) -> NavPhase {
        if self.pending.is_some() {
            NavPhase::Loading
        } else {
            NavPhase::Idle
        }
    }

    pub fn pending(&self) -> Option<PendingRequest> {
        self.pending
    }

    /// Whether the control for `kind` is currently enabled.
    pub fn is_enabled(&self, kind: NavKind) -> bool {
        match kind {
            NavKind::Navigate => true,
            NavKind::Back => self.pending.is_none() && self.state.can_go_back,
            NavKind::Forward => self.pending.is_none() && self.state.can_go_forward,
            NavKind::Refresh => self.pending.is_none(),
        }
    }

    /// Build and record a navigation-class request.
    ///
    /// `navigate` is always accepted and supersedes a pending request; the
    /// other controls are disabled while `Loading`.
    pub fn request(
        &mut self,
        kind: NavKind,
        url: Option<&str>,
        now: Instant,
    ) -> Result<Outbound, NavRejection> {
        if !self.is_enabled(kind) {
            return Err(if self.pending.is_some() {
                NavRejection::Busy
            } else {
                NavRejection::Unavailable
            });
        }
        if let Some(prev) = self.pending {
            tracing::debug!(prev = prev.kind.request_type(), next = kind.request_type(), "pending navigation superseded");
        }
        self.set_pending(Some(PendingRequest { kind, sent_at: now }));
        Ok(Outbound::nav(kind, url))
    }

    /// Apply a `*_result`. Any navigation-class result returns to `Idle`.
    /// Applying the same result twice leaves the same end state.
    pub fn on_result(
        &mut self,
        kind: NavKind,
        result: &OpResult<NavOutcome>,
        now: Instant,
        autofill_enabled: bool,
    ) -> ResultEffect {
        let before = self.state.clone();
        let completed = self.pending.take();
        if let Some(p) = completed {
            if p.kind != kind {
                tracing::debug!(pending = p.kind.request_type(), got = kind.result_type(), "result kind differs from pending request");
            }
        }
        self.state.is_loading = false;

        let error = match result {
            OpResult::Success(outcome) => {
                self.state.set_url(&outcome.url);
                if let Some(back) = outcome.can_go_back {
                    self.state.can_go_back = back;
                }
                if let Some(forward) = outcome.can_go_forward {
                    self.state.can_go_forward = forward;
                }
                if autofill_enabled {
                    self.autofill.arm_after(now, self.autofill_delay, ());
                }
                None
            }
            OpResult::Error { .. } => result.error_message().map(str::to_string),
            OpResult::Info { message } => {
                tracing::info!(kind = kind.result_type(), message = message.as_deref().unwrap_or(""), "navigation info");
                None
            }
        };

        ResultEffect {
            completed,
            error,
            changed: self.state != before,
        }
    }

    /// Apply an unsolicited `page_info` push. Trusted whether or not a
    /// request is pending; leaves the loading flag alone.
    pub fn apply_page_info(&mut self, info: &PageInfo) -> bool {
        let before = self.state.clone();
        self.state.title = info.title.clone();
        self.state.set_url(&info.url);
        self.state.is_bookmarked = info.is_bookmarked;
        self.state.favicon = info.favicon.clone().filter(|f| !f.is_empty());
        self.state.can_go_back = info.can_go_back;
        self.state.can_go_forward = info.can_go_forward;
        self.state != before
    }

    /// Confirmed bookmark add/remove for the current page.
    pub fn set_bookmarked(&mut self, bookmarked: bool) -> bool {
        let changed = self.state.is_bookmarked != bookmarked;
        self.state.is_bookmarked = bookmarked;
        changed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.autofill.at()
    }

    /// Whether the autofill request is due now.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        self.autofill.take_due(now).is_some()
    }

    pub fn cancel_autofill(&mut self) {
        self.autofill.cancel();
    }

    fn set_pending(&mut self, pending: Option<PendingRequest>) {
        self.state.is_loading = pending.is_some();
        self.pending = pending;
    }
}

impl Default for NavigationStateMachine {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}
