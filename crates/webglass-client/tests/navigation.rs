#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::{Duration, Instant};

use webglass_client::nav::{NavPhase, NavRejection, NavigationStateMachine, Security};
use webglass_core::protocol::{NavKind, NavOutcome, OpResult, Outbound, PageInfo};

fn ok(url: &str, back: bool, forward: bool) -> OpResult<NavOutcome> {
    OpResult::Success(NavOutcome {
        url: url.to_string(),
        can_go_back: Some(back),
        can_go_forward: Some(forward),
    })
}

fn failed(message: &str) -> OpResult<NavOutcome> {
    OpResult::Error {
        message: Some(message.to_string()),
    }
}

#[test]
fn navigate_success_updates_state_and_returns_to_idle() {
    let t0 = Instant::now();
    let mut nav = NavigationStateMachine::default();

    let msg = nav
        .request(NavKind::Navigate, Some("https://example.com"), t0)
        .unwrap();
    assert_eq!(
        msg,
        Outbound::Navigate {
            url: "https://example.com".into()
        }
    );
    assert_eq!(nav.phase(), NavPhase::Loading);
    assert!(nav.state().is_loading());
    // url does not change optimistically
    assert_eq!(nav.state().url(), "about:blank");

    let effect = nav.on_result(NavKind::Navigate, &ok("https://example.com/", true, false), t0, false);
    assert!(effect.changed);
    assert_eq!(effect.error, None);
    assert_eq!(effect.completed.map(|p| p.kind), Some(NavKind::Navigate));

    let st = nav.state();
    assert_eq!(nav.phase(), NavPhase::Idle);
    assert!(!st.is_loading());
    assert_eq!(st.url(), "https://example.com/");
    assert!(st.can_go_back());
    assert!(!st.can_go_forward());
    assert_eq!(st.security(), Security::Secure);
}

#[test]
fn error_result_keeps_url_and_reports_message() {
    let t0 = Instant::now();
    let mut nav = NavigationStateMachine::default();
    nav.request(NavKind::Navigate, Some("https://a.test"), t0).unwrap();
    nav.on_result(NavKind::Navigate, &ok("https://a.test/", false, false), t0, false);

    nav.request(NavKind::Navigate, Some("https://b.test"), t0).unwrap();
    let effect = nav.on_result(NavKind::Navigate, &failed("Navigation timeout"), t0, false);

    assert_eq!(effect.error.as_deref(), Some("Navigation timeout"));
    assert_eq!(nav.state().url(), "https://a.test/");
    assert_eq!(nav.phase(), NavPhase::Idle);
}

#[test]
fn error_without_message_uses_default_text() {
    let t0 = Instant::now();
    let mut nav = NavigationStateMachine::default();
    nav.request(NavKind::Refresh, None, t0).unwrap();
    let effect = nav.on_result(NavKind::Refresh, &OpResult::Error { message: None }, t0, false);
    assert_eq!(effect.error.as_deref(), Some("unknown error"));
}

#[test]
fn applying_same_result_twice_is_idempotent() {
    let t0 = Instant::now();
    let mut nav = NavigationStateMachine::default();
    nav.request(NavKind::Navigate, Some("http://x.test"), t0).unwrap();

    let r = ok("http://x.test/", true, true);
    nav.on_result(NavKind::Navigate, &r, t0, false);
    let once = nav.state().clone();
    let effect = nav.on_result(NavKind::Navigate, &r, t0, false);

    assert_eq!(nav.state(), &once);
    assert!(!effect.changed);
    assert_eq!(effect.completed, None);
    assert_eq!(nav.state().security(), Security::Insecure);
}

#[test]
fn back_forward_refresh_disabled_while_loading() {
    let t0 = Instant::now();
    let mut nav = NavigationStateMachine::default();
    nav.request(NavKind::Navigate, Some("https://a.test"), t0).unwrap();
    nav.on_result(NavKind::Navigate, &ok("https://a.test/", true, true), t0, false);

    nav.request(NavKind::Navigate, Some("https://b.test"), t0).unwrap();
    assert!(!nav.is_enabled(NavKind::Back));
    assert_eq!(nav.request(NavKind::Back, None, t0), Err(NavRejection::Busy));
    assert_eq!(nav.request(NavKind::Refresh, None, t0), Err(NavRejection::Busy));

    // navigate supersedes the pending request
    assert!(nav.request(NavKind::Navigate, Some("https://c.test"), t0).is_ok());
    assert_eq!(nav.pending().map(|p| p.kind), Some(NavKind::Navigate));
}

#[test]
fn back_requires_history() {
    let t0 = Instant::now();
    let mut nav = NavigationStateMachine::default();
    assert_eq!(nav.request(NavKind::Back, None, t0), Err(NavRejection::Unavailable));
    assert_eq!(nav.request(NavKind::Forward, None, t0), Err(NavRejection::Unavailable));
    assert_eq!(nav.request(NavKind::Refresh, None, t0), Ok(Outbound::Refresh));
}

#[test]
fn page_info_push_is_trusted_while_loading() {
    let t0 = Instant::now();
    let mut nav = NavigationStateMachine::default();
    nav.request(NavKind::Navigate, Some("https://slow.test"), t0).unwrap();

    let changed = nav.apply_page_info(&PageInfo {
        title: Some("Redirected".into()),
        url: "https://other.test/".into(),
        is_bookmarked: true,
        favicon: Some(String::new()),
        can_go_back: true,
        can_go_forward: false,
    });
    assert!(changed);

    let st = nav.state();
    assert_eq!(st.url(), "https://other.test/");
    assert_eq!(st.display_title(), "Redirected");
    assert!(st.is_bookmarked());
    assert_eq!(st.favicon(), None);
    // page_info does not end the pending request
    assert!(st.is_loading());
    assert_eq!(nav.phase(), NavPhase::Loading);
}

#[test]
fn missing_title_displays_untitled() {
    let mut nav = NavigationStateMachine::default();
    nav.apply_page_info(&PageInfo {
        url: "about:blank".into(),
        ..PageInfo::default()
    });
    assert_eq!(nav.state().display_title(), "Untitled");
}

#[test]
fn success_schedules_autofill_and_new_success_supersedes_it() {
    let t0 = Instant::now();
    let delay = Duration::from_millis(1000);
    let mut nav = NavigationStateMachine::new(delay);

    nav.request(NavKind::Navigate, Some("https://a.test"), t0).unwrap();
    nav.on_result(NavKind::Navigate, &ok("https://a.test/", false, false), t0, true);
    assert_eq!(nav.next_deadline(), Some(t0 + delay));

    let t1 = t0 + Duration::from_millis(600);
    nav.request(NavKind::Navigate, Some("https://b.test"), t1).unwrap();
    nav.on_result(NavKind::Navigate, &ok("https://b.test/", true, false), t1, true);

    // first schedule superseded
    assert!(!nav.on_tick(t0 + delay));
    assert!(nav.on_tick(t1 + delay));
    assert!(!nav.on_tick(t1 + delay * 2));
}

#[test]
fn autofill_not_scheduled_when_disabled_or_failed() {
    let t0 = Instant::now();
    let mut nav = NavigationStateMachine::default();

    nav.request(NavKind::Navigate, Some("https://a.test"), t0).unwrap();
    nav.on_result(NavKind::Navigate, &ok("https://a.test/", false, false), t0, false);
    assert_eq!(nav.next_deadline(), None);

    nav.request(NavKind::Navigate, Some("https://b.test"), t0).unwrap();
    nav.on_result(NavKind::Navigate, &failed("nope"), t0, true);
    assert_eq!(nav.next_deadline(), None);
}
