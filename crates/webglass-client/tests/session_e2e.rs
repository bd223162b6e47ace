//! End to end over a real WebSocket against a scripted fake remote.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use common::next_matching;
use webglass_client::channel::{ChannelState, CloseReason};
use webglass_client::config::ClientConfig;
use webglass_client::obs::ClientMetrics;
use webglass_client::settings::{MemoryStore, Settings};
use webglass_client::{ClientEvent, LocalInput, Session, WsConnector};

const IMAGE: &str = "aW1hZ2UtYQ==";

/// Request `type`s and the upgrade's Authorization header, as seen by the remote.
#[derive(Clone)]
struct Seen(mpsc::UnboundedSender<String>);

async fn ws_handler(ws: WebSocketUpgrade, headers: HeaderMap, State(seen): State<Seen>) -> impl IntoResponse {
    if let Some(auth) = headers.get(header::AUTHORIZATION) {
        let _ = seen.0.send(format!("auth {}", auth.to_str().unwrap_or("")));
    }
    ws.on_upgrade(move |socket| fake_remote(socket, seen))
}

fn replies(req: &Value) -> Vec<Value> {
    match req["type"].as_str().unwrap_or("") {
        "set_frame_rate" => vec![json!({"type": "set_frame_rate_result", "fps": req["fps"]})],
        "get_bookmarks" => vec![json!({"type": "get_bookmarks_result", "result": {"status": "success", "bookmarks": []}})],
        "get_history" => vec![json!({"type": "get_history_result", "result": {"status": "success", "history": ["about:blank"]}})],
        "navigate" => vec![
            json!({"type": "navigate_result", "result": {
                "status": "success", "url": req["url"], "can_go_back": true, "can_go_forward": false
            }}),
            json!({"type": "screenshot", "data": IMAGE, "page_info": {
                "status": "success", "title": "Example Domain", "url": req["url"],
                "is_bookmarked": false, "can_go_back": true, "can_go_forward": false
            }}),
        ],
        "click" => vec![json!({"type": "click_result", "result": {"status": "success"}})],
        _ => Vec::new(),
    }
}

async fn fake_remote(mut socket: WebSocket, seen: Seen) {
    while let Some(Ok(msg)) = socket.recv().await {
        let Message::Text(text) = msg else { continue };
        let req: Value = serde_json::from_str(&text).unwrap();
        let _ = seen.0.send(req["type"].as_str().unwrap_or("").to_string());
        for reply in replies(&req) {
            if socket.send(Message::Text(reply.to_string())).await.is_err() {
                return;
            }
        }
    }
}

async fn start_remote() -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(Seen(tx));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, rx)
}

#[tokio::test]
async fn navigate_and_render_over_websocket() {
    let (addr, mut seen) = start_remote().await;
    let cfg = ClientConfig::new(format!("ws://{addr}/ws"));
    let metrics = Arc::new(ClientMetrics::new());
    let (session, mut events) = Session::new(
        WsConnector::from_config(&cfg.remote),
        &cfg,
        Settings::default(),
        Box::new(MemoryStore::new()),
        Arc::clone(&metrics),
    );
    let handle = session.spawn();

    next_matching(&mut events, |e| e == &ClientEvent::FrameRateSet(10)).await;

    handle
        .send(LocalInput::Navigate("https://example.com/".into()))
        .await
        .unwrap();
    let ev = next_matching(&mut events, |e| {
        matches!(e, ClientEvent::NavChanged(nav) if !nav.is_loading() && nav.url() == "https://example.com/")
    })
    .await;
    let ClientEvent::NavChanged(nav) = ev else { unreachable!() };
    assert!(nav.can_go_back());

    let ev = next_matching(&mut events, |e| matches!(e, ClientEvent::FrameRendered { .. })).await;
    let ClientEvent::FrameRendered { frame, .. } = ev else { unreachable!() };
    assert_eq!(frame.image().as_ref(), b"image-a");

    handle.shutdown().await.unwrap();
    next_matching(&mut events, |e| {
        e == &ClientEvent::Connectivity(ChannelState::Closed(CloseReason::Deliberate))
    })
    .await;

    let mut types = Vec::new();
    while let Ok(t) = seen.try_recv() {
        types.push(t);
    }
    assert_eq!(
        types,
        vec!["set_frame_rate", "get_bookmarks", "get_history", "navigate"]
    );
    assert_eq!(metrics.inbound_messages.get(&[("type", "navigate_result")]), 1);
    assert!(metrics.render().contains("webglass_frames_total"));
}

#[tokio::test]
async fn basic_auth_header_is_sent_on_upgrade() {
    let (addr, mut seen) = start_remote().await;
    let mut cfg = ClientConfig::new(format!("ws://{addr}/ws"));
    cfg.remote.username = Some("admin".into());
    cfg.remote.password = Some("secret".into());

    let (session, mut events) = Session::new(
        WsConnector::from_config(&cfg.remote),
        &cfg,
        Settings::default(),
        Box::new(MemoryStore::new()),
        Arc::new(ClientMetrics::new()),
    );
    let handle = session.spawn();
    next_matching(&mut events, |e| e == &ClientEvent::Connectivity(ChannelState::Open)).await;

    let first = seen.recv().await.unwrap();
    assert_eq!(first, "auth Basic YWRtaW46c2VjcmV0");

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn unreachable_remote_reports_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let cfg = ClientConfig::new(format!("ws://{addr}/ws"));
    let (session, mut events) = Session::new(
        WsConnector::from_config(&cfg.remote),
        &cfg,
        Settings::default(),
        Box::new(MemoryStore::new()),
        Arc::new(ClientMetrics::new()),
    );
    let handle = session.spawn();

    let ev = next_matching(&mut events, |e| matches!(e, ClientEvent::Error { .. })).await;
    let ClientEvent::Error { class, .. } = ev else { unreachable!() };
    assert_eq!(class, webglass_core::ErrorClass::Transport);

    handle.shutdown().await.unwrap();
}
