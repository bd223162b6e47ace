//! Operator-facing log lines are emitted at `info`.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use common::{MemoryConnector, Plan};
use webglass_client::channel::{ChannelManager, ChannelState};
use webglass_client::client::{Client, Tunables};
use webglass_client::obs::ClientMetrics;
use webglass_client::settings::{MemoryStore, Settings};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn info_subscriber(out: &Captured) -> impl tracing::Subscriber + Send + Sync {
    let out = out.clone();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || out.clone())
        .finish()
}

#[tokio::test]
async fn channel_transitions_log_at_info() {
    let out = Captured::default();
    let _guard = tracing::subscriber::set_default(info_subscriber(&out));

    let (connector, _remotes) = MemoryConnector::new(vec![Plan::Accept]);
    let mut cm = ChannelManager::new(
        connector,
        Duration::from_millis(3000),
        Arc::new(ClientMetrics::new()),
    );
    cm.open();
    assert_eq!(cm.state(), &ChannelState::Connecting);

    let logs = out.text();
    assert!(logs.contains("channel transition"), "{logs}");
    assert!(logs.contains("connecting"), "{logs}");
}

#[test]
fn debug_mode_previews_inbound_at_info() {
    let out = Captured::default();
    let _guard = tracing::subscriber::set_default(info_subscriber(&out));

    let t0 = Instant::now();
    let mut c = Client::new(
        Tunables::default(),
        Settings::default(),
        Box::new(MemoryStore::new()),
        Arc::new(ClientMetrics::new()),
        t0,
    );
    c.on_text(r#"{"type":"set_frame_rate_result","fps":12}"#, t0);
    assert!(!out.text().contains("inbound"));

    c.set_debug_mode(true);
    c.on_text(r#"{"type":"set_frame_rate_result","fps":12}"#, t0);
    let logs = out.text();
    assert!(logs.contains("inbound"), "{logs}");
    assert!(logs.contains("set_frame_rate_result"), "{logs}");
}
