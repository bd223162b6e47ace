//! In-process connector for channel and session tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use futures_util::{sink, stream};
use tokio::sync::mpsc;

use webglass_client::sched;
use webglass_client::transport::{Connector, Link};
use webglass_core::error::{Result, WebGlassError};

/// What the next connect attempt does.
#[derive(Debug, Clone)]
pub enum Plan {
    Refuse,
    Accept,
}

/// Remote end of one accepted link.
pub struct Remote {
    pub to_client: mpsc::UnboundedSender<Result<String>>,
    pub from_client: mpsc::UnboundedReceiver<String>,
}

impl Remote {
    pub fn push(&self, text: impl Into<String>) {
        self.to_client.send(Ok(text.into())).unwrap();
    }

    /// Outbound `type`s received so far.
    pub fn drain_types(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(text) = self.from_client.try_recv() {
            let v: serde_json::Value = serde_json::from_str(&text).unwrap();
            out.push(v["type"].as_str().unwrap().to_string());
        }
        out
    }
}

struct Inner {
    plans: VecDeque<Plan>,
    attempts: Vec<Instant>,
    accepted: mpsc::UnboundedSender<Remote>,
}

#[derive(Clone)]
pub struct MemoryConnector {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryConnector {
    /// Attempts follow `plans` in order; once exhausted every attempt is refused.
    pub fn new(plans: impl IntoIterator<Item = Plan>) -> (Self, mpsc::UnboundedReceiver<Remote>) {
        let (accepted, rx) = mpsc::unbounded_channel();
        let inner = Inner {
            plans: plans.into_iter().collect(),
            attempts: Vec::new(),
            accepted,
        };
        (
            Self {
                inner: Arc::new(Mutex::new(inner)),
            },
            rx,
        )
    }

    pub fn attempts(&self) -> Vec<Instant> {
        self.inner.lock().unwrap().attempts.clone()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    fn endpoint(&self) -> &str {
        "memory://remote"
    }

    async fn connect(&self) -> Result<Link> {
        let mut inner = self.inner.lock().unwrap();
        inner.attempts.push(sched::now());
        match inner.plans.pop_front().unwrap_or(Plan::Refuse) {
            Plan::Refuse => Err(WebGlassError::Transport("connection refused".into())),
            Plan::Accept => {
                let (to_client, client_rx) = mpsc::unbounded_channel::<Result<String>>();
                let (client_tx, from_client) = mpsc::unbounded_channel::<String>();

                let sink = sink::unfold(client_tx, |tx, text: String| async move {
                    tx.send(text)
                        .map_err(|_| WebGlassError::Transport("remote gone".into()))?;
                    Ok::<_, WebGlassError>(tx)
                });
                let stream = stream::unfold(client_rx, |mut rx| async move {
                    rx.recv().await.map(|item| (item, rx))
                });

                let _ = inner.accepted.send(Remote {
                    to_client,
                    from_client,
                });
                Ok(Link::new(Box::pin(sink), Box::pin(stream)))
            }
        }
    }
}

/// Next event satisfying `pred`, skipping the rest. Panics after 10s.
pub async fn next_matching<F>(
    events: &mut mpsc::UnboundedReceiver<webglass_client::ClientEvent>,
    pred: F,
) -> webglass_client::ClientEvent
where
    F: Fn(&webglass_client::ClientEvent) -> bool,
{
    let wait = async {
        loop {
            let ev = events.recv().await.expect("session ended");
            if pred(&ev) {
                return ev;
            }
        }
    };
    tokio::time::timeout(std::time::Duration::from_secs(10), wait)
        .await
        .expect("timed out waiting for event")
}
