//! webglass: drive a remote browser from the terminal.
//!
//! - Config: `WEBGLASS_CONFIG` or `webglass.yaml` (strict parsing + validate)
//! - Logs: `RUST_LOG` via tracing-subscriber, `info` when unset
//! - Each rendered frame is written to `last_frame.png`
//! - Commands are read line by line from stdin (`help` lists them)

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

use webglass_client::config;
use webglass_client::obs::ClientMetrics;
use webglass_client::settings::JsonFileStore;
use webglass_client::{ClientEvent, LocalInput, Session, WsConnector};
use webglass_core::error::{Result, WebGlassError};

const FRAME_PATH: &str = "last_frame.png";
const DEFAULT_LOG: &str = "info";

const HELP: &str = "commands: go <url> | back | forward | refresh | home | click x y | \
drag x1 y1 x2 y2 | key <name> | type <text> | scroll dx dy | bookmark | history | \
bookmarks | fps <n> | stats | quit";

#[derive(Debug, PartialEq)]
enum Command {
    Input(Vec<LocalInput>),
    Stats,
    Help,
    Quit,
}

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, class = e.class().as_str(), "webglass failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = config::config_path();
    let cfg = config::load_from_file(&path)?;

    let store = JsonFileStore::new(&cfg.settings_path);
    let settings = store.load_or_default();
    let metrics = Arc::new(ClientMetrics::new());

    let connector = WsConnector::from_config(&cfg.remote);
    let (session, mut events) =
        Session::new(connector, &cfg, settings, Box::new(store), Arc::clone(&metrics));
    let handle = session.spawn();
    tracing::info!(url = %cfg.remote.url, config = %path, "webglass starting");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            ev = events.recv() => match ev {
                Some(ev) => report(ev).await,
                None => break,
            },

            line = lines.next_line() => {
                let line = line.map_err(|e| WebGlassError::Internal(format!("stdin: {e}")))?;
                let Some(line) = line else { break; };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Stats) => print!("{}", metrics.render()),
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(Command::Input(cmds)) => {
                        for cmd in cmds {
                            handle.send(cmd).await?;
                        }
                    }
                    Err(msg) => println!("{msg}"),
                }
            }
        }
    }

    handle.shutdown().await
}

async fn report(ev: ClientEvent) {
    match ev {
        ClientEvent::FrameRendered { frame, fps } => {
            if let Err(e) = tokio::fs::write(FRAME_PATH, frame.image()).await {
                tracing::warn!(error = %e, path = FRAME_PATH, "frame not written");
            }
            tracing::debug!(bytes = frame.len(), ?fps, "frame");
        }
        ClientEvent::Connectivity(state) => tracing::info!(state = state.as_str(), "connectivity"),
        ClientEvent::Error { class, message } => {
            println!("error: {message}");
            tracing::warn!(class = class.as_str(), %message, "client error");
        }
        ClientEvent::NavChanged(nav) => tracing::info!(
            url = nav.url(),
            title = nav.display_title(),
            loading = nav.is_loading(),
            security = nav.security().as_str(),
            back = nav.can_go_back(),
            forward = nav.can_go_forward(),
            bookmarked = nav.is_bookmarked(),
            "navigation"
        ),
        ClientEvent::LoadingIndicator(on) => tracing::debug!(on, "page loading"),
        ClientEvent::ElementInfo(el) => tracing::info!(tag = %el.tag_name, id = ?el.id, "element"),
        ClientEvent::Highlight(rect) => tracing::debug!(?rect, "highlight"),
        ClientEvent::HideHighlight => {}
        ClientEvent::Bookmarks(list) => {
            for b in list {
                println!("* {} <{}>", b.title, b.url);
            }
        }
        ClientEvent::History(list) => {
            for h in list {
                println!("- {} <{}>", h.title, h.url);
            }
        }
        ClientEvent::FrameRateSet(fps) => tracing::info!(fps, "frame rate"),
    }
}

/// `RUST_LOG` directives when set and valid, else `info`.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG))
}

fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let one = |cmd: LocalInput| -> std::result::Result<Command, String> {
        Ok(Command::Input(vec![cmd]))
    };

    match word {
        "" => Ok(Command::Input(Vec::new())),
        "go" if !rest.is_empty() => one(LocalInput::Navigate(rest.to_string())),
        "back" => one(LocalInput::Back),
        "forward" => one(LocalInput::Forward),
        "refresh" => one(LocalInput::Refresh),
        "home" => one(LocalInput::Home),
        "click" => {
            let [x, y] = numbers::<2>(rest)?;
            Ok(Command::Input(vec![
                LocalInput::PointerDown { x, y },
                LocalInput::PointerUp { x, y },
            ]))
        }
        "drag" => {
            let [x1, y1, x2, y2] = numbers::<4>(rest)?;
            Ok(Command::Input(vec![
                LocalInput::PointerDown { x: x1, y: y1 },
                LocalInput::PointerMove { x: x2, y: y2 },
                LocalInput::PointerUp { x: x2, y: y2 },
            ]))
        }
        "key" if !rest.is_empty() => one(LocalInput::Key(rest.to_string())),
        "type" if !rest.is_empty() => Ok(Command::Input(
            rest.chars().map(|c| LocalInput::Key(c.to_string())).collect(),
        )),
        "scroll" => {
            let [dx, dy] = numbers::<2>(rest)?;
            one(LocalInput::Wheel { dx, dy })
        }
        "bookmark" => one(LocalInput::ToggleBookmark),
        "bookmarks" => one(LocalInput::RequestBookmarks),
        "history" => one(LocalInput::RequestHistory),
        "fps" => {
            let fps = rest
                .parse::<u32>()
                .map_err(|_| format!("fps: expected a number, got {rest:?}"))?;
            one(LocalInput::SetFpsLimit(fps))
        }
        "stats" => Ok(Command::Stats),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Err(format!("unknown command: {line} ({HELP})")),
    }
}

fn numbers<const N: usize>(s: &str) -> std::result::Result<[f64; N], String> {
    let parsed: Vec<f64> = s
        .split_whitespace()
        .map(|t| t.parse::<f64>().map_err(|_| format!("not a number: {t}")))
        .collect::<std::result::Result<_, _>>()?;
    parsed
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected {N} numbers, got {}", v.len()))
}
