//! Typed remote -> client messages.
//!
//! `Inbound::from_envelope` is the single place where a `type` string is
//! mapped to a payload shape. Unknown types decode to `Ok(None)` so callers
//! can log and drop them; a known type with a malformed payload is a
//! `WebGlassError::Protocol`.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Result, WebGlassError};
use crate::protocol::envelope::Envelope;

/// Navigation-class request kinds. Each has a request type and a result type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKind {
    Navigate,
    Back,
    Forward,
    Refresh,
}

impl NavKind {
    pub const ALL: [NavKind; 4] = [NavKind::Navigate, NavKind::Back, NavKind::Forward, NavKind::Refresh];

    pub fn request_type(self) -> &'static str {
        match self {
            NavKind::Navigate => "navigate",
            NavKind::Back => "back",
            NavKind::Forward => "forward",
            NavKind::Refresh => "refresh",
        }
    }

    pub fn result_type(self) -> &'static str {
        match self {
            NavKind::Navigate => "navigate_result",
            NavKind::Back => "back_result",
            NavKind::Forward => "forward_result",
            NavKind::Refresh => "refresh_result",
        }
    }

    /// Reverse of `result_type`, by the `<request>_result` suffix convention.
    pub fn from_result_type(msg_type: &str) -> Option<Self> {
        let request = msg_type.strip_suffix("_result")?;
        NavKind::ALL.into_iter().find(|k| k.request_type() == request)
    }
}

/// Result-carrying body: `{status: "success"|"error"|"info", ...}`.
///
/// `info` is what the remote answers for no-op outcomes such as adding a
/// bookmark that already exists.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OpResult<T> {
    Success(T),
    Error {
        #[serde(default)]
        message: Option<String>,
    },
    Info {
        #[serde(default)]
        message: Option<String>,
    },
}

impl<T> OpResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, OpResult::Success(_))
    }

    /// Error message as shown to the user.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            OpResult::Error { message } => Some(message.as_deref().unwrap_or("unknown error")),
            _ => None,
        }
    }
}

/// Success body of a navigation-class result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NavOutcome {
    pub url: String,
    #[serde(default)]
    pub can_go_back: Option<bool>,
    #[serde(default)]
    pub can_go_forward: Option<bool>,
}

/// Page metadata pushed with every rendered frame.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub can_go_back: bool,
    #[serde(default)]
    pub can_go_forward: bool,
}

/// `screenshot` push: base64 image plus optional page metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Screenshot {
    pub data: String,
    #[serde(default)]
    pub page_info: Option<OpResult<PageInfo>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct ElementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Element under the pointer, as described by the remote page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub tag_name: String,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub rect: ElementRect,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ElementFound {
    #[serde(default)]
    pub element: Option<Element>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bookmark {
    pub url: String,
    pub title: String,
    /// Seconds since the epoch, as stamped by the remote.
    #[serde(default)]
    pub created: f64,
    #[serde(default)]
    pub folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookmarkList {
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryList {
    #[serde(default)]
    pub history: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FillFormReport {
    #[serde(default)]
    pub results: Value,
}

/// Success body with no fields the client cares about.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Ack {}

/// Typed inbound message. One arm per recognized `type`.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// `screenshot{data,page_info}`
    Screenshot(Screenshot),
    /// `screenshot_result{data|error}`: answer to `get_screenshot`.
    ScreenshotResult {
        data: Option<String>,
        error: Option<String>,
    },
    /// `navigate_result|back_result|forward_result|refresh_result{result}`
    NavResult {
        kind: NavKind,
        result: OpResult<NavOutcome>,
    },
    /// `get_element_info_result{result:{status,element}}`
    ElementInfo(OpResult<ElementFound>),
    /// `fill_form_result{result:{status,results|message}}`
    FillForm(OpResult<FillFormReport>),
    /// `get_bookmarks_result{result:{status,bookmarks}}`
    Bookmarks(OpResult<BookmarkList>),
    /// `add_bookmark_result{result:{status}}`
    BookmarkAdded(OpResult<Ack>),
    /// `remove_bookmark_result{result:{status}}`
    BookmarkRemoved(OpResult<Ack>),
    /// `get_history_result{result:{status,history}}`
    History(OpResult<HistoryList>),
    /// `set_frame_rate_result{fps}`
    FrameRateSet { fps: u32 },
    /// Acknowledgement of a fire-and-forget action (`click_result`, ...).
    ActionAck {
        action: String,
        result: OpResult<Value>,
    },
    /// `error{message}`
    Error { message: String },
}

/// Actions the remote acknowledges with `<action>_result` that carry nothing
/// the client state depends on.
const ACK_ACTIONS: &[&str] = &[
    "click",
    "drag",
    "type",
    "key",
    "scroll",
    "scroll_to_position",
    "execute_script",
    "clear_history",
    "clear_cookies",
    "get_cookies",
    "clear_form_data",
    "add_form_data",
    "get_form_data",
];

impl Inbound {
    /// Decode a typed message. `Ok(None)` means the type is not recognized.
    pub fn from_envelope(env: Envelope) -> Result<Option<Self>> {
        let (msg_type, mut payload) = env.into_parts();

        if let Some(kind) = NavKind::from_result_type(&msg_type) {
            let result = take_field(&mut payload, &msg_type, "result")?;
            return Ok(Some(Inbound::NavResult { kind, result }));
        }

        let inbound = match msg_type.as_str() {
            "screenshot" => Inbound::Screenshot(from_payload(payload, &msg_type)?),
            "screenshot_result" => Inbound::ScreenshotResult {
                data: take_opt_field(&mut payload, &msg_type, "data")?,
                error: take_opt_field(&mut payload, &msg_type, "error")?,
            },
            "get_element_info_result" => {
                Inbound::ElementInfo(take_field(&mut payload, &msg_type, "result")?)
            }
            "fill_form_result" => Inbound::FillForm(take_field(&mut payload, &msg_type, "result")?),
            "get_bookmarks_result" => {
                Inbound::Bookmarks(take_field(&mut payload, &msg_type, "result")?)
            }
            "add_bookmark_result" => {
                Inbound::BookmarkAdded(take_field(&mut payload, &msg_type, "result")?)
            }
            "remove_bookmark_result" => {
                Inbound::BookmarkRemoved(take_field(&mut payload, &msg_type, "result")?)
            }
            "get_history_result" => Inbound::History(take_field(&mut payload, &msg_type, "result")?),
            "set_frame_rate_result" => Inbound::FrameRateSet {
                fps: take_field(&mut payload, &msg_type, "fps")?,
            },
            "error" => Inbound::Error {
                message: take_opt_field(&mut payload, &msg_type, "message")?
                    .unwrap_or_else(|| "unknown error".to_string()),
            },
            other => match other.strip_suffix("_result") {
                Some(action) if ACK_ACTIONS.contains(&action) => Inbound::ActionAck {
                    action: action.to_string(),
                    result: take_field(&mut payload, &msg_type, "result")?,
                },
                _ => {
                    tracing::trace!(msg_type = other, "no decoder for message type");
                    return Ok(None);
                }
            },
        };
        Ok(Some(inbound))
    }

    /// Wire `type` this message was decoded from.
    pub fn msg_type(&self) -> String {
        match self {
            Inbound::Screenshot(_) => "screenshot".into(),
            Inbound::ScreenshotResult { .. } => "screenshot_result".into(),
            Inbound::NavResult { kind, .. } => kind.result_type().into(),
            Inbound::ElementInfo(_) => "get_element_info_result".into(),
            Inbound::FillForm(_) => "fill_form_result".into(),
            Inbound::Bookmarks(_) => "get_bookmarks_result".into(),
            Inbound::BookmarkAdded(_) => "add_bookmark_result".into(),
            Inbound::BookmarkRemoved(_) => "remove_bookmark_result".into(),
            Inbound::History(_) => "get_history_result".into(),
            Inbound::FrameRateSet { .. } => "set_frame_rate_result".into(),
            Inbound::ActionAck { action, .. } => format!("{action}_result"),
            Inbound::Error { .. } => "error".into(),
        }
    }
}

fn from_payload<T: DeserializeOwned>(payload: Map<String, Value>, msg_type: &str) -> Result<T> {
    serde_json::from_value(Value::Object(payload))
        .map_err(|e| WebGlassError::Protocol(format!("{msg_type}: invalid payload: {e}")))
}

fn take_field<T: DeserializeOwned>(
    payload: &mut Map<String, Value>,
    msg_type: &str,
    name: &str,
) -> Result<T> {
    let raw = payload
        .remove(name)
        .ok_or_else(|| WebGlassError::Protocol(format!("{msg_type}: missing `{name}`")))?;
    serde_json::from_value(raw)
        .map_err(|e| WebGlassError::Protocol(format!("{msg_type}: invalid `{name}`: {e}")))
}

fn take_opt_field<T: DeserializeOwned>(
    payload: &mut Map<String, Value>,
    msg_type: &str,
    name: &str,
) -> Result<Option<T>> {
    match payload.remove(name) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => serde_json::from_value(raw)
            .map(Some)
            .map_err(|e| WebGlassError::Protocol(format!("{msg_type}: invalid `{name}`: {e}"))),
    }
}
