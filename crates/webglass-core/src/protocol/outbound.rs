//! Typed client -> remote messages.
//!
//! Serialized as flat JSON objects: `{"type": "<snake_case variant>", ...fields}`.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, WebGlassError};
use crate::protocol::inbound::NavKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Navigate { url: String },
    Back,
    Forward,
    Refresh,
    GetElementInfo { x: f64, y: f64 },
    ExecuteScript { script: String, args: Vec<Value> },
    SetFrameRate { fps: u32 },
    GetBookmarks,
    AddBookmark { url: String, title: String },
    RemoveBookmark { url: String },
    GetHistory,
    ClearHistory,
    ClearCookies,
    ClearFormData,
    FillForm,
    AddFormData { field: String, value: String },
    Click { x: f64, y: f64 },
    #[serde(rename_all = "camelCase")]
    Drag {
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
    },
    Key { key: String },
    Type { text: String },
    Scroll { x: f64, y: f64 },
    #[serde(rename_all = "camelCase")]
    GetScreenshot { force_new: bool },
}

impl Outbound {
    /// Build the navigation-class request for `kind`.
    pub fn nav(kind: NavKind, url: Option<&str>) -> Self {
        match kind {
            NavKind::Navigate => Outbound::Navigate {
                url: url.unwrap_or("about:blank").to_string(),
            },
            NavKind::Back => Outbound::Back,
            NavKind::Forward => Outbound::Forward,
            NavKind::Refresh => Outbound::Refresh,
        }
    }

    /// Navigation class of this request, if any.
    pub fn nav_kind(&self) -> Option<NavKind> {
        match self {
            Outbound::Navigate { .. } => Some(NavKind::Navigate),
            Outbound::Back => Some(NavKind::Back),
            Outbound::Forward => Some(NavKind::Forward),
            Outbound::Refresh => Some(NavKind::Refresh),
            _ => None,
        }
    }

    /// Wire `type` of this message.
    pub fn msg_type(&self) -> &'static str {
        match self {
            Outbound::Navigate { .. } => "navigate",
            Outbound::Back => "back",
            Outbound::Forward => "forward",
            Outbound::Refresh => "refresh",
            Outbound::GetElementInfo { .. } => "get_element_info",
            Outbound::ExecuteScript { .. } => "execute_script",
            Outbound::SetFrameRate { .. } => "set_frame_rate",
            Outbound::GetBookmarks => "get_bookmarks",
            Outbound::AddBookmark { .. } => "add_bookmark",
            Outbound::RemoveBookmark { .. } => "remove_bookmark",
            Outbound::GetHistory => "get_history",
            Outbound::ClearHistory => "clear_history",
            Outbound::ClearCookies => "clear_cookies",
            Outbound::ClearFormData => "clear_form_data",
            Outbound::FillForm => "fill_form",
            Outbound::AddFormData { .. } => "add_form_data",
            Outbound::Click { .. } => "click",
            Outbound::Drag { .. } => "drag",
            Outbound::Key { .. } => "key",
            Outbound::Type { .. } => "type",
            Outbound::Scroll { .. } => "scroll",
            Outbound::GetScreenshot { .. } => "get_screenshot",
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| WebGlassError::Internal(format!("json encode failed: {e}")))
    }
}
