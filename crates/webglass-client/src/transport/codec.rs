//! Frame codec for the WebSocket link.
//!
//! - Text frames => envelope text (decoded by the router)
//! - Binary frames => text if valid UTF-8, else a protocol error
//! - Ping/Pong/raw frames are handled by tungstenite and skipped here
//! - Close ends the stream

use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use webglass_core::error::{Result, WebGlassError};

/// Map one received item to text. `None` means "nothing for the router".
pub fn decode(item: std::result::Result<Message, WsError>) -> Option<Result<String>> {
    match item {
        Ok(Message::Text(s)) => Some(Ok(s)),
        Ok(Message::Binary(b)) => Some(
            String::from_utf8(b)
                .map_err(|e| WebGlassError::Protocol(format!("binary frame is not utf-8: {e}"))),
        ),
        Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => None,
        Ok(Message::Close(frame)) => {
            tracing::debug!(?frame, "close frame received");
            None
        }
        Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => None,
        Err(e) => Some(Err(WebGlassError::Transport(e.to_string()))),
    }
}

pub fn encode(text: String) -> Message {
    Message::Text(text)
}
