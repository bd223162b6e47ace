//! Untyped JSON envelope.
//!
//! Wire shape: a JSON object whose `type` field names the message, with every
//! other field forming the payload. Outbound messages serialize to the same
//! shape directly (see `Outbound`), so only the decode side lives here.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Result, WebGlassError};

/// One unit of protocol exchange.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    /// Message type (field name is `type` in JSON).
    #[serde(rename = "type")]
    msg_type: String,
    /// Everything except `type`.
    #[serde(flatten)]
    payload: Map<String, Value>,
}

impl Envelope {
    /// Decode a text frame. Anything that is not a JSON object carrying a
    /// string `type` is a protocol error.
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| WebGlassError::Protocol(format!("invalid envelope json: {e}")))
    }

    pub fn msg_type(&self) -> &str {
        &self.msg_type
    }

    pub fn into_parts(self) -> (String, Map<String, Value>) {
        (self.msg_type, self.payload)
    }
}
