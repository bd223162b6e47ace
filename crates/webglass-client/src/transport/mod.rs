//! Transport layer (WebSocket client).
//!
//! `Connector` establishes one bidirectional text link per call; the channel
//! manager never reuses a link across reconnects. `WsConnector` is the
//! tokio-tungstenite implementation and `codec` maps its frames to text.

pub mod codec;
pub mod connector;
pub mod ws;

pub use connector::{Connector, Link, TextSink, TextStream};
pub use ws::WsConnector;
