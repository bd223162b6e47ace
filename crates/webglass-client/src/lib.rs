//! webglass client runtime.
//!
//! Drives a remote headless browser over one WebSocket: screenshots stream
//! in, pointer/keyboard/navigation requests stream out. The crate is split
//! into pure state machines (`input`, `nav`, `frames`, `library`) owned by
//! `client::Client`, and the async edge (`transport`, `channel`, `session`)
//! that feeds it.
//!
//! Panics, `unwrap`, and `expect` are compile-denied: nothing the remote
//! sends may take the session down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod channel;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod frames;
pub mod input;
pub mod library;
pub mod nav;
pub mod obs;
pub mod sched;
pub mod session;
pub mod settings;
pub mod transport;

pub use channel::{ChannelEvent, ChannelManager, ChannelState, CloseReason};
pub use client::{Client, ClientEvent, Tunables};
pub use session::{LocalInput, Session, SessionHandle};
pub use transport::{Connector, Link, WsConnector};
