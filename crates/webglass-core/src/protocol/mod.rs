//! Protocol modules.
//!
//! Every message on the channel is a JSON object with a `type` field; the rest
//! of the object is the payload.
//! - `envelope`: untyped envelope, the unit of exchange.
//! - `inbound`: typed remote -> client messages, decoded per `type`.
//! - `outbound`: typed client -> remote messages.
//!
//! Decoding is panic-free: malformed input is reported as `WebGlassError`.

pub mod envelope;
pub mod inbound;
pub mod outbound;

pub use envelope::Envelope;
pub use inbound::{
    Ack, Bookmark, BookmarkList, Element, ElementFound, ElementRect, FillFormReport,
    HistoryList, Inbound, NavKind, NavOutcome, OpResult, PageInfo, Screenshot,
};
pub use outbound::Outbound;
