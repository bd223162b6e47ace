//! Inbound message routing.
//!
//! Re-exports the router and the handler trait so the client and tests can
//! depend on this module directly.

pub mod router;

pub use router::{route, InboundHandler, MessageRouter, RouteKind, Routed};
