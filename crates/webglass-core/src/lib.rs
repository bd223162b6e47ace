//! webglass core: transport-agnostic protocol primitives and error types.
//!
//! This crate defines the wire-level contract between the controlling client
//! and the remote browser, plus the error surface shared by the client runtime.
//! It carries no transport or runtime dependencies so the protocol can be
//! reused by test harnesses and alternative front ends.
//!
//! # Panic freedom
//! Panics, `unwrap`, and `expect` are compile-denied here. A malformed message
//! from the remote side surfaces as `WebGlassError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorClass, Result, WebGlassError};
