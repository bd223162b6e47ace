//! Local input interpretation.
//!
//! - `gesture`: pointer down/move/up/leave -> click, drag, throttled hover.
//! - `keys`: keyboard key names -> `key` / `type` requests.

pub mod gesture;
pub mod keys;

pub use gesture::{Gesture, GestureConfig, GestureRecognizer, Phase, Point};
pub use keys::{key_request, SPECIAL_KEYS};
