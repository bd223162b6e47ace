//! Shared error type across webglass crates.

use thiserror::Error;

/// Error classes (stable API).
///
/// The first four are the runtime taxonomy: none of them is fatal to the
/// session, they only decide how an error is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Channel could not open or dropped. Recovered by reconnecting.
    Transport,
    /// Malformed or unrecognized envelope. Logged and dropped.
    Protocol,
    /// Remote reported `status: "error"`. Shown to the user.
    Operation,
    /// Local precondition violated (e.g. sending while disconnected). Suppressed.
    Precondition,
    /// Invalid configuration or settings file.
    Config,
    /// Bug or unexpected internal state.
    Internal,
}

impl ErrorClass {
    /// String representation used in logs and metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::Transport => "TRANSPORT",
            ErrorClass::Protocol => "PROTOCOL",
            ErrorClass::Operation => "OPERATION",
            ErrorClass::Precondition => "PRECONDITION",
            ErrorClass::Config => "CONFIG",
            ErrorClass::Internal => "INTERNAL",
        }
    }

    /// Whether errors of this class are shown to the user.
    pub fn is_user_visible(self) -> bool {
        matches!(self, ErrorClass::Transport | ErrorClass::Operation)
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, WebGlassError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum WebGlassError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("protocol: {0}")]
    Protocol(String),
    #[error("{0}")]
    Operation(String),
    #[error("not connected")]
    NotConnected,
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl WebGlassError {
    /// Map an error to its stable class.
    pub fn class(&self) -> ErrorClass {
        match self {
            WebGlassError::Transport(_) => ErrorClass::Transport,
            WebGlassError::Protocol(_) => ErrorClass::Protocol,
            WebGlassError::Operation(_) => ErrorClass::Operation,
            WebGlassError::NotConnected => ErrorClass::Precondition,
            WebGlassError::Config(_) | WebGlassError::UnsupportedVersion => ErrorClass::Config,
            WebGlassError::Internal(_) => ErrorClass::Internal,
        }
    }
}
