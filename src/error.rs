//! Error types shared by the session components.
//!
//! Nothing in here is process-fatal: protocol and parse errors are folded into
//! `error_msg` responses, connection errors end (part of) one session.

use thiserror::Error;

/// A text payload that could not be decoded into a known message shape.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognized message shape: {0}")]
    Shape(String),
}

/// A request that is malformed, incomplete or not supported.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Missing request parameters")]
    MissingParams,

    #[error("Invalid '{field}' in '{request}' request: {reason}")]
    InvalidField {
        request: String,
        field: &'static str,
        reason: String,
    },

    #[error("Request '{0}' not handled")]
    Unhandled(String),
}

impl ProtocolError {
    pub fn invalid(request: &str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            request: request.to_string(),
            field,
            reason: reason.into(),
        }
    }
}

/// Failure on one side of a duplex connection.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection is not open")]
    NotOpen,

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Which side of a session failed.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("client connection error: {0}")]
    Client(#[source] TransportError),

    #[error("provider connection error: {0}")]
    Provider(#[source] TransportError),
}
