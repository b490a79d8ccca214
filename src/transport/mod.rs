//! Duplex connection abstraction
//!
//! Both the client and the provider side of a session are reached through the
//! `Transport` trait. Production code uses `WsTransport` over tokio-tungstenite;
//! tests substitute in-memory fakes.

mod websocket;

pub use websocket::WsTransport;

use crate::error::TransportError;

/// A single application-level message on a duplex connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text payload (JSON control messages)
    Text(String),
    /// Raw binary payload (audio)
    Binary(Vec<u8>),
    /// The peer initiated a close
    Close,
}

/// One side of a session
///
/// `recv` must be cancel-safe: the session reactor polls the client and the
/// provider side concurrently and drops whichever future loses the race.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Send a frame to the peer
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError>;

    /// Receive the next frame, `None` once the stream has ended
    async fn recv(&mut self) -> Option<Result<Frame, TransportError>>;

    /// Close the connection; closing an already-closed connection succeeds
    async fn close(&mut self) -> Result<(), TransportError>;
}
