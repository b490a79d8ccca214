//! Transcription provider connection
//!
//! - `messages`: handshake and inbound message schemas
//! - `adapter`: opening the provider WebSocket, per-session handshake
//!   construction and message decoding

mod adapter;
mod messages;

pub use adapter::{connect, ProviderAdapter, ProviderSocket};
pub use messages::{Handshake, ProviderEvent, ProviderStatus, RawProviderMessage};
