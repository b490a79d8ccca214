//! Session dispatcher
//!
//! This module provides the `Session` that pairs one client connection with one
//! provider connection:
//! - Binary client frames are relayed to the provider in fixed-size chunks
//! - Text client frames are handled as control requests
//! - Provider messages are reconciled into finalized results
//! - Closing the client closes the provider

mod config;
mod session;
mod state;
mod stats;

pub use config::SessionConfig;
pub use session::Session;
pub use state::SessionState;
pub use stats::SessionStats;
