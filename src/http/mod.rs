//! HTTP status API
//!
//! - GET /health - Health check
//! - GET /status - Session counters

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{ActiveSession, AppState, SessionCounters};
