use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Statistics about a bridge session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub session_id: Uuid,

    /// When the client connected
    pub started_at: DateTime<Utc>,

    /// Time since `started_at`, in seconds
    pub duration_secs: f64,

    /// Audio bytes received from the client
    pub bytes_received: u64,

    /// Chunks accepted by the provider
    pub chunks_forwarded: u64,

    /// Audio bytes not yet forwarded
    pub bytes_buffered: usize,

    /// Audio bytes thrown away because no provider could take them
    pub bytes_dropped: u64,

    /// Control requests answered
    pub requests_handled: u64,

    /// Finalized results produced
    pub results_emitted: u64,

    /// Number of finalized transcript increments
    pub transcript_segments: usize,

    /// Highest provider segment index finalized so far
    pub last_processed_index: Option<usize>,

    /// Language reported by the provider, if any
    pub detected_language: Option<String>,
}

impl SessionStats {
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            started_at: Utc::now(),
            duration_secs: 0.0,
            bytes_received: 0,
            chunks_forwarded: 0,
            bytes_buffered: 0,
            bytes_dropped: 0,
            requests_handled: 0,
            results_emitted: 0,
            transcript_segments: 0,
            last_processed_index: None,
            detected_language: None,
        }
    }

    pub fn refresh_duration(&mut self) {
        let duration = Utc::now().signed_duration_since(self.started_at);
        self.duration_secs = duration.num_milliseconds() as f64 / 1000.0;
    }
}
