use uuid::Uuid;

use super::config::SessionConfig;
use super::stats::SessionStats;
use crate::audio::AudioRelay;
use crate::transcript::{Reconciler, ResultRecord};

/// Everything mutable that belongs to one session
///
/// Owned by exactly one `Session`; nothing here is ever shared.
#[derive(Debug)]
pub struct SessionState {
    pub id: Uuid,

    /// Codec in effect, always an entry of the codec catalog
    pub selected_codec: String,

    /// Language in effect, always an entry of the language catalog
    pub selected_language: String,

    /// Client audio on its way to the provider
    pub relay: AudioRelay,

    /// Transcript state fed by provider messages
    pub reconciler: Reconciler,

    pub stats: SessionStats,

    /// Results no push delivered, waiting for a `get results`
    results: Vec<ResultRecord>,
}

impl SessionState {
    pub fn new(config: &SessionConfig) -> Self {
        let id = Uuid::new_v4();

        Self {
            id,
            selected_codec: config.catalogs.codecs.default_value().to_string(),
            selected_language: config.catalogs.languages.default_value().to_string(),
            relay: AudioRelay::new(),
            reconciler: Reconciler::new(),
            stats: SessionStats::new(id),
            results: Vec::new(),
        }
    }

    pub fn queue_result(&mut self, record: ResultRecord) {
        self.results.push(record);
    }

    /// Take every queued result, leaving the queue empty
    pub fn drain_results(&mut self) -> Vec<ResultRecord> {
        std::mem::take(&mut self.results)
    }

    /// Statistics snapshot including relay counters
    pub fn snapshot(&self) -> SessionStats {
        let mut stats = self.stats.clone();
        stats.bytes_received = self.relay.bytes_received();
        stats.chunks_forwarded = self.relay.chunks_forwarded();
        stats.bytes_buffered = self.relay.buffered();
        stats.bytes_dropped = self.relay.bytes_dropped();
        stats.transcript_segments = self.reconciler.transcript().len();
        stats.last_processed_index = self.reconciler.last_processed_index();
        stats.detected_language = self.reconciler.detected_language().map(str::to_string);
        stats.refresh_duration();
        stats
    }
}
