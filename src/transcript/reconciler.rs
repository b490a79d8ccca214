use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::segment::{ResultRecord, Segment};
use crate::provider::{ProviderEvent, ProviderStatus};

/// Where the provider conversation stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerPhase {
    /// Handshake sent, provider has not confirmed yet
    AwaitingReady,
    /// Provider accepted the handshake
    Ready,
    /// At least one segment window was received
    Streaming,
}

/// Per-session transcript reconciliation state
#[derive(Debug)]
pub struct Reconciler {
    phase: ReconcilerPhase,

    /// Latest segment window; replaced wholesale, never merged
    previous_segments: Vec<Segment>,

    /// Last text appended to the transcript
    last_appended_text: Option<String>,

    /// Highest window index already finalized; never decreases
    last_processed_index: Option<usize>,

    /// Finalized increments, append-only
    transcript: Vec<String>,

    /// Language reported by the provider (informational only)
    detected_language: Option<String>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Self {
            phase: ReconcilerPhase::AwaitingReady,
            previous_segments: Vec::new(),
            last_appended_text: None,
            last_processed_index: None,
            transcript: Vec::new(),
            detected_language: None,
        }
    }

    /// Apply one provider event; returns a result when new text was finalized
    pub fn apply(&mut self, event: ProviderEvent) -> Option<ResultRecord> {
        match event {
            ProviderEvent::Status { status, message } => {
                Self::log_status(status, &message);
                None
            }
            ProviderEvent::Ready { backend } => {
                self.phase = ReconcilerPhase::Ready;
                info!(
                    "Provider ready (backend: {})",
                    backend.as_deref().unwrap_or("unknown")
                );
                None
            }
            ProviderEvent::Disconnect => {
                info!("Provider disconnected the session, expecting connection close");
                None
            }
            ProviderEvent::Language { code, probability } => {
                match probability {
                    Some(p) => info!("Provider detected language {} (probability {:.2})", code, p),
                    None => info!("Provider detected language {}", code),
                }
                self.detected_language = Some(code);
                None
            }
            ProviderEvent::Notice(message) => {
                debug!("Provider message: {}", message);
                None
            }
            ProviderEvent::Segments { segments, is_final } => self.on_segments(segments, is_final),
        }
    }

    fn on_segments(&mut self, segments: Option<Vec<Segment>>, is_final: bool) -> Option<ResultRecord> {
        if self.phase == ReconcilerPhase::AwaitingReady {
            warn!("Received segments before the provider reported ready");
        }
        self.phase = ReconcilerPhase::Streaming;

        if let Some(segments) = segments {
            self.previous_segments = segments;
        }

        if !is_final {
            debug!("Interim: {}", self.interim_text());
            return None;
        }

        self.finalize()
    }

    /// Emit the not-yet-finalized part of the current window
    fn finalize(&mut self) -> Option<ResultRecord> {
        let mut output: Vec<&str> = Vec::new();
        let mut highest = None;

        for (i, segment) in self.previous_segments.iter().enumerate() {
            highest = Some(i);

            let text = segment.text.trim();
            if text.is_empty() {
                continue;
            }

            let unprocessed = self.last_processed_index.map_or(true, |last| i > last);
            let repeated = output.last() == Some(&text);

            if unprocessed && !repeated {
                output.push(text);
            }
        }

        if let Some(highest) = highest {
            self.last_processed_index = Some(
                self.last_processed_index
                    .map_or(highest, |last| last.max(highest)),
            );
        }

        let last = output.last()?.to_string();
        let increment = output.join(" ");

        self.last_appended_text = Some(last);
        self.transcript.push(increment.clone());

        info!("Finalized: {}", increment);
        Some(ResultRecord::unscored(increment))
    }

    fn log_status(status: ProviderStatus, message: &Value) {
        match status {
            ProviderStatus::Wait => match message.as_f64() {
                Some(minutes) => info!(
                    "Provider is full, estimated wait time {} minutes",
                    minutes.round()
                ),
                None => info!("Provider is full: {}", message),
            },
            ProviderStatus::Error => error!("Message from provider: {}", message),
            ProviderStatus::Warning => warn!("Message from provider: {}", message),
            ProviderStatus::Unknown => debug!("Provider status message: {}", message),
        }
    }

    /// Deduplicated join of the current window, final or not
    pub fn interim_text(&self) -> String {
        let mut texts: Vec<&str> = Vec::new();
        for segment in &self.previous_segments {
            let text = segment.text.trim();
            if !text.is_empty() && texts.last() != Some(&text) {
                texts.push(text);
            }
        }
        texts.join(" ")
    }

    pub fn phase(&self) -> ReconcilerPhase {
        self.phase
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn last_processed_index(&self) -> Option<usize> {
        self.last_processed_index
    }

    pub fn last_appended_text(&self) -> Option<&str> {
        self.last_appended_text.as_deref()
    }

    pub fn detected_language(&self) -> Option<&str> {
        self.detected_language.as_deref()
    }
}
