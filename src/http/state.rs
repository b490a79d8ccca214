use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Process-wide session counters
///
/// Only counts live here; session data never leaves its session.
#[derive(Debug, Default)]
pub struct SessionCounters {
    active: AtomicUsize,
    total: AtomicU64,
}

impl SessionCounters {
    /// Count a session as active until the returned guard is dropped
    pub fn open(self: &Arc<Self>) -> ActiveSession {
        self.active.fetch_add(1, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
        ActiveSession {
            counters: Arc::clone(self),
        }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }
}

/// Guard marking one session as active
#[derive(Debug)]
pub struct ActiveSession {
    counters: Arc<SessionCounters>,
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.counters.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service_name: String,
    pub counters: Arc<SessionCounters>,
}

impl AppState {
    pub fn new(service_name: impl Into<String>, counters: Arc<SessionCounters>) -> Self {
        Self {
            service_name: service_name.into(),
            counters,
        }
    }
}
