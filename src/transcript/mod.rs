//! Transcript reconciliation
//!
//! The provider resends overlapping windows of partial segments rather than
//! deltas. The `Reconciler` keeps the latest window per session and turns final
//! windows into deduplicated, append-only transcript increments.

mod reconciler;
mod segment;

pub use reconciler::{Reconciler, ReconcilerPhase};
pub use segment::{ResultRecord, Segment, SYNTHETIC_SCORE};
