//! Progress reporting port for UI integration.

use crate::domain::SessionSummary;

/// Events emitted while replaying sessions.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Replay started for a session.
    Started {
        /// Session name.
        source: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Total sessions in batch.
        total: usize,
    },
    /// Replay completed for a session.
    Completed {
        /// The session summary.
        summary: SessionSummary,
    },
    /// A session could not be replayed.
    Skipped {
        /// Session name.
        source: String,
        /// Reason for skipping.
        reason: String,
    },
    /// All sessions have been processed.
    Finished {
        /// Sessions replayed successfully.
        processed: usize,
        /// Sessions skipped.
        skipped: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
