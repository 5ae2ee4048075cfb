//! Flush outcome: what a sync attempt produced.

use serde::Serialize;

use super::ids::FlushId;

/// A completed flush: every drained record was accepted by the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlushReport {
    pub flush_id: FlushId,

    /// Number of records sent in the batch (and removed locally).
    pub submitted: usize,

    /// Created resources as the server returned them.
    pub created: serde_json::Value,
}

/// Result of one trigger of the sync engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FlushOutcome {
    /// Nothing was queued; no request was made.
    Idle,
    Flushed(FlushReport),
}

impl FlushOutcome {
    pub fn submitted(&self) -> usize {
        match self {
            FlushOutcome::Idle => 0,
            FlushOutcome::Flushed(report) => report.submitted,
        }
    }
}
