//! Queued records: opaque pending-creation payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::LocalKey;

/// A pending creation request, exactly as the form collected it.
///
/// No schema is enforced locally. Validation is the server's job, so this
/// wraps any JSON value and serializes transparently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueuedRecord(serde_json::Value);

impl QueuedRecord {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Build a record from any serializable payload (e.g. [`super::PizzaDraft`]).
    pub fn from_payload<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(payload).map(Self)
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<serde_json::Value> for QueuedRecord {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// A record as it sits in the local queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRecord {
    pub key: LocalKey,
    pub record: QueuedRecord,
    pub enqueued_at: DateTime<Utc>,
}

/// Highest key in a drained sequence, if any.
///
/// Drain returns records in key order, so this is the last element's key.
pub fn last_key(drained: &[PendingRecord]) -> Option<LocalKey> {
    drained.iter().map(|pending| pending.key).max()
}
