//! Observability - ログ初期化とキューの状態ビュー

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::domain::PendingRecord;
use crate::ports::{LocalQueue, StoreError};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_directive`. Safe to call more than once;
/// later calls are ignored.
pub fn init_logging(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// What is waiting in the local queue right now.
#[derive(Debug, Clone, Serialize)]
pub struct QueueSnapshot {
    pub pending: usize,
    pub oldest_enqueued_at: Option<DateTime<Utc>>,
    pub records: Vec<PendingRecord>,
}

impl QueueSnapshot {
    /// Non-destructive: built from `drain()`.
    pub async fn capture(queue: &dyn LocalQueue) -> Result<Self, StoreError> {
        let records = queue.drain().await?;
        Ok(Self {
            pending: records.len(),
            oldest_enqueued_at: records.iter().map(|pending| pending.enqueued_at).min(),
            records,
        })
    }
}
