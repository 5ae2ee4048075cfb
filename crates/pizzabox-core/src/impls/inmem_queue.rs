//! InMemoryLocalQueue - 開発用のローカルキュー
//!
//! プロセスが終われば消える。永続性が必要なら SqliteLocalQueue を使う。

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{LocalKey, PendingRecord, QueuedRecord};
use crate::ports::{Clock, LocalQueue, StoreError, SystemClock};

struct InMemoryState {
    /// キー順に並ぶので drain がそのまま挿入順になる
    records: BTreeMap<LocalKey, PendingRecord>,
    /// 次に採番するキー（削除しても巻き戻さない）
    next_key: i64,
}

/// InMemoryLocalQueue は非永続のローカルキュー
///
/// # 実装詳細
/// - BTreeMap<LocalKey, PendingRecord> で挿入順を保つ
/// - tokio の Mutex で排他制御（ロックを跨いで await しない）
pub struct InMemoryLocalQueue {
    state: Arc<Mutex<InMemoryState>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryLocalQueue {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryState {
                records: BTreeMap::new(),
                next_key: 1,
            })),
            clock,
        }
    }
}

impl Default for InMemoryLocalQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocalQueue for InMemoryLocalQueue {
    async fn enqueue(&self, record: QueuedRecord) -> Result<LocalKey, StoreError> {
        let enqueued_at = self.clock.now();
        let mut state = self.state.lock().await;
        let key = LocalKey::new(state.next_key);
        state.next_key += 1;
        state.records.insert(
            key,
            PendingRecord {
                key,
                record,
                enqueued_at,
            },
        );
        Ok(key)
    }

    async fn drain(&self) -> Result<Vec<PendingRecord>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.records.values().cloned().collect())
    }

    async fn acknowledge(&self, up_to: LocalKey) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let kept = state.records.split_off(&LocalKey::new(up_to.get() + 1));
        let removed = std::mem::replace(&mut state.records, kept);
        Ok(removed.len() as u64)
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let removed = state.records.len() as u64;
        state.records.clear();
        Ok(removed)
    }

    async fn pending_count(&self) -> Result<u64, StoreError> {
        let state = self.state.lock().await;
        Ok(state.records.len() as u64)
    }
}
