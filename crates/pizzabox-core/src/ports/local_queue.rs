//! LocalQueue port - 送信できなかったレコードの永続キュー
//!
//! # 実装
//! - **SqliteLocalQueue**: sqlite ファイル（本番用、再起動をまたいで残る）
//! - **InMemoryLocalQueue**: プロセス内のみ（開発・テスト用）

use async_trait::async_trait;

use crate::domain::{LocalKey, PendingRecord, QueuedRecord};

/// Storage-layer failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("local storage unavailable: {0}")]
    Unavailable(String),

    #[error("local storage quota exceeded")]
    QuotaExceeded,

    #[error("queued record {key} is not valid JSON: {source}")]
    Corrupt {
        key: LocalKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("storage operation failed: {0}")]
    OperationFailed(String),
}

/// LocalQueue は送信待ちレコードを保持する
///
/// # 設計原則
/// - `enqueue` はストレージが書き込みを確定してから返る
/// - `drain` は非破壊読み出し（キー順 = 挿入順）
/// - 削除は送信成功が確定したレコードだけ（`acknowledge`）
///
/// # 並行性
/// ロックは持たない。drain と acknowledge の間に入った enqueue は
/// drain の結果に含まれず、acknowledge でも消えない。
#[async_trait]
pub trait LocalQueue: Send + Sync {
    /// Append a record; returns its auto-assigned key once durably written.
    async fn enqueue(&self, record: QueuedRecord) -> Result<LocalKey, StoreError>;

    /// All queued records in insertion order, without removing them.
    async fn drain(&self) -> Result<Vec<PendingRecord>, StoreError>;

    /// Remove every record whose key is `<= up_to`.
    ///
    /// Returns the number of removed records.
    async fn acknowledge(&self, up_to: LocalKey) -> Result<u64, StoreError>;

    /// Remove all records, including ones enqueued after the last drain.
    async fn clear(&self) -> Result<u64, StoreError>;

    async fn pending_count(&self) -> Result<u64, StoreError>;
}
