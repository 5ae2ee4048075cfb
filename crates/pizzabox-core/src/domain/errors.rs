//! Errors - エラー型と分類
//!
//! # 分類
//! - Storage: ローカルストレージの open/read/write 失敗、容量超過
//! - Network: サーバーに到達できない
//! - Server: 2xx 以外、または 2xx で `message` を含むレスポンス
//!
//! どれも現在の試行だけを終わらせる。リトライは次の接続復帰イベントに任せる。

use crate::ports::{RemoteError, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Storage,
    Network,
    Server,
}

/// A failed flush attempt.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Store(_) => ErrorKind::Storage,
            SyncError::Remote(RemoteError::Transport(_)) => ErrorKind::Network,
            SyncError::Remote(_) => ErrorKind::Server,
        }
    }
}
