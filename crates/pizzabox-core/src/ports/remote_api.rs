//! RemoteApi port - サーバーの create エンドポイント
//!
//! エンドポイントは単一オブジェクトと配列の両方を受け付ける（クライアントとサーバーの契約）。

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::QueuedRecord;

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CreateRequest {
    /// Direct path: one object.
    One(QueuedRecord),
    /// Sync path: every drained record in one array.
    Batch(Vec<QueuedRecord>),
}

impl CreateRequest {
    pub fn len(&self) -> usize {
        match self {
            CreateRequest::One(_) => 1,
            CreateRequest::Batch(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The server could not be reached.
    #[error("request failed: {0}")]
    Transport(String),

    /// Non-2xx response.
    #[error("server responded with status {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },

    /// 2xx response whose body carries a `message` field.
    #[error("server rejected the request: {message}")]
    Rejected { message: String },

    #[error("could not decode server response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Whether queuing the record and trying again later can help.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Transport(_) => true,
            RemoteError::Status { status, .. } => *status >= 500,
            RemoteError::Rejected { .. } | RemoteError::Decode(_) => false,
        }
    }
}

/// RemoteApi はサーバーへの作成リクエストを送る
///
/// 成功時はサーバーが返した作成済みリソース表現（配列またはオブジェクト）を返す。
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn create(&self, request: CreateRequest) -> Result<serde_json::Value, RemoteError>;
}
