//! SubmissionClient - フォーム送信の入り口
//!
//! - `save_record`: 直接送信に失敗したペイロードをローカルキューに積むだけ。サーバーには触らない
//! - `submit`: まず直接 create を試し、再試行で救える失敗なら `save_record` にフォールバック

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::{LocalKey, PizzaDraft, QueuedRecord};
use crate::ports::{CreateRequest, LocalQueue, RemoteApi, RemoteError, StoreError};

/// What happened to a submitted payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The server created it right away.
    Created(serde_json::Value),
    /// Saved locally; the sync engine sends it on the next connectivity event.
    Queued(LocalKey),
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The server refused the payload; queuing it would not help.
    #[error("submission rejected: {0}")]
    Rejected(#[source] RemoteError),

    /// Direct submission failed and the local fallback failed too.
    #[error("could not save record locally: {0}")]
    Store(#[from] StoreError),

    #[error("could not encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct SubmissionClient {
    queue: Arc<dyn LocalQueue>,
    remote: Arc<dyn RemoteApi>,
}

impl SubmissionClient {
    pub fn new(queue: Arc<dyn LocalQueue>, remote: Arc<dyn RemoteApi>) -> Self {
        Self { queue, remote }
    }

    /// Fallback path: store the payload for the next sync.
    pub async fn save_record(&self, record: QueuedRecord) -> Result<LocalKey, StoreError> {
        match self.queue.enqueue(record).await {
            Ok(key) => {
                info!(%key, "saved record for later submission");
                Ok(key)
            }
            Err(err) => {
                error!(error = %err, "could not save record locally");
                Err(err)
            }
        }
    }

    /// Try the server first; queue locally if it could not be reached.
    pub async fn submit(&self, record: QueuedRecord) -> Result<Submission, SubmitError> {
        match self.remote.create(CreateRequest::One(record.clone())).await {
            Ok(created) => Ok(Submission::Created(created)),
            Err(err) if err.is_retryable() => {
                warn!(error = %err, "direct submission failed; saving locally");
                let key = self.save_record(record).await?;
                Ok(Submission::Queued(key))
            }
            Err(err) => Err(SubmitError::Rejected(err)),
        }
    }

    pub async fn submit_pizza(&self, draft: &PizzaDraft) -> Result<Submission, SubmitError> {
        let record = QueuedRecord::from_payload(draft)?;
        self.submit(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::sync_engine::tests::FakeRemote;
    use crate::domain::PizzaSize;
    use crate::impls::InMemoryLocalQueue;
    use serde_json::json;

    fn client(remote: FakeRemote) -> (SubmissionClient, Arc<InMemoryLocalQueue>, Arc<FakeRemote>) {
        let queue = Arc::new(InMemoryLocalQueue::new());
        let remote = Arc::new(remote);
        (
            SubmissionClient::new(queue.clone(), remote.clone()),
            queue,
            remote,
        )
    }

    #[tokio::test]
    async fn save_record_only_touches_the_queue() {
        let (client, queue, remote) = client(FakeRemote::default());
        let record = QueuedRecord::new(json!({"pizzaName": "Offline Special"}));

        let key = client.save_record(record.clone()).await.unwrap();

        let drained = queue.drain().await.unwrap();
        assert_eq!(drained[0].key, key);
        assert_eq!(drained[0].record, record);
        assert_eq!(remote.calls(), 0);
    }

    #[tokio::test]
    async fn online_submit_goes_straight_to_server() {
        let (client, queue, remote) = client(FakeRemote::replying(vec![Ok(
            json!({"_id": "7", "pizzaName": "Zesty"}),
        )]));

        let draft = PizzaDraft::new("Zesty", "Lernantino").with_size(PizzaSize::Large);
        let outcome = client.submit_pizza(&draft).await.unwrap();

        assert!(matches!(outcome, Submission::Created(ref body) if body["_id"] == "7"));
        assert_eq!(queue.pending_count().await.unwrap(), 0);
        assert!(matches!(
            remote.requests.lock().unwrap()[0],
            CreateRequest::One(_)
        ));
    }

    #[tokio::test]
    async fn unreachable_server_falls_back_to_queue() {
        let (client, queue, _remote) = client(FakeRemote::replying(vec![Err(
            RemoteError::Transport("connection refused".into()),
        )]));
        let record = QueuedRecord::new(json!({"pizzaName": "Zesty", "size": "Large"}));

        let outcome = client.submit(record.clone()).await.unwrap();

        assert!(matches!(outcome, Submission::Queued(_)));
        assert_eq!(queue.drain().await.unwrap()[0].record, record);
    }

    #[tokio::test]
    async fn rejected_payload_is_not_queued() {
        let (client, queue, _remote) = client(FakeRemote::replying(vec![Err(
            RemoteError::Rejected {
                message: "Path `pizzaName` is required.".into(),
            },
        )]));

        let err = client
            .submit(QueuedRecord::new(json!({"size": "Large"})))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Rejected(RemoteError::Rejected { .. })));
        assert_eq!(queue.pending_count().await.unwrap(), 0);
    }
}
