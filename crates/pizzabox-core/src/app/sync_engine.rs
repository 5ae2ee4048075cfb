//! SyncEngine - ローカルキューをサーバーへ flush する
//!
//! # フロー
//! 1. 接続イベント（Restored / StorageReady）を受け取る
//! 2. LocalQueue::drain() で全件取得（空なら何もしない）
//! 3. RemoteApi::create() に配列 1 回で送る
//! 4. 成功: drain で見えたキーだけ acknowledge → Notifier で通知
//! 5. 失敗: キューはそのまま、ログのみ。自動リトライはしない（次の接続イベント待ち）
//!
//! # 並行性
//! flush は直列化する。flush 中に来たイベントは前の flush の完了を待ってから drain するので、
//! 同じレコードを二重に送ることはない。

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::app::connectivity::ConnectivitySubscription;
use crate::domain::{ConnectivityEvent, FlushOutcome, FlushReport, SyncError, last_key};
use crate::ports::{
    CreateRequest, IdGenerator, LocalQueue, Notifier, RemoteApi, SystemClock, UlidGenerator,
};

pub struct SyncEngine {
    queue: Arc<dyn LocalQueue>,
    remote: Arc<dyn RemoteApi>,
    notifier: Arc<dyn Notifier>,
    ids: Arc<dyn IdGenerator>,
    flush_lock: Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        queue: Arc<dyn LocalQueue>,
        remote: Arc<dyn RemoteApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            queue,
            remote,
            notifier,
            ids: Arc::new(UlidGenerator::new(SystemClock)),
            flush_lock: Mutex::new(()),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Drain, submit as one batch, and remove what was submitted.
    ///
    /// Returns `Idle` when nothing was queued. On error the queue is left as it was.
    pub async fn flush(&self) -> Result<FlushOutcome, SyncError> {
        let _guard = self.flush_lock.lock().await;

        let drained = self.queue.drain().await?;
        let Some(up_to) = last_key(&drained) else {
            debug!("nothing queued");
            return Ok(FlushOutcome::Idle);
        };

        let flush_id = self.ids.generate_flush_id();
        let submitted = drained.len();
        info!(%flush_id, records = submitted, "submitting queued records");

        let batch = drained.into_iter().map(|pending| pending.record).collect();
        let created = self.remote.create(CreateRequest::Batch(batch)).await?;

        // drain 以降に enqueue されたレコードは up_to より大きいキーを持つので残る
        let removed = self.queue.acknowledge(up_to).await?;
        if removed != submitted as u64 {
            warn!(%flush_id, submitted, removed, "acknowledged count differs from batch size");
        }

        let report = FlushReport {
            flush_id,
            submitted,
            created,
        };
        self.notifier.confirm(&report);
        Ok(FlushOutcome::Flushed(report))
    }

    /// React to a connectivity event.
    ///
    /// Nobody is waiting on the result of an event, so failures end here: logged,
    /// queue untouched, no retry scheduled.
    pub async fn handle(&self, event: ConnectivityEvent) -> Option<FlushOutcome> {
        debug!(?event, "sync triggered");
        match self.flush().await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                error!(?event, kind = ?err.kind(), error = %err, "sync failed; records stay queued");
                None
            }
        }
    }

    /// Run the engine on a background task until shutdown or until the monitor goes away.
    pub fn spawn(self: Arc<Self>, subscription: ConnectivitySubscription) -> SyncHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(sync_loop(self, subscription, shutdown_rx));
        SyncHandle { shutdown_tx, join }
    }
}

/// Background engine handle.
/// - `request_shutdown()` で新しいイベントの受付を止める
/// - 実行中の flush はキャンセルしない
pub struct SyncHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SyncHandle {
    pub fn request_shutdown(&self) {
        // receiver がすでに drop されていても構わない
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        if let Err(e) = self.join.await {
            error!(error = %e, "sync task ended abnormally");
        }
    }
}

async fn sync_loop(
    engine: Arc<SyncEngine>,
    mut subscription: ConnectivitySubscription,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            // 停止要求より前に届いていたトリガーは捨てない（1 回の flush にまとめる）
            let mut pending = None;
            while let Some(event) = subscription.try_recv() {
                pending = Some(event);
            }
            if let Some(event) = pending {
                engine.handle(event).await;
            }
            break;
        }

        let event = tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            event = subscription.recv() => event,
        };

        let Some(event) = event else {
            debug!("connectivity monitor dropped; stopping sync loop");
            break;
        };

        engine.handle(event).await;
    }
}
