//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - create URL の組み立て、HTTP クライアント、ローカルキューのオープンは全て `build()` で行う
//! - どれか失敗すれば `BuildError` を返し、同期エンジンは起動しない
//!
//! # 起動順序
//! `App::start()` は「購読 → エンジン起動 → StorageReady 発火」の順。
//! 逆にすると前回セッションの残りレコードが次の Restored まで送られない。

use std::sync::Arc;

use tracing::{debug, info};

use crate::app::connectivity::ConnectivityMonitor;
use crate::app::submission::SubmissionClient;
use crate::app::sync_engine::{SyncEngine, SyncHandle};
use crate::config::{Config, ConfigError};
use crate::domain::Connectivity;
use crate::impls::{HttpRemoteApi, SqliteLocalQueue, TracingNotifier};
use crate::ports::{IdGenerator, LocalQueue, Notifier, RemoteApi, RemoteError, StoreError};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new(Config::from_env()?)
///     .with_initial_connectivity(Connectivity::Offline)
///     .build()
///     .await?;
/// let handle = app.start();
/// ```
pub struct AppBuilder {
    config: Config,
    queue: Option<Arc<dyn LocalQueue>>,
    remote: Option<Arc<dyn RemoteApi>>,
    notifier: Arc<dyn Notifier>,
    ids: Option<Arc<dyn IdGenerator>>,
    initial: Connectivity,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("could not open local queue: {0}")]
    Store(#[from] StoreError),

    #[error("could not build http client: {0}")]
    Remote(#[from] RemoteError),
}

impl AppBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            queue: None,
            remote: None,
            notifier: Arc::new(TracingNotifier),
            ids: None,
            initial: Connectivity::Online,
        }
    }

    /// Use this queue instead of opening the sqlite store under `data_dir`.
    pub fn with_queue(mut self, queue: Arc<dyn LocalQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Use this remote instead of the HTTP client for `create_url`.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteApi>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn with_initial_connectivity(mut self, initial: Connectivity) -> Self {
        self.initial = initial;
        self
    }

    pub async fn build(self) -> Result<App, BuildError> {
        let remote: Arc<dyn RemoteApi> = match self.remote {
            Some(remote) => remote,
            None => {
                let url = self.config.create_url()?;
                let api = match self.config.request_timeout {
                    Some(timeout) => HttpRemoteApi::with_timeout(url, timeout)?,
                    None => HttpRemoteApi::new(url),
                };
                debug!(create_url = %api.create_url(), "http remote configured");
                Arc::new(api)
            }
        };

        let queue: Arc<dyn LocalQueue> = match self.queue {
            Some(queue) => queue,
            None => Arc::new(SqliteLocalQueue::open(&self.config.data_dir).await?),
        };

        let mut engine = SyncEngine::new(queue.clone(), remote.clone(), self.notifier);
        if let Some(ids) = self.ids {
            engine = engine.with_id_generator(ids);
        }

        info!(
            data_dir = %self.config.data_dir.display(),
            initial = ?self.initial,
            "app built"
        );

        Ok(App {
            submissions: SubmissionClient::new(queue.clone(), remote),
            monitor: Arc::new(ConnectivityMonitor::new(self.initial)),
            engine: Arc::new(engine),
            queue,
            config: self.config,
        })
    }
}

/// App はアプリケーションのランタイム
pub struct App {
    pub config: Config,
    pub queue: Arc<dyn LocalQueue>,
    pub monitor: Arc<ConnectivityMonitor>,
    pub engine: Arc<SyncEngine>,
    pub submissions: SubmissionClient,
}

impl App {
    /// Start the background sync engine and fire the storage-ready trigger.
    pub fn start(&self) -> SyncHandle {
        let subscription = self.monitor.subscribe();
        let handle = self.engine.clone().spawn(subscription);
        self.monitor.announce_storage_ready();
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::sync_engine::tests::{FakeRemote, RecordingNotifier};
    use crate::domain::QueuedRecord;
    use crate::impls::InMemoryLocalQueue;
    use serde_json::json;
    use std::time::Duration;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(move |name: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    async fn wait_for_reports(notifier: &RecordingNotifier, n: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while notifier.reports.lock().unwrap().len() < n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_build_with_injected_ports() {
        let app = AppBuilder::new(config(&[]))
            .with_queue(Arc::new(InMemoryLocalQueue::new()))
            .with_remote(Arc::new(FakeRemote::default()))
            .build()
            .await;
        assert!(app.is_ok());
    }

    #[tokio::test]
    async fn test_build_rejects_unusable_create_url() {
        let app = AppBuilder::new(config(&[(crate::config::ENV_API_BASE_URL, "mailto:pizza")]))
            .with_queue(Arc::new(InMemoryLocalQueue::new()))
            .build()
            .await;
        assert!(matches!(app, Err(BuildError::Config(ConfigError::InvalidUrl { .. }))));
    }

    #[tokio::test]
    async fn test_build_opens_sqlite_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested");
        let app = AppBuilder::new(config(&[(
            crate::config::ENV_DATA_DIR,
            data_dir.to_str().unwrap(),
        )]))
        .with_remote(Arc::new(FakeRemote::default()))
        .build()
        .await
        .unwrap();

        app.queue
            .enqueue(QueuedRecord::new(json!({"pizzaName": "Zesty"})))
            .await
            .unwrap();
        assert!(SqliteLocalQueue::database_path(&data_dir).exists());
    }

    #[tokio::test]
    async fn test_start_flushes_leftovers_from_previous_session() {
        let queue = Arc::new(InMemoryLocalQueue::new());
        queue
            .enqueue(QueuedRecord::new(json!({"pizzaName": "Zesty", "size": "Large"})))
            .await
            .unwrap();
        let remote = Arc::new(FakeRemote::replying(vec![Ok(json!([{"_id": "1"}]))]));
        let notifier = Arc::new(RecordingNotifier::default());

        let app = AppBuilder::new(config(&[]))
            .with_queue(queue.clone())
            .with_remote(remote.clone())
            .with_notifier(notifier.clone())
            .build()
            .await
            .unwrap();
        let handle = app.start();

        wait_for_reports(&notifier, 1).await;
        handle.shutdown_and_join().await;
        assert_eq!(queue.pending_count().await.unwrap(), 0);
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test]
    async fn test_start_offline_waits_for_restored() {
        let queue = Arc::new(InMemoryLocalQueue::new());
        queue
            .enqueue(QueuedRecord::new(json!({"pizzaName": "Zesty"})))
            .await
            .unwrap();
        let remote = Arc::new(FakeRemote::replying(vec![Ok(json!([{"_id": "1"}]))]));
        let notifier = Arc::new(RecordingNotifier::default());

        let app = AppBuilder::new(config(&[]))
            .with_queue(queue.clone())
            .with_remote(remote.clone())
            .with_notifier(notifier.clone())
            .with_initial_connectivity(Connectivity::Offline)
            .build()
            .await
            .unwrap();
        let handle = app.start();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(remote.calls(), 0);

        app.monitor.report(Connectivity::Online);
        wait_for_reports(&notifier, 1).await;
        handle.shutdown_and_join().await;
        assert_eq!(queue.pending_count().await.unwrap(), 0);
    }
}
