//! SqliteLocalQueue - 再起動をまたいで残るローカルキュー
//!
//! # ストレージ
//! - コンテナ: `<data_dir>/pizza_hunt.sqlite3`（名前固定）
//! - スキーマ: sqlx のマイグレーションで管理（バージョン 1 = `new_pizza` テーブル）
//! - キー: `INTEGER PRIMARY KEY AUTOINCREMENT`（単調増加、再利用なし）
//!
//! マイグレーションは適用済みバージョンを DB に記録するので、
//! 何度 open しても各ステップは一度しか走らない。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use tracing::{debug, info};

use crate::domain::{LocalKey, PendingRecord, QueuedRecord};
use crate::ports::{Clock, LocalQueue, StoreError, SystemClock};

/// Fixed name of the local storage container.
pub const STORE_NAME: &str = "pizza_hunt";

/// Structural version this build expects. Bump together with a new migration.
pub const SCHEMA_VERSION: i64 = 1;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLITE_FULL
const SQLITE_FULL: &str = "13";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(SQLITE_FULL) => {
                StoreError::QuotaExceeded
            }
            unavailable @ (sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
                StoreError::Unavailable(unavailable.to_string())
            }
            other => StoreError::OperationFailed(other.to_string()),
        }
    }
}

impl From<MigrateError> for StoreError {
    fn from(err: MigrateError) -> Self {
        StoreError::Unavailable(format!("migration failed: {err}"))
    }
}

/// SqliteLocalQueue は sqlite ファイルに送信待ちレコードを保存する
///
/// `open()` が作るハンドルを明示的に所有して使う（グローバルな接続は持たない）。
#[derive(Clone)]
pub struct SqliteLocalQueue {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteLocalQueue {
    /// Path of the container inside `data_dir`.
    pub fn database_path(data_dir: impl AsRef<Path>) -> PathBuf {
        data_dir.as_ref().join(format!("{STORE_NAME}.sqlite3"))
    }

    /// Open (creating if absent) the container under `data_dir` and migrate it.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_clock(data_dir, Arc::new(SystemClock)).await
    }

    pub async fn open_with_clock(
        data_dir: impl AsRef<Path>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        tokio::fs::create_dir_all(data_dir).await.map_err(|e| {
            StoreError::Unavailable(format!("cannot create {}: {e}", data_dir.display()))
        })?;

        let path = Self::database_path(data_dir);
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            // enqueue は fsync 完了まで返さない
            .synchronous(SqliteSynchronous::Full)
            .busy_timeout(Duration::from_secs(5));

        let queue = Self::connect(options, clock).await?;
        info!(path = %path.display(), "local queue opened");
        Ok(queue)
    }

    /// Non-durable variant backed by an in-memory sqlite database.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let options: SqliteConnectOptions = "sqlite::memory:".parse()?;
        Self::connect(options, Arc::new(SystemClock)).await
    }

    async fn connect(
        options: SqliteConnectOptions,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        // 単一コネクション: 書き込み順 = キー順 を保つ
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        MIGRATOR.run(&pool).await?;
        debug!(version = SCHEMA_VERSION, "local queue schema up to date");
        Ok(Self { pool, clock })
    }

    /// Highest migration version applied to the container.
    pub async fn schema_version(&self) -> Result<i64, StoreError> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = 1")
                .fetch_one(&self.pool)
                .await?;
        Ok(version.unwrap_or(0))
    }

    /// Number of migration steps ever applied to this container.
    pub async fn applied_migrations(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Close the pool, flushing sqlite state to disk.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl LocalQueue for SqliteLocalQueue {
    async fn enqueue(&self, record: QueuedRecord) -> Result<LocalKey, StoreError> {
        let payload = serde_json::to_string(record.as_json())?;
        let enqueued_at_ms = self.clock.now().timestamp_millis();

        let result = sqlx::query("INSERT INTO new_pizza (payload, enqueued_at_ms) VALUES (?1, ?2)")
            .bind(&payload)
            .bind(enqueued_at_ms)
            .execute(&self.pool)
            .await?;

        let key = LocalKey::new(result.last_insert_rowid());
        debug!(%key, "record enqueued");
        Ok(key)
    }

    async fn drain(&self) -> Result<Vec<PendingRecord>, StoreError> {
        let rows: Vec<(i64, String, i64)> =
            sqlx::query_as("SELECT id, payload, enqueued_at_ms FROM new_pizza ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|(id, payload, enqueued_at_ms)| -> Result<PendingRecord, StoreError> {
                let key = LocalKey::new(id);
                let record = serde_json::from_str(&payload)
                    .map_err(|source| StoreError::Corrupt { key, source })?;
                Ok(PendingRecord {
                    key,
                    record,
                    enqueued_at: DateTime::from_timestamp_millis(enqueued_at_ms)
                        .unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn acknowledge(&self, up_to: LocalKey) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM new_pizza WHERE id <= ?1")
            .bind(up_to.get())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM new_pizza")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn pending_count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM new_pizza")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
