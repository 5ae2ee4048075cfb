//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **SqliteLocalQueue**: 永続ローカルキュー（本番用）
//! - **InMemoryLocalQueue**: 非永続ローカルキュー（開発・テスト用）
//! - **HttpRemoteApi**: reqwest による create エンドポイントのクライアント
//! - **TracingNotifier**: flush 完了をログに出す通知

pub mod sqlite_queue;
pub mod inmem_queue;
pub mod http_api;
pub mod log_notifier;

// 主要な型を再エクスポート
pub use self::sqlite_queue::{SCHEMA_VERSION, STORE_NAME, SqliteLocalQueue};
pub use self::inmem_queue::InMemoryLocalQueue;
pub use self::http_api::HttpRemoteApi;
pub use self::log_notifier::TracingNotifier;
