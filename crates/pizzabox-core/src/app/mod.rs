//! App - アプリケーション層
//!
//! ports を組み合わせてオフライン送信と再接続時の同期を実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **ConnectivityMonitor**: offline → online 遷移の検出
//! - **SyncEngine**: ローカルキューの flush（drain → 一括送信 → acknowledge → 通知）
//! - **SubmissionClient**: 直接送信とローカル保存へのフォールバック

pub mod builder;
pub mod connectivity;
pub mod sync_engine;
pub mod submission;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::connectivity::{ConnectivityMonitor, ConnectivitySubscription};
pub use self::sync_engine::{SyncEngine, SyncHandle};
pub use self::submission::{Submission, SubmissionClient, SubmitError};
