//! pizzabox-core
//!
//! オフライン時の書き込みキューと、再接続時の一括同期。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（LocalKey, QueuedRecord, PizzaDraft, Connectivity, FlushOutcome, errors）
//! - **ports**: 抽象化レイヤー（LocalQueue, RemoteApi, Notifier, Clock, IdGenerator）
//! - **impls**: 実装（SqliteLocalQueue, InMemoryLocalQueue, HttpRemoteApi, TracingNotifier）
//! - **app**: アプリケーションロジック（builder, connectivity, sync_engine, submission）
//! - **config**: 環境変数からの設定
//! - **observability**: ログ初期化とキューの状態ビュー

pub mod domain;
pub mod ports;
pub mod impls;
pub mod app;
pub mod config;
pub mod observability;
