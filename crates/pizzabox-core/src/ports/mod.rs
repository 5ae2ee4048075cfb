//! Ports - 抽象化レイヤー
//!
//! 各 trait は外部（ローカルストレージ、サーバー API、UI 通知）への
//! インターフェースを提供し、実装の詳細を隠蔽します。

pub mod local_queue;
pub mod remote_api;
pub mod notifier;
pub mod clock;
pub mod id_generator;

// 主要な trait を再エクスポート
pub use self::local_queue::{LocalQueue, StoreError};
pub use self::remote_api::{CreateRequest, RemoteApi, RemoteError};
pub use self::notifier::{CONFIRMATION_MESSAGE, Notifier};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
