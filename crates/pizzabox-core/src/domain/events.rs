//! Events - 接続状態とその遷移イベント

use serde::{Deserialize, Serialize};

/// Reachability as reported by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    pub fn is_online(self) -> bool {
        matches!(self, Connectivity::Online)
    }
}

/// ConnectivityEvent は flush のきっかけ
///
/// - `StorageReady`: ストレージ接続完了時に一度だけ（起動時すでにオンラインの場合）
/// - `Restored`: offline → online の遷移ごとに一度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    StorageReady,
    Restored,
}
