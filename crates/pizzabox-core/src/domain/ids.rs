//! Domain identifiers (strongly-typed IDs).
//!
//! # 2 種類の ID
//! - **LocalKey**: ローカルキューが自動採番する整数キー（単調増加、再利用しない）
//! - **FlushId**: flush 試行ごとの ULID（ログの相関用）
//!
//! ## Phantom Type パターン
//! `Id<T>` というジェネリック型で共通実装を提供しつつ、
//! `T` は実行時には使わない（PhantomData）マーカー型として、
//! コンパイル時の型安全性を提供します。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// LocalKey はローカルキューのレコードキー
///
/// ストレージ層が採番します。キーは厳密に単調増加し、削除後も再利用されません。
/// そのため「drain で見えた最大キー以下」を消すと、drain が返したレコードだけが消えます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalKey(i64);

impl LocalKey {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for LocalKey {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for LocalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// Display で使うプレフィックス（例: "flush-"）
    fn prefix() -> &'static str;
}

/// ジェネリック ULID ID 型
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// ULID から Id を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// 内部の ULID を取得
    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Flush のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flush {}

impl IdMarker for Flush {
    fn prefix() -> &'static str {
        "flush-"
    }
}

/// Identifier of one flush attempt (drain → submit → acknowledge).
pub type FlushId = Id<Flush>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_id_display_has_prefix() {
        let ulid = Ulid::new();
        let id = FlushId::from_ulid(ulid);
        assert_eq!(id.as_ulid(), ulid);
        assert_eq!(id.to_string(), format!("flush-{ulid}"));
    }

    #[test]
    fn flush_ids_are_sortable() {
        let id1 = FlushId::from_ulid(Ulid::new());
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = FlushId::from_ulid(Ulid::new());
        assert!(id1 < id2);
    }

    #[test]
    fn local_keys_order_by_value() {
        let a = LocalKey::new(1);
        let b = LocalKey::from(7);
        assert!(a < b);
        assert_eq!(b.get(), 7);
        assert_eq!(b.to_string(), "#7");
    }

    #[test]
    fn local_key_serializes_as_plain_number() {
        let s = serde_json::to_string(&LocalKey::new(42)).unwrap();
        assert_eq!(s, "42");
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;
        assert_eq!(size_of::<FlushId>(), size_of::<Ulid>());
    }
}
