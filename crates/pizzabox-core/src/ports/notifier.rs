//! Notifier port - flush 完了をユーザーに知らせる
//!
//! 失敗は通知しない（ログのみ）。通知するのは成功した flush だけ。

use crate::domain::FlushReport;

/// Text shown to the user after a completed flush.
pub const CONFIRMATION_MESSAGE: &str = "All saved pizzas have been submitted!";

pub trait Notifier: Send + Sync {
    fn confirm(&self, report: &FlushReport);
}
