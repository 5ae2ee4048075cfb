//! TracingNotifier - flush 完了をログに出すだけの通知

use tracing::info;

use crate::domain::FlushReport;
use crate::ports::{CONFIRMATION_MESSAGE, Notifier};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn confirm(&self, report: &FlushReport) {
        info!(
            flush_id = %report.flush_id,
            submitted = report.submitted,
            "{CONFIRMATION_MESSAGE}"
        );
    }
}
