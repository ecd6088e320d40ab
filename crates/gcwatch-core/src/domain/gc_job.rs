//! GcJobStatus - データストアごとの GC 状態レコード
//!
//! `GET /admin/gc` の 1 要素。`store` がキーで、ほかは未実行なら欠ける。

use serde::{Deserialize, Serialize};

use super::upid::Upid;

/// Status of the garbage collection job of one datastore, as reported by
/// `GET /admin/gc`.
///
/// `store` is the record key. Everything else is optional because a datastore
/// that never ran GC (or has no schedule) reports nothing for those fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GcJobStatus {
    pub store: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_upid: Option<Upid>,

    /// Epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_endtime: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_state: Option<String>,

    /// Epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed_chunks: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_chunks: Option<u64>,
}

impl GcJobStatus {
    pub fn new(store: impl Into<String>) -> Self {
        Self {
            store: store.into(),
            schedule: None,
            last_run_upid: None,
            last_run_endtime: None,
            last_run_state: None,
            next_run: None,
            removed_chunks: None,
            pending_chunks: None,
        }
    }

    /// Runtime of the last run in seconds.
    ///
    /// Derived on read: `last_run_endtime - starttime(last_run_upid)`. `None`
    /// when the run has no end time yet, when the start time cannot be
    /// recovered from the task identifier, or when the difference overflows.
    pub fn duration(&self) -> Option<i64> {
        let endtime = self.last_run_endtime?;
        let starttime = self.last_run_upid.as_ref()?.starttime().ok()?;
        endtime.checked_sub(starttime)
    }

    pub fn has_run(&self) -> bool {
        self.last_run_upid.is_some()
    }
}
