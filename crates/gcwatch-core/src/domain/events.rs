//! Events - ポーリングストアが発行するイベント
//!
//! 購読者（StoreListener）へ明示的に配送します。

use super::errors::ApiError;
use super::gc_job::GcJobStatus;

/// StoreDiff は前回スナップショットとの差分（キーのみ、昇順）
///
/// 変化のないレコードはどの集合にも含まれない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreDiff {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

impl StoreDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    /// Keys whose rows must be re-rendered (added or updated).
    pub fn touched(&self) -> impl Iterator<Item = &String> {
        self.added.iter().chain(self.updated.iter())
    }
}

/// StoreEvent は購読者に配送されるイベント
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// 応答を反映した。`records` は反映後の全レコード（store 昇順）
    ///
    /// `revision` は反映のたびに 1 ずつ増える。配送の順序は反映の順序と
    /// 一致しないことがあるので、購読者は古い revision を無視する。
    Loaded {
        revision: u64,
        diff: StoreDiff,
        records: Vec<GcJobStatus>,
    },

    /// 取得に失敗した（タイマーは止まらない）
    LoadFailed(ApiError),
}
