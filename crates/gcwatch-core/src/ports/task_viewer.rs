//! TaskViewer port - タスクモニタ
//!
//! タスクのログや進捗を表示するビュー。中身（タスク状態のポーリングなど）は
//! 実装側の責務で、コントローラは UPID を渡して開くだけ。

use async_trait::async_trait;

use crate::domain::Upid;

/// TaskViewer は UPID をキーにタスクモニタを開く
#[async_trait]
pub trait TaskViewer: Send + Sync {
    async fn open(&self, upid: &Upid);
}
