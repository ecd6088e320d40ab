//! ScheduleEditor port - GC スケジュール編集ダイアログ
//!
//! ダイアログは選択中レコードの `store` と `schedule` で初期化され、
//! 保存（サーバへの送信）はダイアログ自身が行う。コントローラは
//! 閉じられた時点でストアを即時リロードするだけ。

use async_trait::async_trait;

use crate::domain::EditorClose;

/// Values the editor form is seeded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSeed {
    pub store: String,
    pub schedule: Option<String>,
}

/// ScheduleEditor はモーダルを開き、閉じられるまで待つ
#[async_trait]
pub trait ScheduleEditor: Send + Sync {
    async fn edit(&self, seed: ScheduleSeed) -> EditorClose;
}
