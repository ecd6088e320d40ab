//! State - ビューのライフサイクル状態
//!
//! # 状態遷移
//! - inactive → active: show（ポーリング開始）
//! - active → inactive: hide（ポーリング停止）
//! - * → destroyed: destroy（終端状態、以後の show は無視）

/// ViewState はグリッドビューのライフサイクル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Inactive,
    Active,
    Destroyed,
}

impl ViewState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ViewState::Destroyed)
    }
}

/// EditorClose はスケジュール編集ダイアログの閉じ方
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorClose {
    /// 保存して閉じた
    Saved,
    /// 変更せずに閉じた
    Cancelled,
    /// 保存に失敗した（サーバのステータス文言）
    Failed(String),
}
