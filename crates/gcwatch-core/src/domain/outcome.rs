//! Outcome - タスクの終了状態の分類
//!
//! サーバは終了したタスクの結果を文字列で返す（`OK`, `WARNINGS: 2`, `unknown`,
//! またはエラーメッセージ）。既知の形式以外はすべてエラー扱い。

use serde::{Deserialize, Serialize};

/// Severity of a task outcome, used for status styling.
///
/// `NotRun` and `Running` are not server states: they describe a record that
/// has no task identifier yet, or one whose task has not ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSeverity {
    NotRun,
    Running,
    Ok,
    Warning,
    Error,
    Unknown,
}

impl TaskSeverity {
    /// Classify a server-side exit state string.
    pub fn classify(state: &str) -> Self {
        match state {
            "OK" => TaskSeverity::Ok,
            "unknown" => TaskSeverity::Unknown,
            s if s.starts_with("WARNINGS: ") => TaskSeverity::Warning,
            _ => TaskSeverity::Error,
        }
    }
}
