//! Labels - 表示ラベル（ローカライズ可能なプレースホルダ文字列）

use serde::{Deserialize, Serialize};

/// Texts the view shows in place of missing or special values.
///
/// Every field has an English default, so a partial override (e.g. from a
/// config file) only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Schedule cell when no schedule is set.
    pub none: String,
    /// Display text of the root namespace.
    pub root: String,
    /// Next-run cell when the scheduled time already passed.
    pub pending: String,
    /// Cell text for "nothing recorded" (never run, no next run).
    pub no_value: String,
    pub ok: String,
    pub unknown: String,
    pub error: String,
    pub running: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            none: "None".to_string(),
            root: "Root".to_string(),
            pending: "pending".to_string(),
            no_value: "-".to_string(),
            ok: "OK".to_string(),
            unknown: "unknown".to_string(),
            error: "Error".to_string(),
            running: "running".to_string(),
        }
    }
}
