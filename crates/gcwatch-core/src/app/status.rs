//! Status - ストアの状態スナップショット（観測用）

use serde::{Deserialize, Serialize};

/// StoreStatus はポーリングストアの現在の状態
///
/// # 使用例
/// ```ignore
/// let status = store.status().await;
/// tracing::debug!(?status, "store status");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub active: bool,
    /// At least one response has been applied.
    pub loaded: bool,
    pub generation: u64,
    pub records: usize,
    pub running_timers: usize,
    /// Error of the most recent poll, cleared by the next success.
    pub last_error: Option<String>,
}
