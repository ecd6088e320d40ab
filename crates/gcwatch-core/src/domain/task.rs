use serde::{Deserialize, Serialize};

use super::outcome::TaskSeverity;
use super::upid::Upid;

/// Whether a task worker is still alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskRunState {
    Running,
    Stopped,
}

/// `GET /nodes/{node}/tasks/{upid}/status` の応答。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub upid: Upid,
    pub status: TaskRunState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exitstatus: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starttime: Option<i64>,
}

impl TaskStatus {
    pub fn is_finished(&self) -> bool {
        self.status == TaskRunState::Stopped
    }

    pub fn severity(&self) -> TaskSeverity {
        match (&self.status, self.exitstatus.as_deref()) {
            (TaskRunState::Running, _) => TaskSeverity::Running,
            (TaskRunState::Stopped, Some(exit)) => TaskSeverity::classify(exit),
            (TaskRunState::Stopped, None) => TaskSeverity::Unknown,
        }
    }
}
