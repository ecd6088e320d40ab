//! ViewBuilder - GC ジョブビューの構築とワイヤリング
//!
//! # 起動時検証（Fail-fast）
//! - UI 側のポート（TaskViewer, AlertSink, ScheduleEditor）は必須
//! - 未設定のポートがあれば build() で BuildError を返す
//! - ポーリング間隔 0 は拒否

use std::sync::Arc;
use std::time::Duration;

use super::controller::GcJobView;
use super::labels::Labels;
use super::namespace::NamespaceSelector;
use super::store::{DEFAULT_POLL_INTERVAL, PollingStore};
use crate::ports::{
    AlertSink, ApiClient, Clock, IdGenerator, ScheduleEditor, SystemClock, TaskViewer,
    UlidGenerator,
};

/// ViewBuilder は GcJobView を構築
///
/// # 使用例
/// ```ignore
/// let view = ViewBuilder::new(api)
///     .task_viewer(viewer)
///     .alerts(alerts)
///     .schedule_editor(editor)
///     .build()?;
/// view.show().await;
/// ```
pub struct ViewBuilder {
    api: Arc<dyn ApiClient>,
    task_viewer: Option<Arc<dyn TaskViewer>>,
    alerts: Option<Arc<dyn AlertSink>>,
    editor: Option<Arc<dyn ScheduleEditor>>,
    clock: Arc<dyn Clock>,
    ids: Option<Arc<dyn IdGenerator>>,
    labels: Labels,
    interval: Duration,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("Missing ports: {0:?}. These must be set before build().")]
    MissingPorts(Vec<&'static str>),

    #[error("poll interval must be greater than zero")]
    InvalidInterval,
}

impl ViewBuilder {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            task_viewer: None,
            alerts: None,
            editor: None,
            clock: Arc::new(SystemClock),
            ids: None,
            labels: Labels::default(),
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn task_viewer(mut self, viewer: Arc<dyn TaskViewer>) -> Self {
        self.task_viewer = Some(viewer);
        self
    }

    pub fn alerts(mut self, alerts: Arc<dyn AlertSink>) -> Self {
        self.alerts = Some(alerts);
        self
    }

    pub fn schedule_editor(mut self, editor: Arc<dyn ScheduleEditor>) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Defaults to a ULID generator on the system clock.
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Namespace selector sharing this builder's client and labels.
    pub fn namespace_selector(&self) -> NamespaceSelector {
        NamespaceSelector::new(Arc::clone(&self.api), self.labels.clone())
    }

    pub fn build(self) -> Result<GcJobView, BuildError> {
        if self.interval.is_zero() {
            return Err(BuildError::InvalidInterval);
        }

        let mut missing = Vec::new();
        if self.task_viewer.is_none() {
            missing.push("task_viewer");
        }
        if self.alerts.is_none() {
            missing.push("alerts");
        }
        if self.editor.is_none() {
            missing.push("schedule_editor");
        }
        let (Some(task_viewer), Some(alerts), Some(editor)) =
            (self.task_viewer, self.alerts, self.editor)
        else {
            return Err(BuildError::MissingPorts(missing));
        };

        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(SystemClock)));
        let store = PollingStore::new(Arc::clone(&self.api), ids, self.interval);

        Ok(GcJobView::new(
            store,
            self.api,
            task_viewer,
            alerts,
            editor,
            self.clock,
            self.labels,
        ))
    }
}
