//! GcJobView - GC ジョブ一覧グリッドのビューモデルとコントローラ
//!
//! # 責務
//! - ライフサイクル（show/hide/destroy）に合わせてストアのポーリングを開始・停止
//! - 単一選択（データがある限り必ずどれかの行が選択されている）
//! - ツールバー操作（スケジュール編集、今すぐ実行、ログ表示、行ダブルクリック）
//! - 行のレンダリング
//!
//! 描画そのものはフロントエンドの責務。ここでは描画に必要な状態だけを持つ。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Local;
use tracing::{debug, info};

use super::labels::Labels;
use super::render::{GridRow, render_row};
use super::store::PollingStore;
use crate::domain::{EditorClose, GcJobStatus, ListenerId, StoreEvent, Upid, ViewState};
use crate::ports::{
    AlertSink, ApiClient, Clock, ScheduleEditor, ScheduleSeed, StoreListener, TaskViewer,
};

/// Which toolbar actions are currently enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionState {
    pub edit_schedule: bool,
    pub run_now: bool,
    pub show_log: bool,
}

/// What an action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// No row selected (or, for show log, no recorded task).
    Disabled,
    /// The task viewer was opened on this task.
    Opened(Upid),
    /// The server refused; the alert carried this text.
    Alerted(String),
    /// The schedule editor was closed and the store reloaded.
    Edited(EditorClose),
}

/// Single-select model fed by store events.
///
/// Holds a copy of the selected record so action gating does not need the
/// store lock.
#[derive(Default)]
struct SelectionModel {
    selected: Mutex<Selection>,
}

#[derive(Default)]
struct Selection {
    record: Option<GcJobStatus>,
    /// Revision of the last snapshot followed.
    revision: u64,
}

impl SelectionModel {
    fn guard(&self) -> MutexGuard<'_, Selection> {
        self.selected.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn selected(&self) -> Option<GcJobStatus> {
        self.guard().record.clone()
    }

    fn set(&self, record: GcJobStatus) {
        self.guard().record = Some(record);
    }

    /// Keep the selection on its record (refreshed), or fall back to the
    /// first row. Only empties when there are no rows at all.
    ///
    /// Snapshots older than the last one followed are ignored.
    fn follow(&self, revision: u64, records: &[GcJobStatus]) {
        let mut selection = self.guard();
        if revision <= selection.revision {
            debug!(revision, seen = selection.revision, "ignoring older snapshot");
            return;
        }
        selection.revision = revision;
        let kept = selection
            .record
            .as_ref()
            .and_then(|current| records.iter().find(|r| r.store == current.store));
        selection.record = kept.or_else(|| records.first()).cloned();
    }
}

impl StoreListener for SelectionModel {
    fn on_event(&self, event: &StoreEvent) {
        if let StoreEvent::Loaded {
            revision, records, ..
        } = event
        {
            self.follow(*revision, records);
        }
    }
}

pub struct GcJobView {
    store: PollingStore,
    api: Arc<dyn ApiClient>,
    task_viewer: Arc<dyn TaskViewer>,
    alerts: Arc<dyn AlertSink>,
    editor: Arc<dyn ScheduleEditor>,
    clock: Arc<dyn Clock>,
    labels: Labels,
    selection: Arc<SelectionModel>,
    selection_listener: ListenerId,
    state: Mutex<ViewState>,
}

impl GcJobView {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        store: PollingStore,
        api: Arc<dyn ApiClient>,
        task_viewer: Arc<dyn TaskViewer>,
        alerts: Arc<dyn AlertSink>,
        editor: Arc<dyn ScheduleEditor>,
        clock: Arc<dyn Clock>,
        labels: Labels,
    ) -> Self {
        let selection = Arc::new(SelectionModel::default());
        let selection_listener = store.subscribe(selection.clone());
        Self {
            store,
            api,
            task_viewer,
            alerts,
            editor,
            clock,
            labels,
            selection,
            selection_listener,
            state: Mutex::new(ViewState::Inactive),
        }
    }

    fn state_guard(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn store(&self) -> &PollingStore {
        &self.store
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn state(&self) -> ViewState {
        *self.state_guard()
    }

    /// inactive → active: start polling.
    pub async fn show(&self) {
        {
            let mut state = self.state_guard();
            if *state != ViewState::Inactive {
                debug!(state = ?*state, "show ignored");
                return;
            }
            *state = ViewState::Active;
        }
        self.store.activate().await;
    }

    /// active → inactive: stop polling.
    pub async fn hide(&self) {
        {
            let mut state = self.state_guard();
            if *state != ViewState::Active {
                return;
            }
            *state = ViewState::Inactive;
        }
        self.store.deactivate().await;
    }

    /// Stop polling and detach from the store. Terminal.
    pub async fn destroy(&self) {
        {
            let mut state = self.state_guard();
            if state.is_terminal() {
                return;
            }
            *state = ViewState::Destroyed;
        }
        self.store.deactivate().await;
        self.store.unsubscribe(self.selection_listener);
    }

    pub fn selected(&self) -> Option<GcJobStatus> {
        self.selection.selected()
    }

    /// Select the row of `store`. Unknown keys leave the selection unchanged.
    pub async fn select(&self, store: &str) -> bool {
        match self.store.get(store).await {
            Some(record) => {
                self.selection.set(record);
                true
            }
            None => false,
        }
    }

    pub fn actions(&self) -> ActionState {
        match self.selection.selected() {
            None => ActionState::default(),
            Some(record) => ActionState {
                edit_schedule: true,
                run_now: true,
                show_log: record.last_run_upid.is_some(),
            },
        }
    }

    /// Rendered rows in store order, using the local timezone.
    pub async fn rows(&self) -> Vec<GridRow> {
        let now = self.clock.now();
        self.store
            .records()
            .await
            .iter()
            .map(|record| render_row(record, &self.labels, now, &Local))
            .collect()
    }

    /// Open the schedule editor on the selected row; reload once it closes.
    pub async fn edit_schedule(&self) -> ActionOutcome {
        let Some(record) = self.selection.selected() else {
            return ActionOutcome::Disabled;
        };
        let seed = ScheduleSeed {
            store: record.store,
            schedule: record.schedule,
        };
        let close = self.editor.edit(seed).await;

        // failures reach the store listeners; nothing else to do here
        let _ = self.store.load().await;
        ActionOutcome::Edited(close)
    }

    /// Start GC on the selected datastore and open the task viewer on it.
    pub async fn run_now(&self) -> ActionOutcome {
        let Some(record) = self.selection.selected() else {
            return ActionOutcome::Disabled;
        };

        match self.api.start_gc(&record.store).await {
            Ok(upid) => {
                info!(store = %record.store, %upid, "garbage collection started");
                self.task_viewer.open(&upid).await;
                ActionOutcome::Opened(upid)
            }
            Err(err) => {
                let text = err.status_text();
                info!(store = %record.store, error = %err, "starting garbage collection failed");
                self.alerts.alert(&self.labels.error, &text);
                ActionOutcome::Alerted(text)
            }
        }
    }

    /// Open the task viewer on the last recorded run of the selected row.
    pub async fn show_log(&self) -> ActionOutcome {
        let Some(upid) = self
            .selection
            .selected()
            .and_then(|record| record.last_run_upid)
        else {
            return ActionOutcome::Disabled;
        };
        self.task_viewer.open(&upid).await;
        ActionOutcome::Opened(upid)
    }

    pub async fn row_double_click(&self, store: &str) -> ActionOutcome {
        if !self.select(store).await {
            return ActionOutcome::Disabled;
        }
        self.edit_schedule().await
    }
}
