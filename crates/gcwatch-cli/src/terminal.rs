//! ターミナル向けのポート実装
//!
//! - TerminalTaskViewer: タスク状態を停止まで追いかけて表示（読めなかったら失敗を記録）
//! - TerminalAlerts: stderr へのアラート
//! - CommandLineScheduleEditor: コマンドライン引数の値でスケジュールを保存
//! - GridPrinter: ストアの変更ごとにグリッドを再表示

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use gcwatch_core::app::{GridRow, Labels, render_row_local};
use gcwatch_core::domain::{EditorClose, StoreEvent, TaskRunState, Upid};
use gcwatch_core::ports::{
    AlertSink, ApiClient, Clock, ScheduleEditor, ScheduleSeed, StoreListener, TaskViewer,
};
use tracing::{info, warn};

const TASK_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct TerminalTaskViewer {
    api: Arc<dyn ApiClient>,
    failure: Mutex<Option<String>>,
}

impl TerminalTaskViewer {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            failure: Mutex::new(None),
        }
    }

    /// Why the last follow stopped before the task finished, if it did.
    pub fn take_failure(&self) -> Option<String> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[async_trait]
impl TaskViewer for TerminalTaskViewer {
    async fn open(&self, upid: &Upid) {
        println!("task {upid}");
        let mut last: Option<TaskRunState> = None;
        loop {
            match self.api.task_status(upid).await {
                Ok(status) => {
                    if last != Some(status.status) {
                        println!("  status: {:?}", status.status);
                        last = Some(status.status);
                    }
                    if status.is_finished() {
                        let exit = status.exitstatus.as_deref().unwrap_or("unknown");
                        println!("  result: {exit} ({:?})", status.severity());
                        return;
                    }
                }
                Err(err) => {
                    warn!(%upid, error = %err, "unable to read task status");
                    *self.failure.lock().unwrap_or_else(PoisonError::into_inner) =
                        Some(err.status_text());
                    return;
                }
            }
            tokio::time::sleep(TASK_POLL_INTERVAL).await;
        }
    }
}

pub struct TerminalAlerts;

impl AlertSink for TerminalAlerts {
    fn alert(&self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
    }
}

/// Saves the schedule given on the command line; `None` clears it.
pub struct CommandLineScheduleEditor {
    api: Arc<dyn ApiClient>,
    schedule: Option<String>,
}

impl CommandLineScheduleEditor {
    pub fn new(api: Arc<dyn ApiClient>, schedule: Option<String>) -> Self {
        Self { api, schedule }
    }
}

#[async_trait]
impl ScheduleEditor for CommandLineScheduleEditor {
    async fn edit(&self, seed: ScheduleSeed) -> EditorClose {
        if seed.schedule == self.schedule {
            info!(store = %seed.store, "schedule unchanged");
            return EditorClose::Cancelled;
        }
        match self
            .api
            .update_gc_schedule(&seed.store, self.schedule.as_deref())
            .await
        {
            Ok(()) => {
                info!(store = %seed.store, schedule = ?self.schedule, "schedule saved");
                EditorClose::Saved
            }
            Err(err) => {
                warn!(store = %seed.store, error = %err, "saving schedule failed");
                EditorClose::Failed(err.status_text())
            }
        }
    }
}

/// Prints the grid after every load that changed something, and a one-line
/// banner on poll failures.
pub struct GridPrinter {
    labels: Labels,
    clock: Arc<dyn Clock>,
    printed: AtomicU64,
}

impl GridPrinter {
    pub fn new(labels: Labels, clock: Arc<dyn Clock>) -> Self {
        Self {
            labels,
            clock,
            printed: AtomicU64::new(0),
        }
    }
}

impl StoreListener for GridPrinter {
    fn on_event(&self, event: &StoreEvent) {
        match event {
            StoreEvent::Loaded {
                revision,
                diff,
                records,
            } => {
                // an older snapshot arriving late must not overwrite a newer grid
                if self.printed.fetch_max(*revision, Ordering::SeqCst) >= *revision {
                    return;
                }
                if diff.is_empty() {
                    return;
                }
                let now = self.clock.now();
                let rows: Vec<GridRow> = records
                    .iter()
                    .map(|record| render_row_local(record, &self.labels, now))
                    .collect();
                println!("{}", format_grid(&rows));
            }
            StoreEvent::LoadFailed(err) => {
                eprintln!("! connection problem: {} (retrying)", err.status_text());
            }
        }
    }
}

const HEADERS: [&str; 8] = [
    "Datastore",
    "Schedule",
    "Last GC",
    "Duration",
    "Status",
    "Next Run",
    "Removed Chunks",
    "Pending Chunks",
];

fn cells(row: &GridRow) -> [&str; 8] {
    [
        &row.store,
        &row.schedule,
        &row.last_run,
        &row.duration,
        &row.status.text,
        &row.next_run,
        &row.removed_chunks,
        &row.pending_chunks,
    ]
}

/// Plain-text table, columns padded to their widest cell.
pub fn format_grid(rows: &[GridRow]) -> String {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(cells(row)) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |values: [&str; 8]| {
        values
            .iter()
            .zip(widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(HEADERS)];
    out.extend(rows.iter().map(|row| line(cells(row))));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcwatch_core::domain::{ApiError, GcJobStatus, StoreDiff, TaskStatus};
    use gcwatch_core::impls::ScriptedApiClient;
    use gcwatch_core::ports::SystemClock;

    const UPID: &str =
        "UPID:pbs:000004D2:0001E240:00000003:65A2B0C0:garbage_collection:A:root@pam:";

    #[test]
    fn grid_pads_columns() {
        let labels = Labels::default();
        let now = SystemClock.now();
        let rows = vec![
            render_row_local(&GcJobStatus::new("A"), &labels, now),
            render_row_local(&GcJobStatus::new("store-long"), &labels, now),
        ];

        let grid = format_grid(&rows);
        let lines: Vec<&str> = grid.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Datastore   Schedule"));
        assert!(lines[1].starts_with("A           None"));
        assert!(lines[2].starts_with("store-long  None"));
    }

    #[test]
    fn printer_skips_snapshots_older_than_the_last_printed() {
        let printer = GridPrinter::new(Labels::default(), Arc::new(SystemClock));
        let loaded = |revision| StoreEvent::Loaded {
            revision,
            diff: StoreDiff {
                added: vec!["A".into()],
                ..Default::default()
            },
            records: vec![GcJobStatus::new("A")],
        };

        printer.on_event(&loaded(2));
        printer.on_event(&loaded(1));

        assert_eq!(printer.printed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn editor_saves_command_line_schedule() {
        let api = Arc::new(ScriptedApiClient::new());
        api.set_gc_jobs(vec![GcJobStatus::new("A")]);
        let editor = CommandLineScheduleEditor::new(api.clone(), Some("daily".into()));

        let close = editor
            .edit(ScheduleSeed {
                store: "A".into(),
                schedule: None,
            })
            .await;

        assert_eq!(close, EditorClose::Saved);
        assert_eq!(
            api.schedule_updates(),
            vec![("A".to_string(), Some("daily".to_string()))]
        );
    }

    #[tokio::test]
    async fn editor_skips_unchanged_schedule() {
        let api = Arc::new(ScriptedApiClient::new());
        let editor = CommandLineScheduleEditor::new(api.clone(), None);

        let close = editor
            .edit(ScheduleSeed {
                store: "A".into(),
                schedule: None,
            })
            .await;

        assert_eq!(close, EditorClose::Cancelled);
        assert!(api.schedule_updates().is_empty());
    }

    #[tokio::test]
    async fn editor_reports_rejected_schedule() {
        let api = Arc::new(ScriptedApiClient::new());
        api.set_gc_jobs(vec![GcJobStatus::new("A")]);
        api.fail_schedule_updates(ApiError::Status {
            code: 400,
            status_text: "value does not match the regex pattern".into(),
        });
        let editor = CommandLineScheduleEditor::new(api.clone(), Some("bogus".into()));

        let close = editor
            .edit(ScheduleSeed {
                store: "A".into(),
                schedule: None,
            })
            .await;

        assert_eq!(
            close,
            EditorClose::Failed("value does not match the regex pattern".into())
        );
    }

    #[tokio::test]
    async fn viewer_records_unreadable_task_status() {
        let api = Arc::new(ScriptedApiClient::new());
        api.fail_task_status(ApiError::Status {
            code: 403,
            status_text: "permission check failed".into(),
        });
        let viewer = TerminalTaskViewer::new(api);

        viewer.open(&Upid::new(UPID)).await;

        assert_eq!(
            viewer.take_failure().as_deref(),
            Some("permission check failed")
        );
        assert_eq!(viewer.take_failure(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn viewer_follows_task_until_stopped() {
        let api = Arc::new(ScriptedApiClient::new());
        let upid = Upid::new(UPID);
        for (status, exit) in [(TaskRunState::Running, None), (TaskRunState::Stopped, Some("OK"))] {
            api.push_task_status(TaskStatus {
                upid: upid.clone(),
                status,
                exitstatus: exit.map(str::to_string),
                starttime: None,
            });
        }
        let viewer = TerminalTaskViewer::new(api);

        viewer.open(&upid).await;

        assert_eq!(viewer.take_failure(), None);
    }
}
