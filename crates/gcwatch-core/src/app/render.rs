//! Render - GC ジョブグリッドの列の描画
//!
//! ここの関数はすべて純粋関数。現在時刻とタイムゾーンは引数で受け取るので、
//! テストでもフロントエンドでも同じ行が得られる。

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use super::labels::Labels;
use crate::domain::{GcJobStatus, TaskSeverity};

/// Status column: text plus the severity used for styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCell {
    pub severity: TaskSeverity,
    pub text: String,
}

/// One rendered grid row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    pub store: String,
    pub schedule: String,
    pub last_run: String,
    pub duration: String,
    pub status: StatusCell,
    pub next_run: String,
    pub removed_chunks: String,
    pub pending_chunks: String,
}

pub fn render_row<Tz: TimeZone>(
    record: &GcJobStatus,
    labels: &Labels,
    now: DateTime<Utc>,
    tz: &Tz,
) -> GridRow
where
    Tz::Offset: std::fmt::Display,
{
    GridRow {
        store: record.store.clone(),
        schedule: render_schedule(record.schedule.as_deref(), labels),
        last_run: render_timestamp(record.last_run_endtime, tz),
        duration: record
            .duration()
            .map(format_duration_human)
            .unwrap_or_default(),
        status: render_task_status(record, labels),
        next_run: render_next_run(record.next_run, now, labels, tz),
        removed_chunks: render_count(record.removed_chunks),
        pending_chunks: render_count(record.pending_chunks),
    }
}

/// [`render_row`] in the local timezone.
pub fn render_row_local(record: &GcJobStatus, labels: &Labels, now: DateTime<Utc>) -> GridRow {
    render_row(record, labels, now, &Local)
}

pub fn render_schedule(schedule: Option<&str>, labels: &Labels) -> String {
    match schedule {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => labels.none.clone(),
    }
}

/// `YYYY-MM-DD HH:MM:SS` in `tz`, blank when absent.
pub fn render_timestamp<Tz: TimeZone>(epoch: Option<i64>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    epoch
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| {
            dt.with_timezone(tz)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_default()
}

/// Human readable elapsed time.
///
/// Shows at most three units and drops the finest ones for long spans:
/// minutes are omitted once years are shown, seconds once days are shown.
pub fn format_duration_human(secs: i64) -> String {
    if secs <= 0 {
        return "<0.1s".to_string();
    }

    let seconds = secs % 60;
    let mut remaining = secs / 60;
    let minutes = remaining % 60;
    remaining /= 60;
    let hours = remaining % 24;
    remaining /= 24;
    let days = remaining % 365;
    let years = remaining / 365;

    let mut parts: Vec<String> = Vec::new();
    let mut add = |value: i64, unit: &str| {
        if value > 0 {
            parts.push(format!("{value}{unit}"));
        }
        value > 0
    };

    let add_minutes = !add(years, "y");
    let add_seconds = !add(days, "d");
    add(hours, "h");
    if add_minutes {
        add(minutes, "m");
        if add_seconds {
            add(seconds, "s");
        }
    }
    parts.join(" ")
}

pub fn render_task_status(record: &GcJobStatus, labels: &Labels) -> StatusCell {
    if !record.has_run() {
        return StatusCell {
            severity: TaskSeverity::NotRun,
            text: labels.no_value.clone(),
        };
    }
    if record.last_run_endtime.is_none() {
        return StatusCell {
            severity: TaskSeverity::Running,
            text: labels.running.clone(),
        };
    }

    let state = record.last_run_state.as_deref().unwrap_or("unknown");
    let severity = TaskSeverity::classify(state);
    let text = match severity {
        TaskSeverity::Ok => labels.ok.clone(),
        TaskSeverity::Unknown => labels.unknown.clone(),
        TaskSeverity::Error => format!("{}: {state}", labels.error),
        _ => state.to_string(),
    };
    StatusCell { severity, text }
}

/// Next occurrence: `-` when unscheduled, "pending" when overdue.
pub fn render_next_run<Tz: TimeZone>(
    next_run: Option<i64>,
    now: DateTime<Utc>,
    labels: &Labels,
    tz: &Tz,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match next_run {
        None | Some(0) => labels.no_value.clone(),
        Some(secs) if secs < now.timestamp() => labels.pending.clone(),
        Some(secs) => render_timestamp(Some(secs), tz),
    }
}

fn render_count(count: Option<u64>) -> String {
    count.map(|c| c.to_string()).unwrap_or_default()
}
