//! Recording - ビュー側ポートの記録用実装
//!
//! 表示を頼まれた内容を覚えておき、テスト（やヘッドレスなフロントエンド）から
//! 後で確認できるようにする。

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::{EditorClose, StoreEvent, Upid};
use crate::ports::{AlertSink, ScheduleEditor, ScheduleSeed, StoreListener, TaskViewer};

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct RecordingTaskViewer {
    opened: Mutex<Vec<Upid>>,
}

impl RecordingTaskViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<Upid> {
        guard(&self.opened).clone()
    }
}

#[async_trait]
impl TaskViewer for RecordingTaskViewer {
    async fn open(&self, upid: &Upid) {
        guard(&self.opened).push(upid.clone());
    }
}

#[derive(Default)]
pub struct RecordingAlertSink {
    alerts: Mutex<Vec<(String, String)>>,
}

impl RecordingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(title, message)` pairs in the order they were raised.
    pub fn alerts(&self) -> Vec<(String, String)> {
        guard(&self.alerts).clone()
    }
}

impl AlertSink for RecordingAlertSink {
    fn alert(&self, title: &str, message: &str) {
        guard(&self.alerts).push((title.to_string(), message.to_string()));
    }
}

/// Editor that closes immediately with a fixed result.
pub struct ScriptedScheduleEditor {
    close: EditorClose,
    seeds: Mutex<Vec<ScheduleSeed>>,
}

impl ScriptedScheduleEditor {
    pub fn new(close: EditorClose) -> Self {
        Self {
            close,
            seeds: Mutex::new(Vec::new()),
        }
    }

    pub fn seeds(&self) -> Vec<ScheduleSeed> {
        guard(&self.seeds).clone()
    }
}

#[async_trait]
impl ScheduleEditor for ScriptedScheduleEditor {
    async fn edit(&self, seed: ScheduleSeed) -> EditorClose {
        guard(&self.seeds).push(seed);
        self.close.clone()
    }
}

#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<StoreEvent>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StoreEvent> {
        guard(&self.events).clone()
    }

    pub fn failures(&self) -> usize {
        guard(&self.events)
            .iter()
            .filter(|e| matches!(e, StoreEvent::LoadFailed(_)))
            .count()
    }
}

impl StoreListener for RecordingListener {
    fn on_event(&self, event: &StoreEvent) {
        guard(&self.events).push(event.clone());
    }
}
