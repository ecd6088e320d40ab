//! ScriptedApiClient - 開発・テスト用のインメモリ ApiClient
//!
//! # 実装詳細
//! - GC 一覧は「台本」（VecDeque）から順に返し、尽きたら最後に設定した一覧を返し続ける
//! - 呼び出し回数と送信内容を記録して、テストから検証できるようにする
//! - 応答遅延を設定して、通信中に停止されたケースを再現できる

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{ApiError, GcJobStatus, NamespaceEntry, TaskRunState, TaskStatus, Upid};
use crate::ports::ApiClient;

#[derive(Default)]
struct Script {
    gc_responses: VecDeque<Result<Vec<GcJobStatus>, ApiError>>,
    gc_current: Vec<GcJobStatus>,
    start_results: HashMap<String, Result<Upid, ApiError>>,
    started: Vec<String>,
    namespaces: HashMap<String, Vec<NamespaceEntry>>,
    schedule_updates: Vec<(String, Option<String>)>,
    schedule_error: Option<ApiError>,
    task_statuses: HashMap<Upid, VecDeque<TaskStatus>>,
    task_status_error: Option<ApiError>,
}

#[derive(Default)]
pub struct ScriptedApiClient {
    script: Mutex<Script>,
    gc_calls: AtomicUsize,
    gc_delay: Mutex<Option<Duration>>,
}

impl ScriptedApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Listing returned once nothing is queued with [`Self::push_gc_response`].
    pub fn set_gc_jobs(&self, jobs: Vec<GcJobStatus>) {
        self.script().gc_current = jobs;
    }

    /// Queue a one-shot response for the next GC listing.
    pub fn push_gc_response(&self, response: Result<Vec<GcJobStatus>, ApiError>) {
        self.script().gc_responses.push_back(response);
    }

    /// Delay every GC listing by `delay` (simulated latency).
    pub fn set_gc_delay(&self, delay: Duration) {
        *self.gc_delay.lock().unwrap_or_else(PoisonError::into_inner) = Some(delay);
    }

    pub fn gc_calls(&self) -> usize {
        self.gc_calls.load(Ordering::SeqCst)
    }

    pub fn set_start_result(&self, store: &str, result: Result<Upid, ApiError>) {
        self.script()
            .start_results
            .insert(store.to_string(), result);
    }

    /// Stores GC was started on, in call order.
    pub fn started(&self) -> Vec<String> {
        self.script().started.clone()
    }

    pub fn set_namespaces(&self, store: &str, entries: Vec<NamespaceEntry>) {
        self.script().namespaces.insert(store.to_string(), entries);
    }

    pub fn schedule_updates(&self) -> Vec<(String, Option<String>)> {
        self.script().schedule_updates.clone()
    }

    /// Reject every schedule update with `err`. Attempts are still recorded.
    pub fn fail_schedule_updates(&self, err: ApiError) {
        self.script().schedule_error = Some(err);
    }

    /// Answer every task status request with `err`.
    pub fn fail_task_status(&self, err: ApiError) {
        self.script().task_status_error = Some(err);
    }

    /// Queue task status answers; the last one is repeated.
    pub fn push_task_status(&self, status: TaskStatus) {
        self.script()
            .task_statuses
            .entry(status.upid.clone())
            .or_default()
            .push_back(status);
    }
}

#[async_trait]
impl ApiClient for ScriptedApiClient {
    async fn list_gc_jobs(&self) -> Result<Vec<GcJobStatus>, ApiError> {
        self.gc_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.gc_delay.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut script = self.script();
        match script.gc_responses.pop_front() {
            Some(Ok(jobs)) => {
                script.gc_current = jobs.clone();
                Ok(jobs)
            }
            Some(Err(err)) => Err(err),
            None => Ok(script.gc_current.clone()),
        }
    }

    async fn start_gc(&self, store: &str) -> Result<Upid, ApiError> {
        let mut script = self.script();
        script.started.push(store.to_string());
        script
            .start_results
            .get(store)
            .cloned()
            .unwrap_or_else(|| {
                Err(ApiError::Status {
                    code: 404,
                    status_text: format!("no such datastore '{store}'"),
                })
            })
    }

    async fn list_namespaces(&self, store: &str) -> Result<Vec<NamespaceEntry>, ApiError> {
        self.script()
            .namespaces
            .get(store)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                code: 404,
                status_text: format!("no such datastore '{store}'"),
            })
    }

    async fn update_gc_schedule(
        &self,
        store: &str,
        schedule: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut script = self.script();
        script
            .schedule_updates
            .push((store.to_string(), schedule.map(str::to_string)));
        if let Some(err) = &script.schedule_error {
            return Err(err.clone());
        }
        if let Some(job) = script.gc_current.iter_mut().find(|j| j.store == store) {
            job.schedule = schedule.map(str::to_string);
        }
        Ok(())
    }

    async fn task_status(&self, upid: &Upid) -> Result<TaskStatus, ApiError> {
        let mut script = self.script();
        if let Some(err) = &script.task_status_error {
            return Err(err.clone());
        }
        let queue = script.task_statuses.entry(upid.clone()).or_default();
        let status = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        Ok(status.unwrap_or_else(|| TaskStatus {
            upid: upid.clone(),
            status: TaskRunState::Stopped,
            exitstatus: Some("unknown".to_string()),
            starttime: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_responses_come_before_current_listing() {
        let api = ScriptedApiClient::new();
        api.set_gc_jobs(vec![GcJobStatus::new("a")]);
        api.push_gc_response(Err(ApiError::Transport("down".into())));

        assert!(api.list_gc_jobs().await.is_err());
        assert_eq!(api.list_gc_jobs().await.unwrap(), vec![GcJobStatus::new("a")]);
        assert_eq!(api.gc_calls(), 2);
    }

    #[tokio::test]
    async fn queued_listing_becomes_current() {
        let api = ScriptedApiClient::new();
        api.push_gc_response(Ok(vec![GcJobStatus::new("b")]));

        api.list_gc_jobs().await.unwrap();
        assert_eq!(api.list_gc_jobs().await.unwrap(), vec![GcJobStatus::new("b")]);
    }

    #[tokio::test]
    async fn schedule_update_is_reflected_in_listing() {
        let api = ScriptedApiClient::new();
        api.set_gc_jobs(vec![GcJobStatus::new("a")]);

        api.update_gc_schedule("a", Some("daily")).await.unwrap();

        let jobs = api.list_gc_jobs().await.unwrap();
        assert_eq!(jobs[0].schedule.as_deref(), Some("daily"));
        assert_eq!(
            api.schedule_updates(),
            vec![("a".to_string(), Some("daily".to_string()))]
        );
    }

    #[tokio::test]
    async fn failed_schedule_update_leaves_listing_alone() {
        let api = ScriptedApiClient::new();
        api.set_gc_jobs(vec![GcJobStatus::new("a")]);
        api.fail_schedule_updates(ApiError::Status {
            code: 400,
            status_text: "value does not match the regex pattern".into(),
        });

        assert!(api.update_gc_schedule("a", Some("bogus")).await.is_err());
        assert_eq!(api.schedule_updates().len(), 1);
        assert_eq!(api.list_gc_jobs().await.unwrap()[0].schedule, None);
    }

    #[tokio::test]
    async fn task_status_repeats_last_answer() {
        let api = ScriptedApiClient::new();
        let upid = Upid::new("UPID:pbs:000004D2:0001E240:00000003:65A2B0C0:garbage_collection:a:root@pam:");
        for state in [TaskRunState::Running, TaskRunState::Stopped] {
            api.push_task_status(TaskStatus {
                upid: upid.clone(),
                status: state,
                exitstatus: None,
                starttime: None,
            });
        }

        assert_eq!(api.task_status(&upid).await.unwrap().status, TaskRunState::Running);
        assert_eq!(api.task_status(&upid).await.unwrap().status, TaskRunState::Stopped);
        assert_eq!(api.task_status(&upid).await.unwrap().status, TaskRunState::Stopped);
    }
}
