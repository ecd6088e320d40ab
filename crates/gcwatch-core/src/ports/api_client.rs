//! ApiClient port - バックアップサーバの REST API
//!
//! サーバのスキーマは外部契約です。このクライアントが使うのは GC 状態の一覧、
//! GC の起動、namespace 一覧、GC スケジュールの更新、タスク状態の取得だけ。
//!
//! # 実装
//! - **HttpApiClient**: reqwest による HTTP(S) 実装（本番用）
//! - **ScriptedApiClient**: 応答を台本どおりに返すインメモリ実装（テスト用）

use std::fmt;

use async_trait::async_trait;

use crate::domain::{ApiError, GcJobStatus, NamespaceEntry, TaskStatus, Upid};

/// Path of an API endpoint, as unencoded segments below the server root.
///
/// Implementations are responsible for percent-encoding each segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    const PREFIX: [&'static str; 2] = ["api2", "json"];

    fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: Self::PREFIX
                .iter()
                .map(|s| s.to_string())
                .chain(segments.into_iter().map(Into::into))
                .collect(),
        }
    }

    /// `GET /api2/json/admin/gc`
    pub fn gc_status() -> Self {
        Self::new(["admin", "gc"])
    }

    /// `POST /api2/json/admin/datastore/{store}/gc`
    pub fn start_gc(store: &str) -> Self {
        Self::new(["admin", "datastore", store, "gc"])
    }

    /// `GET /api2/json/admin/datastore/{store}/namespace`
    pub fn namespaces(store: &str) -> Self {
        Self::new(["admin", "datastore", store, "namespace"])
    }

    /// `PUT /api2/json/config/datastore/{store}`
    pub fn datastore_config(store: &str) -> Self {
        Self::new(["config", "datastore", store])
    }

    /// `GET /api2/json/nodes/{node}/tasks/{upid}/status`
    pub fn task_status(node: &str, upid: &Upid) -> Self {
        Self::new(["nodes", node, "tasks", upid.as_str(), "status"])
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// ApiClient はサーバ API の抽象化
///
/// すべての呼び出しは `{ "data": ... }` で包まれた応答の `data` を返す。
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// GC job status of every datastore.
    async fn list_gc_jobs(&self) -> Result<Vec<GcJobStatus>, ApiError>;

    /// Start garbage collection on `store`; returns the worker task id.
    async fn start_gc(&self, store: &str) -> Result<Upid, ApiError>;

    /// Namespaces of `store` visible to the caller (root included).
    async fn list_namespaces(&self, store: &str) -> Result<Vec<NamespaceEntry>, ApiError>;

    /// Set (`Some`) or delete (`None`) the GC schedule of `store`.
    async fn update_gc_schedule(&self, store: &str, schedule: Option<&str>)
    -> Result<(), ApiError>;

    /// Current status of a worker task.
    async fn task_status(&self, upid: &Upid) -> Result<TaskStatus, ApiError>;
}
