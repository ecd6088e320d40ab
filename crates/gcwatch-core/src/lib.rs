//! gcwatch-core
//!
//! Core of the garbage-collection job view for a backup server.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（GcJobStatus, Upid, NamespaceEntry, events, errors）
//! - **ports**: 抽象化レイヤー（ApiClient, TaskViewer, AlertSink, ScheduleEditor, Clock, ...）
//! - **app**: アプリケーションロジック（PollingStore, GcJobView, NamespaceSelector, render）
//! - **impls**: 実装（HttpApiClient、テスト用の ScriptedApiClient など）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
