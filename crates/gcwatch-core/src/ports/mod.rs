//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」を定義します。
//! サーバの REST API と、フロントエンド側の部品（タスクモニタ、アラート、
//! スケジュール編集ダイアログ）を trait で隠蔽し、コントローラからは
//! 実装の詳細が見えないようにします。

pub mod alert_sink;
pub mod api_client;
pub mod clock;
pub mod event_sink;
pub mod id_generator;
pub mod schedule_editor;
pub mod task_viewer;

pub use self::alert_sink::AlertSink;
pub use self::api_client::{ApiClient, ApiPath};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_sink::StoreListener;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::schedule_editor::{ScheduleEditor, ScheduleSeed};
pub use self::task_viewer::TaskViewer;
