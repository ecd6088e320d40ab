//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **HttpApiClient**: reqwest による本番用の ApiClient
//! - **ScriptedApiClient**: 応答を台本どおりに返す開発・テスト用の ApiClient
//! - **Recording***: UI 側ポートの記録用実装（テスト、ヘッドレス実行用）

pub mod http_client;
pub mod recording;
pub mod scripted;

pub use self::http_client::{HttpApiClient, HttpClientConfig};
pub use self::recording::{
    RecordingAlertSink, RecordingListener, RecordingTaskViewer, ScriptedScheduleEditor,
};
pub use self::scripted::ScriptedApiClient;
