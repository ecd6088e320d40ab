//! Domain - ドメインモデル（GC 状態レコード、タスク識別子、イベント、エラー）
//!
//! サーバの JSON スキーマに合わせた型と、ビューのライフサイクル状態を置きます。

pub mod errors;
pub mod events;
pub mod gc_job;
pub mod ids;
pub mod namespace;
pub mod outcome;
pub mod state;
pub mod task;
pub mod upid;

pub use self::errors::{ApiError, ErrorKind};
pub use self::events::{StoreDiff, StoreEvent};
pub use self::gc_job::GcJobStatus;
pub use self::ids::{ListenerId, Id, IdMarker};
pub use self::namespace::NamespaceEntry;
pub use self::outcome::TaskSeverity;
pub use self::state::{EditorClose, ViewState};
pub use self::task::{TaskRunState, TaskStatus};
pub use self::upid::{Upid, UpidError, UpidInfo};
