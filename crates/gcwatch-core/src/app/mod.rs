//! App - アプリケーション層
//!
//! ports を組み合わせて GC ジョブビューを実装します。
//!
//! # 主要コンポーネント
//! - **PollingStore**: 一定間隔で GC 状態を取得するキャッシュ
//! - **GcJobView**: グリッドのライフサイクル、選択、ツールバー操作
//! - **NamespaceSelector**: データストアの名前空間の入力フィールド
//! - **ViewBuilder**: 構築とワイヤリング（起動時検証）

pub mod builder;
pub mod controller;
pub mod labels;
pub mod namespace;
pub mod reconcile;
pub mod render;
pub mod status;
pub mod store;

pub use self::builder::{BuildError, ViewBuilder};
pub use self::controller::{ActionOutcome, ActionState, GcJobView};
pub use self::labels::Labels;
pub use self::namespace::{NamespaceError, NamespaceSelector};
pub use self::reconcile::reconcile;
pub use self::render::{GridRow, StatusCell, render_row, render_row_local};
pub use self::status::StoreStatus;
pub use self::store::{DEFAULT_POLL_INTERVAL, PollingStore};
