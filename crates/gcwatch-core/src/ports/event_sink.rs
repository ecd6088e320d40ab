//! StoreListener port - ストアイベントの購読
//!
//! 明示的な購読登録で、ストアのイベントをビューや CLI へ転送します。

use crate::domain::StoreEvent;

/// StoreListener はストアのイベントを受け取る
///
/// ストアのロックを保持していない状態で同期的に呼ばれる。
/// 重い処理はここで行わず、必要なら別タスクに渡すこと。
pub trait StoreListener: Send + Sync {
    fn on_event(&self, event: &StoreEvent);
}
