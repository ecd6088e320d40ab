//! AlertSink port - モーダルアラート
//!
//! 操作（GC の起動など）の失敗を同期的にユーザーへ見せる。リトライはしない。

/// AlertSink はアラートを表示
pub trait AlertSink: Send + Sync {
    fn alert(&self, title: &str, message: &str);
}
