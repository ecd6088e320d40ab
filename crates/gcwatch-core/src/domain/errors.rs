//! Errors - エラー型と分類
//!
//! API 呼び出しのエラーは、ポーリング（次の tick で自己回復）と
//! ユーザー操作（アラート表示、リトライなし）の両方で使われます。

/// ErrorKind は API エラーの運用分類
///
/// - Transient: 一時的なエラー（通信断、5xx）。次の tick で回復し得る
/// - Permanent: 恒久的なエラー（4xx、応答の形式不正）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
}

/// ApiError は REST API 呼び出しのエラー
///
/// 購読者全員に配送するため `Clone` を実装する。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("connection error: {0}")]
    Transport(String),

    #[error("{status_text} ({code})")]
    Status { code: u16, status_text: String },

    #[error("unable to decode response: {0}")]
    Decode(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transient,
            ApiError::Status { code, .. } if *code >= 500 => ErrorKind::Transient,
            _ => ErrorKind::Permanent,
        }
    }

    /// Text shown to the user: the server's own message for HTTP errors,
    /// the error description otherwise.
    pub fn status_text(&self) -> String {
        match self {
            ApiError::Status { status_text, .. } => status_text.clone(),
            other => other.to_string(),
        }
    }
}
