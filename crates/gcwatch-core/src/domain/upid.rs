//! Upid - サーバ側タスクの識別子
//!
//! UPID は `UPID:{node}:{pid}:{pstart}:{task_id}:{starttime}:{worker_type}:{worker_id}:{auth_id}:`
//! という形式の不透明な文字列です。クライアントは生の文字列をそのまま保持し
//! （サーバへはそのまま送り返す）、必要になった時だけパースします。
//!
//! # 学習ポイント
//! - `#[serde(transparent)]` による newtype の透過的なシリアライズ
//! - `FromStr` で失敗し得るパースを表現

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Raw task identifier as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Upid(String);

impl Upid {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the identifier into its components.
    pub fn parse(&self) -> Result<UpidInfo, UpidError> {
        self.0.parse()
    }

    /// Task start time (epoch seconds) encoded in the identifier.
    pub fn starttime(&self) -> Result<i64, UpidError> {
        self.parse().map(|info| info.starttime)
    }
}

impl fmt::Display for Upid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Upid {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// UpidError は UPID のパース失敗
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpidError {
    #[error("not a task identifier (missing 'UPID:' prefix): {0}")]
    MissingPrefix(String),

    #[error("task identifier has {found} fields, expected 7 or 8: {raw}")]
    FieldCount { found: usize, raw: String },

    #[error("invalid hex value for {field} in task identifier: {value}")]
    InvalidHex { field: &'static str, value: String },

    #[error("empty {0} in task identifier")]
    EmptyField(&'static str),
}

/// Parsed components of a [`Upid`].
///
/// `task_id` is absent in the shorter, seven field form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpidInfo {
    pub node: String,
    pub pid: u32,
    pub pstart: u64,
    pub task_id: Option<u64>,
    pub starttime: i64,
    pub worker_type: String,
    pub worker_id: String,
    pub auth_id: String,
}

fn hex_field(field: &'static str, value: &str) -> Result<u64, UpidError> {
    if value.is_empty() {
        return Err(UpidError::EmptyField(field));
    }
    u64::from_str_radix(value, 16).map_err(|_| UpidError::InvalidHex {
        field,
        value: value.to_string(),
    })
}

fn non_empty(field: &'static str, value: &str) -> Result<String, UpidError> {
    if value.is_empty() {
        return Err(UpidError::EmptyField(field));
    }
    Ok(value.to_string())
}

impl FromStr for UpidInfo {
    type Err = UpidError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let body = raw
            .strip_prefix("UPID:")
            .ok_or_else(|| UpidError::MissingPrefix(raw.to_string()))?;
        let body = body.strip_suffix(':').unwrap_or(body);
        let fields: Vec<&str> = body.split(':').collect();

        let (node, pid, pstart, task_id, starttime, worker_type, worker_id, auth_id) =
            match fields.as_slice() {
                [node, pid, pstart, task_id, starttime, worker_type, worker_id, auth_id] => (
                    node,
                    pid,
                    pstart,
                    Some(task_id),
                    starttime,
                    worker_type,
                    worker_id,
                    auth_id,
                ),
                [node, pid, pstart, starttime, worker_type, worker_id, auth_id] => {
                    (node, pid, pstart, None, starttime, worker_type, worker_id, auth_id)
                }
                _ => {
                    return Err(UpidError::FieldCount {
                        found: fields.len(),
                        raw: raw.to_string(),
                    });
                }
            };

        let pid = hex_field("pid", pid)?;
        let pid = u32::try_from(pid).map_err(|_| UpidError::InvalidHex {
            field: "pid",
            value: format!("{pid:X}"),
        })?;

        Ok(Self {
            node: non_empty("node", node)?,
            pid,
            pstart: hex_field("pstart", pstart)?,
            task_id: task_id.map(|v| hex_field("task_id", v)).transpose()?,
            starttime: i64::try_from(hex_field("starttime", starttime)?).map_err(|_| {
                UpidError::InvalidHex {
                    field: "starttime",
                    value: starttime.to_string(),
                }
            })?,
            worker_type: non_empty("worker_type", worker_type)?,
            // worker_id may legitimately be empty
            worker_id: worker_id.to_string(),
            auth_id: non_empty("auth_id", auth_id)?,
        })
    }
}
