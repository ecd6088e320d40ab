//! NamespaceEntry - 名前空間一覧の要素

use serde::{Deserialize, Serialize};

/// One entry of `GET /admin/datastore/{store}/namespace`.
///
/// An empty `ns` is the root namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    pub ns: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl NamespaceEntry {
    pub fn new(ns: impl Into<String>) -> Self {
        Self {
            ns: ns.into(),
            comment: None,
        }
    }

    pub fn root() -> Self {
        Self::new("")
    }

    pub fn is_root(&self) -> bool {
        self.ns.is_empty()
    }

    /// Nesting depth; root is 0, `a/b` is 2.
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.ns.split('/').count()
        }
    }
}
